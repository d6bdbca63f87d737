//! HTTP API tests
//!
//! Full route table against a temporary SQLite database.

use std::sync::Arc;

use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use serde_json::{Value, json};
use shrink::api::configure_routes;
use shrink::api::services::AppStartTime;
use shrink::config::StaticConfig;
use shrink::runtime::lifetime::startup::build_services;
use shrink::storage::{SeaOrmStorage, UrlStore};
use shrink::utils::ip::TrustedProxies;
use tempfile::TempDir;

async fn create_store() -> (Arc<dyn UrlStore>, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_url = format!(
        "sqlite://{}?mode=rwc",
        temp_dir.path().join("api.db").display()
    );
    let storage = SeaOrmStorage::new(&db_url, "sqlite")
        .await
        .expect("Failed to create storage");
    (Arc::new(storage), temp_dir)
}

/// 与 run_server 相同的 App 组装方式（GeoIP 关闭）
macro_rules! init_app {
    ($store:expr) => {{
        let mut config = StaticConfig::default();
        config.geoip.enabled = false;
        let (links, tracking) = build_services($store.clone(), &config);
        test::init_service(
            App::new()
                .app_data(web::Data::new($store.clone()))
                .app_data(web::Data::new(links))
                .app_data(web::Data::new(tracking))
                .app_data(web::Data::new(AppStartTime::default()))
                .app_data(web::Data::new(TrustedProxies::default()))
                .configure(configure_routes),
        )
        .await
    }};
}

#[actix_web::test]
async fn test_health() {
    let (store, _dir) = create_store().await;
    let app = init_app!(store);

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "server is running");
    assert_eq!(body["storage"], "sqlite");
}

#[actix_web::test]
async fn test_shrink_with_alias_then_duplicate() {
    let (store, _dir) = create_store().await;
    let app = init_app!(store);

    let req = test::TestRequest::post()
        .uri("/shrink")
        .set_json(json!({
            "original_url": "https://example.com/landing",
            "custom_alias": "launch"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["short_url"], "launch");
    assert_eq!(body["original_url"], "https://example.com/landing");
    assert_eq!(body["total_clicks"], 0);
    assert_eq!(body["is_active"], true);

    let req = test::TestRequest::post()
        .uri("/api/shrink")
        .set_json(json!({
            "original_url": "https://other.example.com",
            "custom_alias": "launch"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Custom alias already exists");
    assert_eq!(body["code"], "E002");
}

#[actix_web::test]
async fn test_shrink_generates_code() {
    let (store, _dir) = create_store().await;
    let app = init_app!(store);

    let req = test::TestRequest::post()
        .uri("/shrink")
        .set_json(json!({ "original_url": "https://example.com/auto" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = test::read_body_json(resp).await;
    let code = body["short_url"].as_str().unwrap();
    assert_eq!(code.len(), StaticConfig::default().links.code_length);
    assert_eq!(store.count_by_short_url(code).await.unwrap(), 1);
}

#[actix_web::test]
async fn test_shrink_rejects_bad_input() {
    let (store, _dir) = create_store().await;
    let app = init_app!(store);

    // 缺少 original_url
    let req = test::TestRequest::post()
        .uri("/shrink")
        .set_json(json!({ "custom_alias": "x" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "E001");
    assert!(body["error"].is_string());

    // 非法 URL
    let req = test::TestRequest::post()
        .uri("/shrink")
        .set_json(json!({ "original_url": "javascript:alert(1)" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // 非 JSON
    let req = test::TestRequest::post()
        .uri("/shrink")
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_redirect_and_stats() {
    let (store, _dir) = create_store().await;
    let app = init_app!(store);

    let req = test::TestRequest::post()
        .uri("/shrink")
        .set_json(json!({
            "original_url": "https://example.com/dest",
            "custom_alias": "hop"
        }))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::CREATED
    );

    let req = test::TestRequest::get()
        .uri("/hop?lat=35.68&lng=139.69&city=Tokyo")
        .insert_header((header::USER_AGENT, "curl/8.4.0"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(
        resp.headers().get(header::LOCATION).unwrap(),
        "https://example.com/dest"
    );

    let req = test::TestRequest::get().uri("/stats/hop").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["total_clicks"], 1);
    assert_eq!(body["clicks"].as_array().unwrap().len(), 1);
    assert_eq!(body["clicks"][0]["city"], "Tokyo");
    assert_eq!(body["clicks"][0]["latitude"], 35.68);

    let req = test::TestRequest::get().uri("/info/hop").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["custom_alias"], "hop");
    assert_eq!(body["clicks_count"], 1);
}

#[actix_web::test]
async fn test_unknown_code_is_404_everywhere() {
    let (store, _dir) = create_store().await;
    let app = init_app!(store);

    for uri in ["/missing", "/info/missing", "/stats/missing", "/api/stats/missing"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{uri}");

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Short URL not found");
        assert_eq!(body["code"], "E003");
    }
}

#[actix_web::test]
async fn test_head_redirect() {
    let (store, _dir) = create_store().await;
    let app = init_app!(store);

    let req = test::TestRequest::post()
        .uri("/shrink")
        .set_json(json!({
            "original_url": "https://example.com/head",
            "custom_alias": "peek"
        }))
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::default()
        .method(actix_web::http::Method::HEAD)
        .uri("/peek")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::MOVED_PERMANENTLY);
}

#[actix_web::test]
async fn test_malformed_location_query_still_redirects() {
    let (store, _dir) = create_store().await;
    let app = init_app!(store);

    let req = test::TestRequest::post()
        .uri("/shrink")
        .set_json(json!({
            "original_url": "https://example.com/dup-query",
            "custom_alias": "dupq"
        }))
        .to_request();
    test::call_service(&app, req).await;

    // 重复的 key 会让 Query 提取失败
    let req = test::TestRequest::get()
        .uri("/dupq?lat=1&lat=2&lng=3")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(
        resp.headers().get(header::LOCATION).unwrap(),
        "https://example.com/dup-query"
    );

    let req = test::TestRequest::get().uri("/stats/dupq").to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["total_clicks"], 1);
    assert!(body["clicks"][0]["latitude"].is_null());
}
