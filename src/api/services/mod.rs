pub mod health;
pub mod info;
pub mod redirect;
pub mod shrink;

use actix_web::web;

pub use health::{AppStartTime, HealthService, health_routes};
pub use info::{InfoService, info_routes};
pub use redirect::{RedirectService, redirect_routes};
pub use shrink::{ShrinkService, json_config, shrink_routes};

/// 注册全部路由；短码通配路由放在最后
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config());
    health_routes(cfg);
    shrink_routes(cfg);
    info_routes(cfg);
    redirect_routes(cfg);
}
