//! 点击记录表迁移
//!
//! 每次重定向追加一行，按自增 id 排序即为点击发生的先后顺序。
//! 记录内容包括：
//! - 时间戳、IP、User-Agent、Referer
//! - 地理位置 (country, city, region, latitude, longitude)
//! - 从 User-Agent 解析出的浏览器 / 系统 / 设备信息

use sea_orm_migration::prelude::*;

use super::m20251101_000001_urls_table::Urls;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Clicks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Clicks::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Clicks::UrlId).big_integer().not_null())
                    .col(
                        ColumnDef::new(Clicks::Timestamp)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Clicks::Ip).string_len(45).null())
                    .col(ColumnDef::new(Clicks::UserAgent).text().null())
                    .col(ColumnDef::new(Clicks::Referrer).text().null())
                    .col(ColumnDef::new(Clicks::Country).string_len(100).null())
                    .col(ColumnDef::new(Clicks::City).string_len(100).null())
                    .col(ColumnDef::new(Clicks::Region).string_len(100).null())
                    .col(ColumnDef::new(Clicks::Latitude).double().null())
                    .col(ColumnDef::new(Clicks::Longitude).double().null())
                    .col(ColumnDef::new(Clicks::Browser).string_len(64).null())
                    .col(ColumnDef::new(Clicks::BrowserVersion).string_len(64).null())
                    .col(ColumnDef::new(Clicks::Os).string_len(64).null())
                    .col(ColumnDef::new(Clicks::OsVersion).string_len(64).null())
                    .col(ColumnDef::new(Clicks::DeviceType).string_len(32).null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_clicks_url_id")
                            .from(Clicks::Table, Clicks::UrlId)
                            .to(Urls::Table, Urls::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 单链接点击序列查询：WHERE url_id = ? ORDER BY id
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_clicks_url_id")
                    .table(Clicks::Table)
                    .col(Clicks::UrlId)
                    .col(Clicks::Id)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_clicks_url_id").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Clicks::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Clicks {
    Table,
    Id,
    UrlId,
    Timestamp,
    Ip,
    UserAgent,
    Referrer,
    Country,
    City,
    Region,
    Latitude,
    Longitude,
    Browser,
    BrowserVersion,
    Os,
    OsVersion,
    DeviceType,
}
