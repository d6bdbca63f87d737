use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::DatabaseBackend;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let mut short_url = ColumnDef::new(Urls::ShortUrl);
        short_url.string_len(255).not_null();
        // MySQL / MariaDB 默认排序规则不区分大小写，短码必须按字节比较
        if manager.get_database_backend() == DatabaseBackend::MySql {
            short_url.extra("COLLATE utf8mb4_bin");
        }

        manager
            .create_table(
                Table::create()
                    .table(Urls::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Urls::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Urls::OriginalUrl).text().not_null())
                    .col(&mut short_url)
                    .col(ColumnDef::new(Urls::CustomAlias).string_len(255).null())
                    .col(
                        ColumnDef::new(Urls::TotalClicks)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Urls::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Urls::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Urls::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .to_owned(),
            )
            .await?;

        // short_url 唯一索引：并发创建时由数据库裁决冲突
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_urls_short_url")
                    .table(Urls::Table)
                    .col(Urls::ShortUrl)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_urls_created_at")
                    .table(Urls::Table)
                    .col(Urls::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_urls_created_at").to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_urls_short_url").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Urls::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub(crate) enum Urls {
    Table,
    Id,
    OriginalUrl,
    ShortUrl,
    CustomAlias,
    TotalClicks,
    CreatedAt,
    UpdatedAt,
    IsActive,
}
