//! 点击事件表（只追加）
//!
//! 欺诈评分需要按 (link, ip, 时间) 与 (link, session, 时间) 查询最近点击，
//! 两个复合索引即为此服务。

use sea_orm_migration::prelude::*;

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
                    .col(ColumnDef::new(Clicks::LinkId).big_integer().not_null())
                    .col(ColumnDef::new(Clicks::PartnerId).big_integer().not_null())
                    .col(ColumnDef::new(Clicks::ProductId).big_integer().null())
                    .col(ColumnDef::new(Clicks::SessionId).string_len(128).not_null())
                    .col(ColumnDef::new(Clicks::IpAddress).string_len(45).not_null())
                    .col(ColumnDef::new(Clicks::UserAgent).text().null())
                    .col(ColumnDef::new(Clicks::Referrer).text().null())
                    .col(ColumnDef::new(Clicks::DeviceType).string_len(32).null())
                    .col(ColumnDef::new(Clicks::Browser).string_len(64).null())
                    .col(ColumnDef::new(Clicks::Os).string_len(64).null())
                    .col(
                        ColumnDef::new(Clicks::IsBot)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Clicks::ClickedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // (link, ip, time)：同 IP 重复点击检测
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_clicks_link_ip_time")
                    .table(Clicks::Table)
                    .col(Clicks::LinkId)
                    .col(Clicks::IpAddress)
                    .col(Clicks::ClickedAt)
                    .to_owned(),
            )
            .await?;

        // (link, session, time)：同会话重复点击检测
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_clicks_link_session_time")
                    .table(Clicks::Table)
                    .col(Clicks::LinkId)
                    .col(Clicks::SessionId)
                    .col(Clicks::ClickedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_clicks_link_session_time").to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_clicks_link_ip_time").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Clicks::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Clicks {
    #[sea_orm(iden = "clicks")]
    Table,
    Id,
    LinkId,
    PartnerId,
    ProductId,
    SessionId,
    IpAddress,
    UserAgent,
    Referrer,
    DeviceType,
    Browser,
    Os,
    IsBot,
    ClickedAt,
}
