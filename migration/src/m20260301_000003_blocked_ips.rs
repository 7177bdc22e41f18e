//! IP 黑名单表
//!
//! `ip_range` 可以是单个地址，也可以是 CIDR（如 203.0.113.0/24）。

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(BlockedIps::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BlockedIps::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(BlockedIps::IpRange)
                            .string_len(64)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(BlockedIps::Reason).text().null())
                    .col(
                        ColumnDef::new(BlockedIps::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(BlockedIps::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum BlockedIps {
    #[sea_orm(iden = "blocked_ips")]
    Table,
    Id,
    IpRange,
    Reason,
    CreatedAt,
}
