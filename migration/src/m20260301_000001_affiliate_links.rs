//! 联盟伙伴与联盟链接表
//!
//! - affiliate_partners: 合作方状态与归因 Cookie 天数
//! - affiliate_links: 短码 → 目标地址，带状态/过期时间/所属合作方

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AffiliatePartners::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AffiliatePartners::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AffiliatePartners::Name)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AffiliatePartners::Status)
                            .string_len(16)
                            .not_null()
                            .default("active"),
                    )
                    .col(
                        ColumnDef::new(AffiliatePartners::CookieDuration)
                            .integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(AffiliatePartners::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AffiliateLinks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AffiliateLinks::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AffiliateLinks::ShortCode)
                            .string_len(64)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(AffiliateLinks::OriginalUrl).text().not_null())
                    .col(ColumnDef::new(AffiliateLinks::TrackingUrl).text().null())
                    .col(
                        ColumnDef::new(AffiliateLinks::Status)
                            .string_len(16)
                            .not_null()
                            .default("active"),
                    )
                    .col(
                        ColumnDef::new(AffiliateLinks::ExpiresAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(AffiliateLinks::PartnerId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(AffiliateLinks::ProductId).big_integer().null())
                    .col(ColumnDef::new(AffiliateLinks::CampaignId).big_integer().null())
                    .col(
                        ColumnDef::new(AffiliateLinks::ClickCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(AffiliateLinks::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_affiliate_links_partner")
                            .from(AffiliateLinks::Table, AffiliateLinks::PartnerId)
                            .to(AffiliatePartners::Table, AffiliatePartners::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_affiliate_links_partner")
                    .table(AffiliateLinks::Table)
                    .col(AffiliateLinks::PartnerId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_affiliate_links_partner").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(AffiliateLinks::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(AffiliatePartners::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum AffiliatePartners {
    #[sea_orm(iden = "affiliate_partners")]
    Table,
    Id,
    Name,
    Status,
    CookieDuration,
    CreatedAt,
}

#[derive(DeriveIden)]
enum AffiliateLinks {
    #[sea_orm(iden = "affiliate_links")]
    Table,
    Id,
    ShortCode,
    OriginalUrl,
    TrackingUrl,
    Status,
    ExpiresAt,
    PartnerId,
    ProductId,
    CampaignId,
    ClickCount,
    CreatedAt,
}
