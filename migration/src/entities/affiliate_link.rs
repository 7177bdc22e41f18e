use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "affiliate_links")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub short_code: String,
    #[sea_orm(column_type = "Text")]
    pub original_url: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub tracking_url: Option<String>,
    pub status: String,
    pub expires_at: Option<DateTimeUtc>,
    pub partner_id: i64,
    pub product_id: Option<i64>,
    pub campaign_id: Option<i64>,
    pub click_count: i64,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::affiliate_partner::Entity",
        from = "Column::PartnerId",
        to = "super::affiliate_partner::Column::Id",
        on_delete = "Cascade"
    )]
    AffiliatePartner,
}

impl Related<super::affiliate_partner::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AffiliatePartner.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
