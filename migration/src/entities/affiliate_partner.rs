use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "affiliate_partners")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub status: String,
    /// 归因 Cookie 有效天数，为空时使用默认值
    pub cookie_duration: Option<i32>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::affiliate_link::Entity")]
    AffiliateLink,
}

impl Related<super::affiliate_link::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AffiliateLink.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
