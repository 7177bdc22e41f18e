pub use sea_orm_migration::prelude::*;

pub mod entities;
mod m20260301_000001_affiliate_links;
mod m20260301_000002_clicks;
mod m20260301_000003_blocked_ips;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_000001_affiliate_links::Migration),
            Box::new(m20260301_000002_clicks::Migration),
            Box::new(m20260301_000003_blocked_ips::Migration),
        ]
    }
}
