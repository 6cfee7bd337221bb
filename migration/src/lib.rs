pub use sea_orm_migration::prelude::*;

mod m20250415_000001_create_parties_and_sessions;
mod m20250522_000001_create_earnings_table;
mod m20250610_000001_create_payout_requests_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250415_000001_create_parties_and_sessions::Migration),
            Box::new(m20250522_000001_create_earnings_table::Migration),
            Box::new(m20250610_000001_create_payout_requests_table::Migration),
        ]
    }
}
