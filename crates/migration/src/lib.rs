//! Migrator registering entity-specific migrations in dependency order.
//! Indexes are applied last.
pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_user;
mod m20240101_000002_create_user_credentials;
mod m20240101_000003_create_tag;
mod m20240101_000004_create_birthday;
mod m20240101_000005_create_birthday_tag;
mod m20240101_000006_create_congratulation;
mod m20240101_000007_add_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_user::Migration),
            Box::new(m20240101_000002_create_user_credentials::Migration),
            Box::new(m20240101_000003_create_tag::Migration),
            Box::new(m20240101_000004_create_birthday::Migration),
            Box::new(m20240101_000005_create_birthday_tag::Migration),
            Box::new(m20240101_000006_create_congratulation::Migration),
            // Indexes should always be applied last
            Box::new(m20240101_000007_add_indexes::Migration),
        ]
    }
}
