/// CRUD operations tests for all models
pub mod crud_tests;

use crate::db::{connect_with_config, DatabaseConfig};
use migration::MigratorTrait;
use sea_orm::DatabaseConnection;

/// In-memory SQLite with the full schema; one connection so every query sees
/// the same database.
pub(crate) async fn setup_test_db() -> anyhow::Result<DatabaseConnection> {
    let cfg = DatabaseConfig {
        url: "sqlite::memory:".into(),
        max_connections: 1,
        min_connections: 1,
        ..DatabaseConfig::default()
    };
    let db = connect_with_config(&cfg).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}
