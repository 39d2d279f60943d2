use crate::config::AppConfig;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use std::time::Duration;
use tracing::info;

/// Type alias for a database connection pool
pub type DbPool = DatabaseConnection;

/// Establishes the connection pool from application configuration.
pub async fn establish_connection(config: &AppConfig) -> Result<DbPool, DbErr> {
    connect(config.database_url()).await
}

/// Establishes a connection pool from the `APP__DATABASE_URL` environment
/// variable, falling back to in-memory SQLite. Used by tests and tools.
pub async fn create_db_pool() -> Result<DbPool, DbErr> {
    let url = std::env::var("APP__DATABASE_URL")
        .unwrap_or_else(|_| "sqlite::memory:".to_string());
    connect(&url).await
}

async fn connect(url: &str) -> Result<DbPool, DbErr> {
    let mut options = ConnectOptions::new(url.to_string());
    options
        .max_connections(10)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(30))
        .idle_timeout(Duration::from_secs(600))
        .acquire_timeout(Duration::from_secs(8))
        .sqlx_logging(false);

    let db = Database::connect(options).await?;
    info!("database connection established");
    Ok(db)
}

/// Applies all pending migrations.
pub async fn run_migrations(db: &DatabaseConnection) -> Result<(), DbErr> {
    crate::migrator::Migrator::up(db, None).await?;
    info!("database migrations applied");
    Ok(())
}
