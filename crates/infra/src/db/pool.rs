use sqlx::migrate::MigrateError;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use thiserror::Error;

pub type DbPool = PgPool;

#[derive(Debug, Error)]
pub enum DbPoolError {
    #[error("sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("sqlx migrate error: {0}")]
    Migrate(#[from] MigrateError),
}

pub fn connect_lazy(database_url: &str) -> Result<DbPool, DbPoolError> {
    Ok(PgPoolOptions::new()
        .max_connections(10)
        .connect_lazy(database_url)?)
}

pub async fn ping(pool: &DbPool) -> Result<(), DbPoolError> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
