pub mod page_service;
pub mod settings_service;
pub mod template_service;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

pub async fn connect(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(include_str!("../../migrations/001_create_templates.sql"))
        .execute(pool)
        .await?;
    sqlx::raw_sql(include_str!("../../migrations/002_create_pages.sql"))
        .execute(pool)
        .await?;
    sqlx::raw_sql(include_str!("../../migrations/003_create_site_settings.sql"))
        .execute(pool)
        .await?;
    Ok(())
}
