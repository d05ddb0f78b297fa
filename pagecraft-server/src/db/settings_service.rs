use pagecraft_render::SiteSettings;
use serde_json::{Map, Value};
use sqlx::PgPool;

pub struct SettingsService {
    pool: PgPool,
}

impl SettingsService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// All rows of the key -> JSON settings table.
    pub async fn all(&self) -> Result<Map<String, Value>, sqlx::Error> {
        let rows = sqlx::query_as::<_, (String, Value)>(
            r#"
            SELECT key, value FROM site_settings
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().collect())
    }

    pub async fn site_settings(&self) -> Result<SiteSettings, sqlx::Error> {
        Ok(SiteSettings::from_map(&self.all().await?))
    }
}
