use chrono::{DateTime, Utc};
use pagecraft_render::PageData;
use serde_json::Value;
use sqlx::{FromRow, PgPool};

#[derive(Debug, Clone, FromRow)]
pub struct PageRecord {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub content_json: Value,
    pub header_template_id: Option<i64>,
    pub footer_template_id: Option<i64>,
    pub settings: Value,
    pub published: bool,
    pub is_template: bool,
    pub updated_at: DateTime<Utc>,
}

impl From<PageRecord> for PageData {
    fn from(record: PageRecord) -> Self {
        PageData {
            id: record.id,
            slug: record.slug,
            title: record.title,
            content_json: record.content_json,
            header_template_id: record.header_template_id,
            footer_template_id: record.footer_template_id,
            settings: record.settings,
            published: record.published,
            is_template: record.is_template,
            updated_at: Some(record.updated_at),
        }
    }
}

pub struct PageService {
    pool: PgPool,
}

impl PageService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The published, non-template page with exactly this slug.
    pub async fn published_by_slug(&self, slug: &str) -> Result<Option<PageRecord>, sqlx::Error> {
        let rec = sqlx::query_as::<_, PageRecord>(
            r#"
            SELECT id, slug, title, content_json, header_template_id, footer_template_id,
                   settings, published, is_template, updated_at
            FROM pages
            WHERE slug = $1 AND published AND NOT is_template
            "#,
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;
        Ok(rec)
    }

    /// Every published, non-template page, ordered by slug.
    pub async fn list_published(&self) -> Result<Vec<PageRecord>, sqlx::Error> {
        let rows = sqlx::query_as::<_, PageRecord>(
            r#"
            SELECT id, slug, title, content_json, header_template_id, footer_template_id,
                   settings, published, is_template, updated_at
            FROM pages
            WHERE published AND NOT is_template
            ORDER BY slug
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
