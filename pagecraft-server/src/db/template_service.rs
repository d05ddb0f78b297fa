use pagecraft_render::{Template, TemplateType};
use serde_json::Value;
use sqlx::{FromRow, PgPool};

#[derive(Debug, Clone, FromRow)]
pub struct TemplateRecord {
    pub id: i64,
    pub name: String,
    pub template_type: String,
    pub content_json: Value,
    pub published: bool,
}

impl TemplateRecord {
    /// `None` for a type tag this server does not know.
    pub fn into_template(self) -> Option<Template> {
        let Some(template_type) = TemplateType::parse(&self.template_type) else {
            tracing::debug!(id = self.id, template_type = %self.template_type, "unknown template type");
            return None;
        };
        Some(Template {
            id: self.id,
            name: self.name,
            template_type,
            content_json: self.content_json,
            published: self.published,
        })
    }
}

pub struct TemplateService {
    pool: PgPool,
}

impl TemplateService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn by_ids(&self, ids: &[i64]) -> Result<Vec<TemplateRecord>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query_as::<_, TemplateRecord>(
            r#"
            SELECT id, name, template_type, content_json, published
            FROM templates WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// The published template of a system type; the lowest id wins if several exist.
    pub async fn published_system(&self, kind: TemplateType) -> Result<Option<TemplateRecord>, sqlx::Error> {
        let rec = sqlx::query_as::<_, TemplateRecord>(
            r#"
            SELECT id, name, template_type, content_json, published
            FROM templates
            WHERE template_type = $1 AND published
            ORDER BY id
            LIMIT 1
            "#,
        )
        .bind(kind.as_str())
        .fetch_optional(&self.pool)
        .await?;
        Ok(rec)
    }
}
