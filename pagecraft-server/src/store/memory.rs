use super::SiteStore;
use crate::error::StoreError;
use pagecraft_render::{PageData, SiteSettings, SitemapEntry, Template, TemplateType};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::Path;

/// A whole site in one JSON document:
/// `{"settings": {...}, "pages": [PageData...], "templates": [Template...]}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SiteSnapshot {
    pub settings: Map<String, Value>,
    pub pages: Vec<PageData>,
    pub templates: Vec<Template>,
}

/// Serves a snapshot from memory, for local preview and tests.
#[derive(Debug, Clone, Default)]
pub struct MemorySiteStore {
    snapshot: SiteSnapshot,
}

impl MemorySiteStore {
    pub fn new(snapshot: SiteSnapshot) -> Self {
        Self { snapshot }
    }

    pub fn from_json_str(raw: &str) -> Result<Self, StoreError> {
        let snapshot: SiteSnapshot =
            serde_json::from_str(raw).map_err(|e| StoreError::Snapshot(e.to_string()))?;
        Ok(Self::new(snapshot))
    }

    pub async fn load(path: &Path) -> Result<Self, StoreError> {
        let raw = tokio::fs::read_to_string(path).await?;
        let store = Self::from_json_str(&raw)?;
        tracing::info!(
            path = %path.display(),
            pages = store.snapshot.pages.len(),
            templates = store.snapshot.templates.len(),
            "loaded site snapshot"
        );
        Ok(store)
    }

    fn listed_pages(&self) -> impl Iterator<Item = &PageData> {
        self.snapshot
            .pages
            .iter()
            .filter(|page| page.published && !page.is_template)
    }
}

impl SiteStore for MemorySiteStore {
    async fn site_settings(&self) -> Result<SiteSettings, StoreError> {
        Ok(SiteSettings::from_map(&self.snapshot.settings))
    }

    async fn published_page(&self, slug: &str) -> Result<Option<PageData>, StoreError> {
        Ok(self.listed_pages().find(|page| page.slug == slug).cloned())
    }

    async fn templates_by_ids(&self, ids: &[i64]) -> Result<Vec<Template>, StoreError> {
        Ok(self
            .snapshot
            .templates
            .iter()
            .filter(|t| ids.contains(&t.id))
            .cloned()
            .collect())
    }

    async fn published_system_template(&self, kind: TemplateType) -> Result<Option<Template>, StoreError> {
        Ok(self
            .snapshot
            .templates
            .iter()
            .filter(|t| t.published && t.template_type == kind)
            .min_by_key(|t| t.id)
            .cloned())
    }

    async fn sitemap_pages(&self) -> Result<Vec<SitemapEntry>, StoreError> {
        let mut pages: Vec<&PageData> = self.listed_pages().collect();
        pages.sort_by(|a, b| a.slug.cmp(&b.slug));
        Ok(pages.into_iter().map(SitemapEntry::from_page).collect())
    }
}
