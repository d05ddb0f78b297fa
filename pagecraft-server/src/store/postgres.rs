use super::SiteStore;
use crate::db::page_service::PageService;
use crate::db::settings_service::SettingsService;
use crate::db::template_service::TemplateService;
use crate::error::StoreError;
use pagecraft_render::{PageData, SiteSettings, SitemapEntry, Template, TemplateType};
use sqlx::PgPool;

pub struct PgSiteStore {
    pages: PageService,
    templates: TemplateService,
    settings: SettingsService,
}

impl PgSiteStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pages: PageService::new(pool.clone()),
            templates: TemplateService::new(pool.clone()),
            settings: SettingsService::new(pool),
        }
    }
}

impl SiteStore for PgSiteStore {
    async fn site_settings(&self) -> Result<SiteSettings, StoreError> {
        Ok(self.settings.site_settings().await?)
    }

    async fn published_page(&self, slug: &str) -> Result<Option<PageData>, StoreError> {
        Ok(self.pages.published_by_slug(slug).await?.map(PageData::from))
    }

    async fn templates_by_ids(&self, ids: &[i64]) -> Result<Vec<Template>, StoreError> {
        let rows = self.templates.by_ids(ids).await?;
        Ok(rows.into_iter().filter_map(|row| row.into_template()).collect())
    }

    async fn published_system_template(&self, kind: TemplateType) -> Result<Option<Template>, StoreError> {
        let row = self.templates.published_system(kind).await?;
        Ok(row.and_then(|row| row.into_template()))
    }

    async fn sitemap_pages(&self) -> Result<Vec<SitemapEntry>, StoreError> {
        let rows = self.pages.list_published().await?;
        Ok(rows
            .into_iter()
            .map(|row| SitemapEntry::from_page(&PageData::from(row)))
            .collect())
    }
}
