//! Read-only access to site content.

pub mod memory;
pub mod postgres;

pub use memory::{MemorySiteStore, SiteSnapshot};
pub use postgres::PgSiteStore;

use crate::error::StoreError;
use pagecraft_render::{PageData, SiteSettings, SitemapEntry, Template, TemplateType};
use std::future::Future;

/// Everything a request reads. Implementations are shared across requests behind `Arc`.
pub trait SiteStore: Send + Sync + 'static {
    fn site_settings(&self) -> impl Future<Output = Result<SiteSettings, StoreError>> + Send;

    /// The published, non-template page with this exact slug.
    fn published_page(
        &self,
        slug: &str,
    ) -> impl Future<Output = Result<Option<PageData>, StoreError>> + Send;

    /// Templates with these ids, in any order. Unknown ids are skipped.
    fn templates_by_ids(
        &self,
        ids: &[i64],
    ) -> impl Future<Output = Result<Vec<Template>, StoreError>> + Send;

    fn published_system_template(
        &self,
        kind: TemplateType,
    ) -> impl Future<Output = Result<Option<Template>, StoreError>> + Send;

    /// Published, non-template pages ordered by slug.
    fn sitemap_pages(&self) -> impl Future<Output = Result<Vec<SitemapEntry>, StoreError>> + Send;
}
