use crate::error::{AppError, StoreError};
use crate::store::SiteStore;
use axum::Router;
use axum::extract::State;
use axum::http::{StatusCode, Uri, header};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use pagecraft_render::{
    NotFoundContext, PageRenderContext, Route, SiteSettings, TemplateCatalog, TemplateType,
    build_robots_txt, build_sitemap_xml, classify_path, compose_404, compose_page,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub struct AppState<S> {
    pub store: Arc<S>,
    pub request_timeout: Duration,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            request_timeout: self.request_timeout,
        }
    }
}

impl<S: SiteStore> AppState<S> {
    pub fn new(store: S, request_timeout: Duration) -> Self {
        Self {
            store: Arc::new(store),
            request_timeout,
        }
    }
}

pub fn router<S: SiteStore>(state: AppState<S>) -> Router {
    Router::new()
        .route("/", get(serve_path::<S>))
        .route("/{*path}", get(serve_path::<S>))
        .with_state(state)
}

async fn serve_path<S: SiteStore>(State(state): State<AppState<S>>, uri: Uri) -> Response {
    render_path(&state, uri.path()).await
}

/// Answer one public GET. Store reads run under the request timeout; rendering itself
/// never fails.
pub async fn render_path<S: SiteStore>(state: &AppState<S>, path: &str) -> Response {
    let started = Instant::now();
    let route = classify_path(path);
    let response = match tokio::time::timeout(state.request_timeout, respond(state.store.as_ref(), &route)).await {
        Ok(Ok(response)) => response,
        Ok(Err(err)) => AppError::from(err).into_response(),
        Err(_) => AppError::Timeout.into_response(),
    };
    tracing::info!(
        path,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "request"
    );
    response
}

async fn respond<S: SiteStore>(store: &S, route: &Route) -> Result<Response, StoreError> {
    let site = store.site_settings().await?;
    match route {
        Route::RobotsTxt => Ok((
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            build_robots_txt(&site),
        )
            .into_response()),
        Route::Sitemap => {
            let pages = store.sitemap_pages().await?;
            Ok((
                [(header::CONTENT_TYPE, "application/xml")],
                build_sitemap_xml(&site, &pages),
            )
                .into_response())
        }
        Route::Home => {
            let slug = site.homepage_slug.clone();
            page(store, &slug, site).await
        }
        Route::Slug(slug) => page(store, slug, site).await,
        Route::NotFound => not_found(store, site).await,
    }
}

async fn page<S: SiteStore>(store: &S, slug: &str, site: SiteSettings) -> Result<Response, StoreError> {
    let Some(page) = store.published_page(slug).await? else {
        tracing::debug!(slug, "no published page");
        return not_found(store, site).await;
    };

    let explicit: Vec<i64> = [page.header_template_id, page.footer_template_id]
        .into_iter()
        .flatten()
        .collect();
    let mut templates = store.templates_by_ids(&explicit).await?;
    for (choice, kind) in [
        (page.header_template_id, TemplateType::Header),
        (page.footer_template_id, TemplateType::Footer),
    ] {
        let found = choice.is_some_and(|id| templates.iter().any(|t| t.id == id && t.template_type == kind));
        if !found {
            if let Some(system) = store.published_system_template(kind).await? {
                templates.push(system);
            }
        }
    }

    let ctx = PageRenderContext::new(page, site, TemplateCatalog::new(templates));
    Ok(Html(compose_page(&ctx)).into_response())
}

async fn not_found<S: SiteStore>(store: &S, site: SiteSettings) -> Result<Response, StoreError> {
    let mut templates = Vec::new();
    for kind in [TemplateType::NotFound, TemplateType::Header, TemplateType::Footer] {
        if let Some(template) = store.published_system_template(kind).await? {
            templates.push(template);
        }
    }
    let ctx = NotFoundContext {
        site_settings: site,
        templates: TemplateCatalog::new(templates),
    };
    Ok((StatusCode::NOT_FOUND, Html(compose_404(&ctx))).into_response())
}
