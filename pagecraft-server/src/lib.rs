//! Public HTTP front for Pagecraft sites: reads pages, templates and settings from a
//! content store and serves composed HTML, `robots.txt` and `sitemap.xml`.

pub mod config;
pub mod db;
pub mod error;
pub mod routes;
pub mod store;

pub use config::ServerConfig;
pub use error::{AppError, ConfigError, StoreError};
pub use routes::{AppState, render_path, router};
pub use store::{MemorySiteStore, PgSiteStore, SiteSnapshot, SiteStore};

use tokio::net::TcpListener;

/// Serve `store` on `listener` until Ctrl-C.
pub async fn serve<S: SiteStore>(
    listener: TcpListener,
    store: S,
    config: &ServerConfig,
) -> std::io::Result<()> {
    let app = router(AppState::new(store, config.request_timeout()));
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutdown requested");
        })
        .await
}
