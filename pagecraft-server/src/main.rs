use anyhow::{Context, bail};
use pagecraft_server::{MemorySiteStore, PgSiteStore, ServerConfig, db, serve};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::load().context("failed to load configuration")?;
    let listener = TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    tracing::info!(bind = %config.bind, "pagecraft server listening");

    if let Some(database_url) = &config.database_url {
        let pool = db::connect(database_url, config.max_connections)
            .await
            .context("failed to connect to database")?;
        if config.run_migrations {
            db::run_migrations(&pool).await.context("failed to run migrations")?;
            tracing::info!("migrations applied");
        }
        serve(listener, PgSiteStore::new(pool), &config).await?;
    } else if let Some(path) = &config.snapshot_path {
        let store = MemorySiteStore::load(path)
            .await
            .with_context(|| format!("failed to load snapshot {}", path.display()))?;
        serve(listener, store, &config).await?;
    } else {
        bail!("no content source configured");
    }

    Ok(())
}
