//! `treat-sync` binary: load configuration, install logging, serve.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;
use treat_sync::{Config, TreatStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    treat_sync::config::load_dotenv()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env().context("loading configuration")?;
    info!(
        database_id = %config.database_id,
        api_url = %config.api_url,
        schema = %config.schema,
        "starting treat sync"
    );

    let store = Arc::new(TreatStore::from_config(&config));
    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.bind_addr))?;
    info!(addr = %config.bind_addr, "listening");

    treat_sync::run(listener, store).await?;
    Ok(())
}
