use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use exchange_gateway::cache::{RedisStore, SharedCache};
use exchange_gateway::clients::{MoexClient, SpbexClient};
use exchange_gateway::config::Config;
use exchange_gateway::server::{create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env();
    init_tracing(config.verbose);

    let cache: SharedCache = match &config.redis_url {
        Some(url) => {
            let store =
                RedisStore::connect(url).with_context(|| format!("connecting to cache at {url}"))?;
            info!("page cache enabled");
            Some(Arc::new(store))
        }
        None => {
            info!("page cache disabled");
            None
        }
    };

    let state = Arc::new(AppState {
        moex: Arc::new(MoexClient::new(cache)),
        spbex: Arc::new(SpbexClient::new()),
    });

    let addr = format!("{}:{}", config.bind, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!("listening on {addr}");

    axum::serve(listener, create_router(state)).await?;
    Ok(())
}

// Logging stays off unless the verbose flag is set; RUST_LOG can still
// override the verbose default.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::new("off")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
