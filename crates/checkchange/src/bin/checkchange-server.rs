use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use checkchange::{AppState, LexiconPipeline, ServerConfig, router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::parse();
    init_tracing();

    info!("binding to {}:{}", config.host, config.port);
    info!(
        "using lexicon at {} (mode: {:?})",
        config.lexicon_dir.display(),
        config.load_mode
    );
    info!("max order items: {}", config.max_items);

    let nlp = LexiconPipeline::load(&config.lexicon_dir, config.load_mode)?;
    let state = AppState {
        nlp: Arc::new(nlp),
        max_items: config.max_items,
    };

    let app = router(state).layer(TraceLayer::new_for_http());
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("invalid listen address {}:{}", config.host, config.port))?;
    let listener = TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;
    Ok(())
}

fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();
}
