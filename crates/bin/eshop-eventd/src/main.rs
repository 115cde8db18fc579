//! # eshop-eventd
//!
//! Opens the configured message broker, keeps its connections for the
//! lifetime of the process and closes them on SIGTERM/SIGINT.

mod shutdown;

use anyhow::Context;
use eshop_eventd::backend::Backends;
use eshop_eventd::config::Config;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("failed to load configuration")?;
    init_tracing(&config.logging.filter);

    tracing::info!(backend = %config.messaging.backend, "opening message broker");
    let backends = Backends::open(&config)
        .await
        .context("failed to open message broker")?;
    tracing::info!("eshop-eventd ready");

    let result = shutdown::shutdown_signal().await;

    backends.close().await;
    tracing::info!("shutdown complete");
    result.context("failed to install signal handlers")
}

fn init_tracing(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
