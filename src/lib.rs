pub mod codec;
pub mod config;
pub mod error;
pub mod http;
pub mod metrics;
pub mod probe;
pub mod sampler;
pub mod service;
pub mod sharded;
pub mod store;

pub use config::{CliArgs, Config};
pub use error::{PathRankError, PathRankResult};
pub use metrics::Metrics;
pub use probe::{ProbeFailure, ProbeOutcome, ProbeResult, ProbeRunner};
pub use sampler::SampleSpec;
pub use service::{PathCount, PathRankService};
pub use sharded::ShardedCounter;
pub use store::{CounterEntry, CounterStore};

use anyhow::{Context, Result};
use std::sync::Arc;

pub async fn run(config: Config) -> Result<()> {
    tracing::info!(operation = "startup", "pathrank starting");
    tracing::debug!(config = ?config, "Configuration loaded");

    let metrics = Arc::new(Metrics::new());

    let service = Arc::new(
        PathRankService::new(&config, Arc::clone(&metrics))
            .context("Failed to build service")?,
    );
    let app = http::router(service);

    let listener = tokio::net::TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind))?;
    tracing::info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // Log final metrics on shutdown
    metrics.log_full_summary();

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        tracing::info!("shutdown signal received");
    }
}
