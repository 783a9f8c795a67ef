//! Shared helpers for integration tests.

use std::sync::Arc;

use pathrank::{Config, Metrics, PathRankService};

/// Bind an ephemeral port, point the config's probe base URL back at
/// it, and serve the full application router in the background.
///
/// Returns the base URL plus the shared service handle so tests can
/// inspect the store directly.
pub async fn spawn_app(mut config: Config) -> (String, Arc<PathRankService>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind test listener");
    let addr = listener.local_addr().unwrap();
    let base_url = format!("http://{}", addr);

    config.server.bind = addr.to_string();
    config.server.base_url = base_url.clone();

    let metrics = Arc::new(Metrics::new());
    let service =
        Arc::new(PathRankService::new(&config, metrics).expect("failed to build service"));

    let app = pathrank::http::router(Arc::clone(&service));
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("test server died");
    });

    (base_url, service)
}

/// Default config with a fixed sampler seed so load tests reproduce.
pub fn seeded_config(seed: u64) -> Config {
    let mut config = Config::default();
    config.probe.sample_seed = Some(seed);
    config
}
