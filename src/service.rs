//! Service layer tying the codec, store, sampler, and probe runner
//! together behind the three public operations.

use std::sync::Arc;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::codec;
use crate::config::Config;
use crate::error::PathRankResult;
use crate::metrics::Metrics;
use crate::probe::{ProbeResult, ProbeRunner};
use crate::sampler::{self, SampleSpec};
use crate::store::CounterStore;

/// A display path and its current hit count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathCount {
    pub path: String,
    pub count: u64,
}

/// The application service consumed by the HTTP adapter.
pub struct PathRankService {
    store: Arc<CounterStore>,
    runner: ProbeRunner,
    sampler_spec: SampleSpec,
    base_url: String,
    sample_seed: Option<u64>,
    metrics: Arc<Metrics>,
}

impl PathRankService {
    pub fn new(config: &Config, metrics: Arc<Metrics>) -> PathRankResult<Self> {
        let store = Arc::new(CounterStore::new(std::time::Duration::from_millis(
            config.store.op_timeout_ms,
        )));
        let runner = ProbeRunner::new(
            config.probe.concurrency_limit,
            std::time::Duration::from_millis(config.probe.timeout_ms),
            Some(Arc::clone(&metrics.probe)),
        )?;

        Ok(Self {
            store,
            runner,
            sampler_spec: config.sampler.clone(),
            base_url: config.server.base_url.trim_end_matches('/').to_string(),
            sample_seed: config.probe.sample_seed,
            metrics,
        })
    }

    /// Record one visit to `raw_path` and return the canonical path
    /// with its new count.
    #[instrument(skip(self))]
    pub fn record_visit(&self, raw_path: &str) -> PathRankResult<PathCount> {
        let key = codec::normalize(raw_path)?;

        let started = Instant::now();
        let result = self.store.increment_and_rank(&key, 1);
        match &result {
            Ok(_) => self.metrics.store.record_increment(started.elapsed()),
            Err(_) => self.metrics.store.record_error(),
        }
        let (count, rank) = result?;

        debug!(path = %key, count, rank, "visit recorded");
        Ok(PathCount { path: key, count })
    }

    /// Full leaderboard: every tracked path ordered by descending count,
    /// ties ascending by path.
    #[instrument(skip(self))]
    pub fn leaderboard(&self) -> PathRankResult<Vec<PathCount>> {
        let result = self.store.descending_range(0, -1);
        match &result {
            Ok(entries) => self.metrics.store.record_range_read(entries.len()),
            Err(_) => self.metrics.store.record_error(),
        }

        Ok(result?
            .into_iter()
            .map(|entry| PathCount {
                path: entry.key,
                count: entry.score,
            })
            .collect())
    }

    /// Generate `sample_count` synthetic paths and probe this service's
    /// own visit endpoint with them concurrently. Individual probe
    /// failures appear as entries in the result; only a whole-batch
    /// problem fails the call.
    #[instrument(skip(self))]
    pub async fn run_load_test(&self, sample_count: usize) -> PathRankResult<Vec<ProbeResult>> {
        let mut rng = match self.sample_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let paths = sampler::generate_sample(&mut rng, sample_count, &self.sampler_spec);
        let targets: Vec<String> = paths
            .iter()
            .map(|path| format!("{}{}", self.base_url, path))
            .collect();

        info!(sample_count, base_url = %self.base_url, "load test starting");
        let results = self.runner.run_all(&targets).await?;
        info!(
            succeeded = results.iter().filter(|r| r.outcome.is_success()).count(),
            failed = results.iter().filter(|r| !r.outcome.is_success()).count(),
            "load test finished"
        );
        Ok(results)
    }

    /// Shared store handle, mainly for tests and diagnostics.
    pub fn store(&self) -> &Arc<CounterStore> {
        &self.store
    }
}
