//! Bounded concurrent dispatch of HTTP probes.
//!
//! Each target is an independent GET; a semaphore caps how many are in
//! flight at once, and the result sequence is materialized back into
//! submission order before being handed to the caller.

use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::Client;
use tokio::sync::{watch, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, info, instrument, warn};

use crate::error::{PathRankError, PathRankResult};
use crate::metrics::ProbeMetrics;
use crate::probe::types::{ProbeFailure, ProbeOutcome, ProbeResult};

/// Dispatches synthetic GET probes with a concurrency ceiling.
pub struct ProbeRunner {
    client: Client,
    concurrency_limit: usize,
    probe_timeout: Duration,
    metrics: Option<Arc<ProbeMetrics>>,
}

impl ProbeRunner {
    /// Create a runner. `concurrency_limit = 0` means unbounded;
    /// `probe_timeout` applies to each probe independently.
    pub fn new(
        concurrency_limit: usize,
        probe_timeout: Duration,
        metrics: Option<Arc<ProbeMetrics>>,
    ) -> PathRankResult<Self> {
        let client = Client::builder()
            .pool_max_idle_per_host(concurrency_limit.max(10))
            .build()
            .map_err(|e| PathRankError::IoError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            concurrency_limit,
            probe_timeout,
            metrics,
        })
    }

    /// Dispatch all targets and collect their outcomes in input order.
    /// Individual probe failures show up as `Failure` entries; the call
    /// itself only fails if the batch as a whole cannot run.
    #[instrument(skip(self, targets), fields(targets = targets.len()))]
    pub async fn run_all(&self, targets: &[String]) -> PathRankResult<Vec<ProbeResult>> {
        // Sender kept alive for the duration of the batch so the
        // cancel branch stays quiet.
        let (_cancel_tx, cancel_rx) = watch::channel(false);
        self.run_all_inner(targets, cancel_rx).await
    }

    /// Like [`run_all`](Self::run_all), but the batch aborts as a whole
    /// when `true` is observed on `cancel`: in-flight probes are
    /// abandoned, completed results are discarded, and the call returns
    /// `Cancelled`.
    #[instrument(skip(self, targets, cancel), fields(targets = targets.len()))]
    pub async fn run_all_with_cancel(
        &self,
        targets: &[String],
        cancel: watch::Receiver<bool>,
    ) -> PathRankResult<Vec<ProbeResult>> {
        self.run_all_inner(targets, cancel).await
    }

    async fn run_all_inner(
        &self,
        targets: &[String],
        mut cancel: watch::Receiver<bool>,
    ) -> PathRankResult<Vec<ProbeResult>> {
        if targets.is_empty() {
            return Ok(Vec::new());
        }
        if *cancel.borrow() {
            return Err(PathRankError::Cancelled);
        }

        let semaphore = (self.concurrency_limit > 0)
            .then(|| Arc::new(Semaphore::new(self.concurrency_limit)));

        let mut set = JoinSet::new();
        for (index, url) in targets.iter().enumerate() {
            let client = self.client.clone();
            let url = url.clone();
            let timeout = self.probe_timeout;
            let semaphore = semaphore.clone();
            let metrics = self.metrics.clone();

            set.spawn(async move {
                let _permit = match semaphore {
                    Some(gate) => match gate.acquire_owned().await {
                        Ok(permit) => Some(permit),
                        Err(_) => {
                            return (
                                index,
                                ProbeOutcome::Failure(ProbeFailure::Connection(
                                    "dispatch gate closed".to_string(),
                                )),
                            )
                        }
                    },
                    None => None,
                };

                if let Some(metrics) = &metrics {
                    metrics.record_dispatch();
                }
                let started = Instant::now();
                let outcome = probe_one(&client, &url, timeout).await;
                if let Some(metrics) = &metrics {
                    match &outcome {
                        ProbeOutcome::Success(_) => metrics.record_success(started.elapsed()),
                        ProbeOutcome::Failure(failure) => metrics.record_failure(failure.kind()),
                    }
                }
                (index, outcome)
            });
        }

        let mut slots: Vec<Option<ProbeOutcome>> = (0..targets.len()).map(|_| None).collect();
        let mut cancel_open = true;
        loop {
            tokio::select! {
                changed = cancel.changed(), if cancel_open => match changed {
                    Ok(()) if *cancel.borrow() => {
                        set.abort_all();
                        if let Some(metrics) = &self.metrics {
                            metrics.record_cancelled_batch();
                        }
                        info!(targets = targets.len(), "probe batch cancelled");
                        return Err(PathRankError::Cancelled);
                    }
                    Ok(()) => {}
                    // Sender dropped: cancellation can no longer happen.
                    Err(_) => cancel_open = false,
                },
                joined = set.join_next() => match joined {
                    Some(Ok((index, outcome))) => slots[index] = Some(outcome),
                    Some(Err(e)) => warn!(error = %e, "probe task failed to join"),
                    None => break,
                },
            }
        }

        let results: Vec<ProbeResult> = slots
            .into_iter()
            .enumerate()
            .map(|(index, outcome)| ProbeResult {
                index,
                outcome: outcome.unwrap_or_else(|| {
                    ProbeOutcome::Failure(ProbeFailure::Connection(
                        "probe task did not complete".to_string(),
                    ))
                }),
            })
            .collect();

        debug!(
            succeeded = results.iter().filter(|r| r.outcome.is_success()).count(),
            failed = results.iter().filter(|r| !r.outcome.is_success()).count(),
            "probe batch complete"
        );
        Ok(results)
    }
}

/// Issue one GET and decode the JSON body. Every failure mode maps to a
/// `ProbeFailure`; this function never panics and never escalates.
async fn probe_one(client: &Client, url: &str, timeout: Duration) -> ProbeOutcome {
    let response = match client.get(url).timeout(timeout).send().await {
        Ok(response) => response,
        Err(e) => return ProbeOutcome::Failure(e.into()),
    };

    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return ProbeOutcome::Failure(ProbeFailure::Status {
            status: status.as_u16(),
            message,
        });
    }

    match response.json::<serde_json::Value>().await {
        Ok(body) => ProbeOutcome::Success(body),
        Err(e) => ProbeOutcome::Failure(ProbeFailure::Decode(e.to_string())),
    }
}
