//! One trigger run: load targets, fan out, report.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;
use sitecron_core::{parse_targets, ConfigError, RunOutcome, RunSummary};
use tokio::task::JoinHandle;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::ConfigProvider;
use crate::error::TriggerError;
use crate::{dispatcher, http, report};

/// Everything a completed run produced.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub outcomes: Vec<RunOutcome>,
    pub summary: RunSummary,
}

/// Fan-out trigger orchestrator.
///
/// Holds no state between runs apart from the shared HTTP client; the
/// target list is fetched from the provider at the start of every run.
pub struct Orchestrator {
    provider: Arc<dyn ConfigProvider>,
    client: reqwest::Client,
    timeout: Duration,
}

impl Orchestrator {
    /// Create an orchestrator with a freshly built HTTP client.
    pub fn new(provider: Arc<dyn ConfigProvider>, timeout: Duration) -> Result<Self, TriggerError> {
        Ok(Self::with_client(provider, http::build_client()?, timeout))
    }

    /// Create an orchestrator reusing an existing [`reqwest::Client`].
    pub fn with_client(
        provider: Arc<dyn ConfigProvider>,
        client: reqwest::Client,
        timeout: Duration,
    ) -> Self {
        Self {
            provider,
            client,
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Execute one run and wait until every target has settled.
    ///
    /// Only run-level configuration problems are returned as errors; those
    /// abort the run before any request is issued.
    pub async fn run(&self) -> Result<RunReport, ConfigError> {
        let run_id = Uuid::now_v7();
        let span = tracing::info_span!("trigger_run", %run_id);

        async move {
            let started_at = Utc::now();
            let clock = Instant::now();

            let raw = self.provider.targets_json();
            let candidates = match parse_targets(raw.as_deref()) {
                Ok(candidates) => candidates,
                Err(e) => {
                    tracing::error!(code = e.code(), error = %e, "Run aborted, no targets triggered");
                    return Err(e);
                }
            };

            if candidates.is_empty() {
                tracing::info!("No targets configured, nothing to trigger");
            } else {
                tracing::info!(
                    targets = candidates.len(),
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Dispatching triggers",
                );
            }

            let outcomes = dispatcher::dispatch(&self.client, candidates, self.timeout).await;
            let summary = report::report(&outcomes);

            Ok(RunReport {
                run_id,
                started_at,
                duration_ms: clock.elapsed().as_millis() as u64,
                outcomes,
                summary,
            })
        }
        .instrument(span)
        .await
    }

    /// Start a run in the background and return its completion handle.
    ///
    /// The run keeps going even if the handle is dropped; callers that
    /// must not exit early await the handle.
    pub fn spawn_run(self: &Arc<Self>) -> JoinHandle<Result<RunReport, ConfigError>> {
        let this = Arc::clone(self);
        tokio::spawn(async move { this.run().await })
    }
}
