//! Concurrent fan-out of trigger requests.
//!
//! Every candidate runs as its own Tokio task. A task's result is always
//! a [`RunOutcome`]; timeouts, HTTP errors, network errors and even a
//! panicking task are recorded for that target only and never reach the
//! sibling tasks or the caller.

use std::time::Duration;

use futures::future::join_all;
use reqwest::header::{CACHE_CONTROL, PRAGMA, USER_AGENT};
use serde_json::Value;
use sitecron_core::protocol::{self, AUTH_HEADER, MAX_BODY_SNIPPET_CHARS, UNREADABLE_BODY};
use sitecron_core::{OutcomeStatus, RunOutcome, TargetDescriptor, TargetRef};
use tokio::task::JoinHandle;
use tokio::time::{timeout_at, Instant};
use tracing::Instrument;

use crate::http;

/// Trigger every candidate concurrently and wait for all of them to settle.
///
/// Returns exactly one outcome per candidate, in input order.
pub async fn dispatch(
    client: &reqwest::Client,
    candidates: Vec<Value>,
    timeout: Duration,
) -> Vec<RunOutcome> {
    let handles: Vec<_> = candidates
        .into_iter()
        .enumerate()
        .map(|(index, candidate)| {
            let client = client.clone();
            tokio::spawn(
                async move { trigger_candidate(&client, index, &candidate, timeout).await }
                    .in_current_span(),
            )
        })
        .collect();

    collect_outcomes(handles).await
}

/// Wait for every per-target task and turn each into an outcome.
///
/// Handles are matched to targets by position. A task that panicked or
/// was cancelled becomes a `NetworkError` for its own index only.
pub async fn collect_outcomes(handles: Vec<JoinHandle<RunOutcome>>) -> Vec<RunOutcome> {
    join_all(handles)
        .await
        .into_iter()
        .enumerate()
        .map(|(index, joined)| match joined {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(target_index = index, error = %e, "Trigger task did not complete");
                RunOutcome::new(
                    OutcomeStatus::NetworkError,
                    TargetRef {
                        index,
                        base_url: None,
                    },
                    format!("trigger task did not complete: {e}"),
                )
            }
        })
        .collect()
}

/// Validate one raw entry and, if it is well-formed, trigger it.
pub async fn trigger_candidate(
    client: &reqwest::Client,
    index: usize,
    candidate: &Value,
    timeout: Duration,
) -> RunOutcome {
    match TargetDescriptor::from_candidate(index, candidate) {
        Ok(target) => trigger_target(client, &target, timeout).await,
        Err(reason) => RunOutcome::validation_error(index, reason),
    }
}

/// Issue the authenticated trigger request for one validated target.
///
/// The deadline starts when the request is issued and also bounds the
/// error-body read. The deadline timer lives inside this future and is
/// dropped with it on every return path.
pub async fn trigger_target(
    client: &reqwest::Client,
    target: &TargetDescriptor,
    timeout: Duration,
) -> RunOutcome {
    let target_ref = TargetRef::from(target);
    let endpoint = target.endpoint();

    tracing::debug!(target_index = target.index, url = %endpoint, "Dispatching trigger");

    let request = client
        .get(&endpoint)
        .header(USER_AGENT, protocol::USER_AGENT)
        .header(AUTH_HEADER, &target.auth_key)
        .header(CACHE_CONTROL, "no-cache")
        .header(PRAGMA, "no-cache");

    let deadline = Instant::now() + timeout;

    let response = match timeout_at(deadline, request.send()).await {
        Err(_elapsed) => {
            return RunOutcome::new(
                OutcomeStatus::Timeout,
                target_ref,
                format!(
                    "no response from {} within {} ms",
                    target.base_url,
                    timeout.as_millis()
                ),
            );
        }
        Ok(Err(e)) => {
            return RunOutcome::new(OutcomeStatus::NetworkError, target_ref, http::describe_error(&e));
        }
        Ok(Ok(response)) => response,
    };

    let status = response.status();
    if status.is_success() {
        return RunOutcome::new(
            OutcomeStatus::Success,
            target_ref,
            format!("HTTP {}", status.as_u16()),
        );
    }

    let body = match timeout_at(
        deadline,
        http::read_body_snippet(response, MAX_BODY_SNIPPET_CHARS),
    )
    .await
    {
        Ok(Ok(body)) => body,
        Ok(Err(e)) => {
            tracing::debug!(target_index = target.index, error = %e, "Error body unreadable");
            UNREADABLE_BODY.to_string()
        }
        Err(_elapsed) => UNREADABLE_BODY.to_string(),
    };

    RunOutcome::new(
        OutcomeStatus::HttpError,
        target_ref,
        format!(
            "HTTP {} {}: {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("Unknown Status"),
            body
        ),
    )
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use sitecron_core::RunSummary;

    use super::*;

    #[tokio::test]
    async fn invalid_candidates_never_reach_the_network() {
        // Any request issued here would fail with NetworkError, not ValidationError.
        let client = http::build_client().unwrap();
        let candidates = vec![
            json!({"url": "not-a-url", "key": "k"}),
            json!({"url": "https://a.test"}),
            json!({"key": "k"}),
            json!([1, 2, 3]),
            json!({"url": "https:///", "key": "k"}),
        ];

        let outcomes = dispatch(&client, candidates, Duration::from_millis(100)).await;

        assert_eq!(outcomes.len(), 5);
        for (index, outcome) in outcomes.iter().enumerate() {
            assert_eq!(outcome.status, OutcomeStatus::ValidationError);
            assert_eq!(outcome.target.index, index);
            assert!(outcome.target.base_url.is_none());
        }
    }

    #[tokio::test]
    async fn empty_candidate_list_yields_no_outcomes() {
        let client = http::build_client().unwrap();
        let outcomes = dispatch(&client, Vec::new(), Duration::from_millis(100)).await;
        assert!(outcomes.is_empty());
    }

    #[tokio::test]
    async fn refused_connection_is_network_error() {
        // Bind then drop a listener to get a local port with nothing behind it.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let client = http::build_client().unwrap();
        let candidate = json!({"url": format!("http://127.0.0.1:{port}"), "key": "k"});
        let outcome = trigger_candidate(&client, 0, &candidate, Duration::from_secs(5)).await;

        assert_eq!(outcome.status, OutcomeStatus::NetworkError);
        assert!(
            outcome.detail.to_lowercase().contains("refused"),
            "cause missing from detail: {}",
            outcome.detail
        );
    }

    #[tokio::test]
    async fn panicking_task_is_captured_for_its_own_index() {
        let handles = vec![
            tokio::spawn(async {
                RunOutcome::new(
                    OutcomeStatus::Success,
                    TargetRef {
                        index: 0,
                        base_url: Some("https://a.test".into()),
                    },
                    "HTTP 200",
                )
            }),
            tokio::spawn(async { panic!("trigger task blew up") }),
            tokio::spawn(async { RunOutcome::validation_error(2, "'url' is missing or empty") }),
        ];

        let outcomes = collect_outcomes(handles).await;

        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes[0].status, OutcomeStatus::Success);
        assert_eq!(outcomes[0].target.index, 0);

        assert_eq!(outcomes[1].status, OutcomeStatus::NetworkError);
        assert_eq!(outcomes[1].target.index, 1);
        assert!(outcomes[1].target.base_url.is_none());
        assert!(outcomes[1].detail.contains("did not complete"));

        assert_eq!(outcomes[2].status, OutcomeStatus::ValidationError);
        assert_eq!(outcomes[2].target.index, 2);

        let summary = RunSummary::from_outcomes(&outcomes);
        assert_eq!(summary.to_string(), "1 succeeded, 2 failed out of 3");
    }
}
