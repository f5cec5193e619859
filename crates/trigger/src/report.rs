//! Per-target log lines and the run summary line.

use sitecron_core::{RunOutcome, RunSummary};

/// Human-readable line for one outcome: status, target and detail.
pub fn outcome_line(outcome: &RunOutcome) -> String {
    format!("[{}] {}: {}", outcome.status, outcome.target, outcome.detail)
}

/// Log every outcome and the final summary, and return the summary.
///
/// Outcomes may arrive in any order; each line is attributed through the
/// outcome's own target reference.
pub fn report(outcomes: &[RunOutcome]) -> RunSummary {
    for outcome in outcomes {
        let line = outcome_line(outcome);
        if outcome.status.is_success() {
            tracing::info!(
                target_index = outcome.target.index,
                status = %outcome.status,
                "{line}",
            );
        } else {
            tracing::warn!(
                target_index = outcome.target.index,
                status = %outcome.status,
                "{line}",
            );
        }
    }

    let summary = RunSummary::from_outcomes(outcomes);
    tracing::info!(
        total = summary.total,
        succeeded = summary.succeeded,
        failed = summary.failed,
        "{summary}",
    );
    summary
}

#[cfg(test)]
mod tests {
    use sitecron_core::{OutcomeStatus, TargetRef};

    use super::*;

    #[test]
    fn outcome_line_contains_status_target_and_detail() {
        let outcome = RunOutcome::new(
            OutcomeStatus::HttpError,
            TargetRef {
                index: 1,
                base_url: Some("https://b.test".into()),
            },
            "HTTP 500 Internal Server Error: boom",
        );
        assert_eq!(
            outcome_line(&outcome),
            "[HttpError] target #1 (https://b.test): HTTP 500 Internal Server Error: boom"
        );
    }

    #[test]
    fn validation_line_uses_index_only() {
        let outcome = RunOutcome::validation_error(0, "'url' is missing or empty");
        assert_eq!(
            outcome_line(&outcome),
            "[ValidationError] target #0: 'url' is missing or empty"
        );
    }

    #[test]
    fn report_on_empty_run_is_zero_summary() {
        let summary = report(&[]);
        assert_eq!(summary.to_string(), "0 succeeded, 0 failed out of 0");
    }

    #[test]
    fn report_order_does_not_change_counts() {
        let ok = RunOutcome::new(
            OutcomeStatus::Success,
            TargetRef {
                index: 0,
                base_url: Some("https://a.test".into()),
            },
            "HTTP 200",
        );
        let bad = RunOutcome::validation_error(1, "bad");

        let forward = report(&[ok.clone(), bad.clone()]);
        let reversed = report(&[bad, ok]);
        assert_eq!(forward, reversed);
        assert_eq!(forward.succeeded, 1);
        assert_eq!(forward.failed, 1);
    }
}
