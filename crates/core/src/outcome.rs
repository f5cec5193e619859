//! Per-target outcomes and the run summary fold.

use std::fmt;

use serde::Serialize;

use crate::target::TargetDescriptor;

/// Terminal state of one target's trigger attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OutcomeStatus {
    Success,
    HttpError,
    Timeout,
    ValidationError,
    NetworkError,
}

impl OutcomeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::HttpError => "HttpError",
            Self::Timeout => "Timeout",
            Self::ValidationError => "ValidationError",
            Self::NetworkError => "NetworkError",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

impl fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which configured entry an outcome belongs to.
///
/// `base_url` is `None` when the entry failed validation before a
/// descriptor could be built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetRef {
    pub index: usize,
    pub base_url: Option<String>,
}

impl From<&TargetDescriptor> for TargetRef {
    fn from(target: &TargetDescriptor) -> Self {
        Self {
            index: target.index,
            base_url: Some(target.base_url.clone()),
        }
    }
}

impl fmt::Display for TargetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.base_url {
            Some(url) => write!(f, "target #{} ({url})", self.index),
            None => write!(f, "target #{}", self.index),
        }
    }
}

/// Result of dispatching to one target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunOutcome {
    pub status: OutcomeStatus,
    pub target: TargetRef,
    pub detail: String,
}

impl RunOutcome {
    pub fn new(status: OutcomeStatus, target: TargetRef, detail: impl Into<String>) -> Self {
        Self {
            status,
            target,
            detail: detail.into(),
        }
    }

    /// Outcome for an entry rejected before any request was issued.
    pub fn validation_error(index: usize, reason: impl Into<String>) -> Self {
        Self::new(
            OutcomeStatus::ValidationError,
            TargetRef {
                index,
                base_url: None,
            },
            reason,
        )
    }
}

/// Aggregate counts for one run.
///
/// Validation failures count as failed, the same as HTTP and network
/// failures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl RunSummary {
    pub fn from_outcomes<'a, I>(outcomes: I) -> Self
    where
        I: IntoIterator<Item = &'a RunOutcome>,
    {
        outcomes
            .into_iter()
            .fold(Self::default(), |mut acc, outcome| {
                acc.total += 1;
                if outcome.status.is_success() {
                    acc.succeeded += 1;
                } else {
                    acc.failed += 1;
                }
                acc
            })
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} succeeded, {} failed out of {}",
            self.succeeded, self.failed, self.total
        )
    }
}
