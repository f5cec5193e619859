//! `sitecron-core`: domain types shared by the trigger orchestrator.
//!
//! - [`loader`] parses the raw target list.
//! - [`target`] validates one entry into a [`TargetDescriptor`].
//! - [`outcome`] holds per-target results and the [`RunSummary`] fold.
//! - [`protocol`] pins the outbound request's path and headers.

pub mod error;
pub mod loader;
pub mod outcome;
pub mod protocol;
pub mod target;

pub use error::ConfigError;
pub use loader::parse_targets;
pub use outcome::{OutcomeStatus, RunOutcome, RunSummary, TargetRef};
pub use target::TargetDescriptor;
