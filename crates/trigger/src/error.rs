/// Startup errors for the trigger service.
///
/// Run-level configuration problems are [`sitecron_core::ConfigError`];
/// per-target failures are never errors at all, they are reported as
/// [`sitecron_core::RunOutcome`] values.
#[derive(Debug, thiserror::Error)]
pub enum TriggerError {
    /// An environment setting has an unusable value.
    #[error("Invalid setting {name}: {reason}")]
    Settings { name: &'static str, reason: String },

    /// The shared HTTP client could not be built.
    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}
