/// Run-level configuration failures.
///
/// Either variant aborts the whole run before any target is dispatched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Target configuration is missing or empty")]
    Missing,

    #[error("Target configuration is malformed: {0}")]
    Malformed(String),
}

impl ConfigError {
    /// Stable machine-readable code, used in JSON error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Missing => "CONFIG_MISSING",
            Self::Malformed(_) => "CONFIG_MALFORMED",
        }
    }
}
