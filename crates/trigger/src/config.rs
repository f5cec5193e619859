//! Service settings and the target-list provider.
//!
//! Settings are read once at startup. The target list itself is read
//! through a [`ConfigProvider`] on every run, so edits to it take effect
//! on the next tick without a restart.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use sitecron_core::protocol::DEFAULT_TIMEOUT_MS;

use crate::error::TriggerError;

/// Environment variable holding the JSON target list.
pub const TARGETS_ENV_VAR: &str = "SITECRON_TARGETS";

/// Default scheduler cadence.
const DEFAULT_INTERVAL_SECS: u64 = 60;

/// Scheduling resolution floor; shorter intervals are raised to this.
pub const MIN_INTERVAL_SECS: u64 = 60;

// ---------------------------------------------------------------------------
// Target list provider
// ---------------------------------------------------------------------------

/// Source of the raw target configuration string.
///
/// Returns `None` when the setting is absent. Implementations must not
/// cache across calls; the orchestrator calls this once per run.
pub trait ConfigProvider: Send + Sync {
    fn targets_json(&self) -> Option<String>;
}

/// Reads the target list from an environment variable.
#[derive(Debug, Clone)]
pub struct EnvConfig {
    var: String,
}

impl EnvConfig {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self::new(TARGETS_ENV_VAR)
    }
}

impl ConfigProvider for EnvConfig {
    fn targets_json(&self) -> Option<String> {
        std::env::var(&self.var).ok()
    }
}

/// Fixed target list, mainly for tests and one-off invocations.
#[derive(Debug, Clone)]
pub struct StaticConfig(Option<String>);

impl StaticConfig {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(Some(raw.into()))
    }

    /// A provider whose setting is absent.
    pub fn missing() -> Self {
        Self(None)
    }
}

impl ConfigProvider for StaticConfig {
    fn targets_json(&self) -> Option<String> {
        self.0.clone()
    }
}

// ---------------------------------------------------------------------------
// Service settings
// ---------------------------------------------------------------------------

/// Service settings loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerSettings {
    /// Per-target deadline, measured from request issuance.
    pub timeout: Duration,
    /// Scheduler cadence (never below [`MIN_INTERVAL_SECS`]).
    pub interval: Duration,
    /// Bind address for the manual-trigger endpoint, if enabled.
    pub http_addr: Option<SocketAddr>,
}

impl Default for TriggerSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            interval: Duration::from_secs(DEFAULT_INTERVAL_SECS),
            http_addr: None,
        }
    }
}

impl TriggerSettings {
    /// Load settings from the process environment.
    ///
    /// | Env Var                 | Default |
    /// |-------------------------|---------|
    /// | `TRIGGER_TIMEOUT_MS`    | `10000` |
    /// | `TRIGGER_INTERVAL_SECS` | `60`    |
    /// | `TRIGGER_HTTP_ADDR`     | unset   |
    pub fn from_env() -> Result<Self, TriggerError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load settings through an arbitrary lookup function.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, TriggerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let timeout_ms: u64 = parse_var(&lookup, "TRIGGER_TIMEOUT_MS", DEFAULT_TIMEOUT_MS)?;
        if timeout_ms == 0 {
            return Err(TriggerError::Settings {
                name: "TRIGGER_TIMEOUT_MS",
                reason: "must be greater than zero".into(),
            });
        }

        let interval_secs: u64 =
            parse_var(&lookup, "TRIGGER_INTERVAL_SECS", DEFAULT_INTERVAL_SECS)?;
        let interval_secs = if interval_secs < MIN_INTERVAL_SECS {
            tracing::warn!(
                requested = interval_secs,
                applied = MIN_INTERVAL_SECS,
                "TRIGGER_INTERVAL_SECS below minimum, clamping",
            );
            MIN_INTERVAL_SECS
        } else {
            interval_secs
        };

        let http_addr = match lookup("TRIGGER_HTTP_ADDR").filter(|v| !v.trim().is_empty()) {
            Some(raw) => Some(raw.trim().parse::<SocketAddr>().map_err(|e| TriggerError::Settings {
                name: "TRIGGER_HTTP_ADDR",
                reason: format!("'{raw}' is not a socket address: {e}"),
            })?),
            None => None,
        };

        Ok(Self {
            timeout: Duration::from_millis(timeout_ms),
            interval: Duration::from_secs(interval_secs),
            http_addr,
        })
    }
}

fn parse_var<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, TriggerError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(raw) if !raw.trim().is_empty() => {
            raw.trim().parse().map_err(|e: T::Err| TriggerError::Settings {
                name,
                reason: format!("'{raw}': {e}"),
            })
        }
        _ => Ok(default),
    }
}
