//! Wire-level constants for the outbound trigger request.
//!
//! Shared by the dispatcher and by tests that stand in for remote sites,
//! so both sides agree on the path and header names.

/// Maintenance path appended to every normalized base URL.
pub const TRIGGER_PATH: &str = "/wp-cron.php?doing_wp_cron";

/// Header carrying the per-target shared secret.
pub const AUTH_HEADER: &str = "X-Worker-Auth";

/// Fixed `User-Agent` sent with every trigger request.
pub const USER_AGENT: &str = concat!("sitecron-trigger/", env!("CARGO_PKG_VERSION"));

/// Default per-target deadline in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Maximum number of response-body characters kept in an `HttpError` detail.
pub const MAX_BODY_SNIPPET_CHARS: usize = 500;

/// Substituted when an error response body cannot be read.
pub const UNREADABLE_BODY: &str = "<unreadable body>";
