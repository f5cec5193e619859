//! `sitecron-trigger` library crate.
//!
//! Fans out authenticated `wp-cron.php` requests to every configured site
//! on each tick, with a per-site deadline and isolated failures. The
//! binary entrypoint lives in `main.rs`.

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod http;
pub mod orchestrator;
pub mod report;
pub mod routes;
pub mod scheduler;

pub use config::{ConfigProvider, EnvConfig, StaticConfig, TriggerSettings};
pub use error::TriggerError;
pub use orchestrator::{Orchestrator, RunReport};
