//! `sitecron-trigger` -- periodic `wp-cron.php` fan-out daemon.
//!
//! Usage: `sitecron-trigger [schedule|once]` (default `schedule`).
//!
//! # Environment variables
//!
//! | Variable                | Required | Default | Description                               |
//! |-------------------------|----------|---------|-------------------------------------------|
//! | `SITECRON_TARGETS`      | yes      | --      | JSON array of `{"url", "key"}` objects    |
//! | `TRIGGER_TIMEOUT_MS`    | no       | `10000` | Per-site request deadline                 |
//! | `TRIGGER_INTERVAL_SECS` | no       | `60`    | Seconds between runs (minimum 60)         |
//! | `TRIGGER_HTTP_ADDR`     | no       | --      | Enables `POST /run`, e.g. `127.0.0.1:8080`|
//! | `LOG_FORMAT`            | no       | --      | `json` for JSON log lines                 |

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sitecron_trigger::config::{EnvConfig, TriggerSettings};
use sitecron_trigger::{routes, scheduler, Orchestrator};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    let settings = TriggerSettings::from_env().unwrap_or_else(|e| {
        tracing::error!(error = %e, "Invalid configuration");
        std::process::exit(1);
    });

    let orchestrator = Orchestrator::new(Arc::new(EnvConfig::default()), settings.timeout)
        .map(Arc::new)
        .unwrap_or_else(|e| {
            tracing::error!(error = %e, "Failed to initialise orchestrator");
            std::process::exit(1);
        });

    match std::env::args().nth(1).as_deref() {
        Some("once") => {
            let code = match orchestrator.run().await {
                Ok(_) => 0,
                Err(_) => 1,
            };
            std::process::exit(code);
        }
        None | Some("schedule") => {}
        Some(other) => {
            tracing::error!(command = other, "Unknown command, expected 'schedule' or 'once'");
            std::process::exit(2);
        }
    }

    tracing::info!(
        interval_secs = settings.interval.as_secs(),
        timeout_ms = settings.timeout.as_millis() as u64,
        manual_trigger = settings.http_addr.is_some(),
        "Starting sitecron-trigger",
    );

    let cancel = CancellationToken::new();
    let scheduler_handle = tokio::spawn(scheduler::run(
        Arc::clone(&orchestrator),
        settings.interval,
        cancel.clone(),
    ));

    let server_handle = match settings.http_addr {
        Some(addr) => {
            let listener = tokio::net::TcpListener::bind(addr).await.unwrap_or_else(|e| {
                tracing::error!(%addr, error = %e, "Failed to bind manual-trigger listener");
                std::process::exit(1);
            });
            tracing::info!(%addr, "Manual trigger endpoint listening");

            let app = routes::router(Arc::clone(&orchestrator)).layer(TraceLayer::new_for_http());
            let shutdown = cancel.clone();
            Some(tokio::spawn(async move {
                if let Err(e) = axum::serve(listener, app)
                    .with_graceful_shutdown(shutdown.cancelled_owned())
                    .await
                {
                    tracing::error!(error = %e, "Manual trigger endpoint failed");
                }
            }))
        }
        None => None,
    };

    shutdown_signal().await;
    cancel.cancel();

    // Let an in-flight run settle before the process exits.
    if let Err(e) = scheduler_handle.await {
        tracing::error!(error = %e, "Scheduler task failed");
    }
    if let Some(handle) = server_handle {
        let _ = handle.await;
    }

    tracing::info!("Graceful shutdown complete");
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "sitecron_trigger=info,tower_http=info".into());

    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

/// Wait for SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
