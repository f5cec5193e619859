//! In-process stand-ins for remote sites.
//!
//! Each [`FakeSite`] is an axum server on `127.0.0.1:0` that answers the
//! trigger path with a fixed status, delay and body, and records every
//! request it sees.

#![allow(dead_code)]

use std::convert::Infallible;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;

/// How the fake site answers.
#[derive(Clone)]
pub enum Reply {
    /// Fixed status and body after an optional delay.
    Fixed {
        status: StatusCode,
        delay: Duration,
        body: String,
    },
    /// Error status whose body never finishes.
    StalledBody { status: StatusCode },
    /// Error status whose body is endless.
    EndlessBody { status: StatusCode },
    /// `302 Found` pointing at `location`, absolute or relative.
    Redirect { location: String },
}

/// A request as seen by the fake site.
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub query: Option<String>,
    pub auth: Option<String>,
    pub user_agent: Option<String>,
    pub cache_control: Option<String>,
    pub pragma: Option<String>,
}

struct SiteState {
    reply: Reply,
    hits: AtomicUsize,
    seen: Mutex<Vec<SeenRequest>>,
}

pub struct FakeSite {
    pub base_url: String,
    state: Arc<SiteState>,
}

impl FakeSite {
    pub fn hits(&self) -> usize {
        self.state.hits.load(Ordering::SeqCst)
    }

    pub fn seen(&self) -> Vec<SeenRequest> {
        self.state.seen.lock().unwrap().clone()
    }
}

/// Start a site replying with `status` and `body` after `delay`.
pub async fn spawn_site(status: u16, delay: Duration, body: &str) -> FakeSite {
    spawn_site_with(Reply::Fixed {
        status: StatusCode::from_u16(status).unwrap(),
        delay,
        body: body.to_string(),
    })
    .await
}

pub async fn spawn_site_with(reply: Reply) -> FakeSite {
    let state = Arc::new(SiteState {
        reply,
        hits: AtomicUsize::new(0),
        seen: Mutex::new(Vec::new()),
    });

    let app = Router::new()
        .route("/wp-cron.php", get(wp_cron))
        .route("/landing", get(|| async { StatusCode::NO_CONTENT }))
        .with_state(Arc::clone(&state));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    FakeSite {
        base_url: format!("http://{addr}"),
        state,
    }
}

/// Build a `SITECRON_TARGETS`-style JSON array from `(url, key)` pairs.
pub fn targets_json(targets: &[(&str, &str)]) -> String {
    let entries: Vec<serde_json::Value> = targets
        .iter()
        .map(|(url, key)| serde_json::json!({"url": url, "key": key}))
        .collect();
    serde_json::Value::Array(entries).to_string()
}

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

async fn wp_cron(State(state): State<Arc<SiteState>>, uri: Uri, headers: HeaderMap) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);
    state.seen.lock().unwrap().push(SeenRequest {
        query: uri.query().map(str::to_string),
        auth: header(&headers, "x-worker-auth"),
        user_agent: header(&headers, "user-agent"),
        cache_control: header(&headers, "cache-control"),
        pragma: header(&headers, "pragma"),
    });

    match state.reply.clone() {
        Reply::Fixed {
            status,
            delay,
            body,
        } => {
            tokio::time::sleep(delay).await;
            (status, body).into_response()
        }
        Reply::StalledBody { status } => {
            let stream = futures::stream::pending::<Result<Bytes, Infallible>>();
            (status, Body::from_stream(stream)).into_response()
        }
        Reply::EndlessBody { status } => {
            let stream = futures::stream::repeat_with(|| {
                Ok::<_, Infallible>(Bytes::from_static(b"0123456789abcdef"))
            });
            (status, Body::from_stream(stream)).into_response()
        }
        Reply::Redirect { location } => {
            (StatusCode::FOUND, [(axum::http::header::LOCATION, location)]).into_response()
        }
    }
}
