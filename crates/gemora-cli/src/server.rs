//! `gemora serve`: the HTTP front end.
//!
//! Routes:
//! - `POST /api/chat`: one exchange through the reply generator
//! - `GET /api/health`: liveness probe
//! - everything else: static files from the public directory

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Serialize;
use serde_json::Value;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use gemora_agent::{ReplyBody, ReplyGenerator};
use gemora_core::config::Config;

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Command-line overrides for the server section of the config.
#[derive(Debug, Default)]
pub struct ServeOptions {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub public_dir: Option<PathBuf>,
}

/// Build the application router.
pub fn build_router(generator: Arc<ReplyGenerator>, public_dir: &Path) -> Router {
    Router::new()
        .route("/api/chat", post(chat).fallback(method_not_allowed))
        .route("/api/health", get(health_check))
        .fallback_service(ServeDir::new(public_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(generator)
}

/// Run the server until Ctrl-C.
pub async fn run(config: Config, options: ServeOptions) -> Result<()> {
    let host = options.host.unwrap_or_else(|| config.server.host.clone());
    let port = options.port.unwrap_or(config.server.port);
    let public_dir = options
        .public_dir
        .unwrap_or_else(|| gemora_core::utils::expand_home(&config.server.public_dir));

    if !public_dir.is_dir() {
        warn!(path = %public_dir.display(), "public directory not found, chat UI will 404");
    }

    let generator = Arc::new(
        ReplyGenerator::new(Arc::new(config)).context("failed to build HTTP client")?,
    );
    let app = build_router(generator, &public_dir);

    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .with_context(|| format!("invalid listen address {host}:{port}"))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!(
        address = %addr,
        public_dir = %public_dir.display(),
        "Gemora Kop server running at http://localhost:{port}"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

// ─────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────

/// `POST /api/chat`: mirrors the generator's status and body verbatim.
async fn chat(
    State(generator): State<Arc<ReplyGenerator>>,
    body: Bytes,
) -> (StatusCode, Json<ReplyBody>) {
    let message = message_from_body(&body);
    let reply = generator.generate(&message).await;
    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(reply.body))
}

async fn method_not_allowed() -> (StatusCode, Json<ReplyBody>) {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(ReplyBody {
            error: Some("Method not allowed.".to_string()),
            ..Default::default()
        }),
    )
}

async fn health_check() -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".to_string(),
            version: option_env!("CARGO_PKG_VERSION").map(|v| v.to_string()),
        }),
    )
}

/// Extract `message` from a request body.
///
/// Bodies that are not JSON objects, and missing or null messages, become
/// the empty string so the generator answers "Message is required.".
/// Numbers and booleans are stringified.
fn message_from_body(body: &[u8]) -> String {
    let Ok(value) = serde_json::from_slice::<Value>(body) else {
        return String::new();
    };
    match value.get("message") {
        Some(Value::String(s)) => s.clone(),
        Some(v @ (Value::Number(_) | Value::Bool(_))) => v.to_string(),
        _ => String::new(),
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
