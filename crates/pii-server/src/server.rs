use axum::{
    Json, Router,
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use std::sync::Arc;

use pii_core::LogLine;
use pii_engine::Sanitizer;
use serde_json::Value;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::protocol::{AcceptedResponse, ApiError, LogsRequest, RedactResponse};

/// Header naming the sending application for plain-text bodies
pub const SOURCE_HEADER: &str = "x-log-source";

/// Listener and HTTP-level settings
#[derive(Debug, Clone)]
pub struct ServeOptions {
    pub host: String,
    pub port: u16,
    pub max_body_bytes: usize,
    pub allow_any_origin: bool,
}

pub struct SanitizerServer {
    pub sanitizer: Arc<Sanitizer>,
    pub max_line_bytes: usize,
    /// Redact and respond, but never write to the sink
    pub dry_run: bool,
}

#[derive(Clone)]
struct AppState {
    server: Arc<SanitizerServer>,
}

impl SanitizerServer {
    pub fn router(self: Arc<Self>, max_body_bytes: usize, allow_any_origin: bool) -> Router {
        let cors = if allow_any_origin {
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        } else {
            CorsLayer::new()
        };

        Router::new()
            .route("/", get(handle_info))
            .route("/health", get(handle_info))
            .route("/api/logs", post(api_ingest_logs))
            .route("/api/redact", post(api_redact))
            .route("/api/records", post(api_ingest_record))
            .layer(DefaultBodyLimit::max(max_body_bytes))
            .layer(cors)
            .layer(TraceLayer::new_for_http())
            .with_state(AppState { server: self })
    }

    /// Bind, serve until Ctrl-C/SIGTERM, then flush the sink
    pub async fn serve(self: Arc<Self>, options: ServeOptions) -> anyhow::Result<()> {
        let sanitizer = Arc::clone(&self.sanitizer);
        let app = self.router(options.max_body_bytes, options.allow_any_origin);

        let addr = format!("{}:{}", options.host, options.port);
        let listener = TcpListener::bind(&addr).await?;

        info!(
            "PII sanitizer listening on {} (output: {})",
            addr,
            sanitizer.sink().describe()
        );

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Shutting down, flushing output");
        sanitizer.sink().flush().await?;

        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
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
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

/// GET handler for server info/health check
async fn handle_info() -> Json<Value> {
    Json(serde_json::json!({
        "name": "pii-sanitizer",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "ok"
    }))
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/json"))
}

/// Turn a request body into validated log lines.
///
/// JSON bodies carry `message` or `messages`; anything else is treated as
/// UTF-8 text with one log line per line.
fn parse_lines(headers: &HeaderMap, body: &[u8], max_line_bytes: usize) -> Result<Vec<LogLine>, ApiError> {
    if body.is_empty() {
        return Err(ApiError::BadRequest("Request body is empty".to_string()));
    }

    if is_json(headers) {
        let req: LogsRequest =
            serde_json::from_slice(body).map_err(|e| ApiError::invalid_json(&e))?;

        return match (req.message, req.messages) {
            (Some(message), None) => Ok(vec![LogLine::new(&message, req.source, max_line_bytes)?]),
            (None, Some(messages)) if !messages.is_empty() => messages
                .iter()
                .map(|m| LogLine::new(m, req.source.clone(), max_line_bytes).map_err(ApiError::from))
                .collect(),
            _ => Err(ApiError::BadRequest(
                "Expected exactly one of 'message' or a non-empty 'messages'".to_string(),
            )),
        };
    }

    let text = std::str::from_utf8(body)
        .map_err(|_| ApiError::BadRequest("Request body is not valid UTF-8".to_string()))?;
    let source = headers
        .get(SOURCE_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    Ok(LogLine::split_batch(text, source, max_line_bytes)?)
}

/// POST /api/logs - Redact and append log lines
async fn api_ingest_logs(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    let server = &state.server;
    let lines = match parse_lines(&headers, &body, server.max_line_bytes) {
        Ok(lines) => lines,
        Err(e) => return e.into_response(),
    };

    if server.dry_run {
        let sanitized = lines.iter().map(|l| server.sanitizer.sanitize(l)).collect();
        return Json(RedactResponse { lines: sanitized }).into_response();
    }

    match server.sanitizer.ingest_batch(lines).await {
        Ok(sanitized) => (
            StatusCode::CREATED,
            Json(AcceptedResponse::from_lines(&sanitized)),
        )
            .into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// POST /api/redact - Redact log lines without writing them
async fn api_redact(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    let server = &state.server;
    match parse_lines(&headers, &body, server.max_line_bytes) {
        Ok(lines) => {
            let sanitized = lines.iter().map(|l| server.sanitizer.sanitize(l)).collect();
            Json(RedactResponse { lines: sanitized }).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// POST /api/records - Scan a structured JSON record and append the masked copy
async fn api_ingest_record(State(state): State<AppState>, body: Bytes) -> Response {
    let server = &state.server;
    let record: Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => return ApiError::invalid_json(&e).into_response(),
    };

    if server.dry_run {
        return match record {
            Value::Object(map) => Json(server.sanitizer.scan_record(&map)).into_response(),
            _ => ApiError::from(pii_core::CoreError::NotAnObject).into_response(),
        };
    }

    match server.sanitizer.ingest_record(record).await {
        Ok(outcome) => (StatusCode::CREATED, Json(outcome)).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}
