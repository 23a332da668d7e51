//! HTTP request/response types

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use pii_core::{CoreError, SanitizedLine};
use pii_engine::EngineError;
use serde::{Deserialize, Serialize};

/// JSON body accepted by `/api/logs` and `/api/redact`
#[derive(Debug, Deserialize)]
pub struct LogsRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub messages: Option<Vec<String>>,
    #[serde(default)]
    pub source: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AcceptedResponse {
    pub accepted: usize,
    pub redactions: usize,
    pub ids: Vec<String>,
}

impl AcceptedResponse {
    pub fn from_lines(lines: &[SanitizedLine]) -> Self {
        Self {
            accepted: lines.len(),
            redactions: lines.iter().map(SanitizedLine::redaction_count).sum(),
            ids: lines.iter().map(|l| l.id.to_string()).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RedactResponse {
    pub lines: Vec<SanitizedLine>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// Error returned from a handler. Messages never contain request content.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    PayloadTooLarge(String),
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// serde_json errors can quote the offending input, so only the position is kept
    pub fn invalid_json(e: &serde_json::Error) -> Self {
        ApiError::BadRequest(format!(
            "Invalid JSON body at line {} column {}",
            e.line(),
            e.column()
        ))
    }
}

impl From<CoreError> for ApiError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::EmptyLine | CoreError::EmbeddedNewline | CoreError::NotAnObject => {
                ApiError::BadRequest(e.to_string())
            }
            CoreError::LineTooLong { .. } => ApiError::PayloadTooLarge(e.to_string()),
            CoreError::Serialization(_) | CoreError::Timestamp(_) => {
                ApiError::Internal(e.to_string())
            }
        }
    }
}

impl From<EngineError> for ApiError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::Core(core) => core.into(),
            EngineError::Sink(_) | EngineError::Rules(_) => ApiError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = match self {
            ApiError::BadRequest(e) | ApiError::PayloadTooLarge(e) | ApiError::Internal(e) => e,
        };
        (status, Json(ErrorBody { error })).into_response()
    }
}
