use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::llm_client::LlmError;

/// Every way a relay request can fail.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, RelayError>`;
/// the body is always `{"error": "<message>"}`.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Server configuration error: API key is not set.")]
    Configuration,

    #[error("Only POST requests are allowed.")]
    MethodNotAllowed,

    #[error("Prompt is required.")]
    MissingPrompt,

    #[error("{message}")]
    UpstreamRejected { status: u16, message: String },

    #[error("Upstream transport error: {0}")]
    UpstreamTransport(String),

    #[error("{0}")]
    ContentUnavailable(String),
}

impl RelayError {
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::Configuration | RelayError::UpstreamTransport(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            RelayError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            RelayError::MissingPrompt | RelayError::ContentUnavailable(_) => {
                StatusCode::BAD_REQUEST
            }
            RelayError::UpstreamRejected { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
        }
    }
}

impl From<LlmError> for RelayError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Api { status, message } => RelayError::UpstreamRejected { status, message },
            LlmError::Http(e) => RelayError::UpstreamTransport(e.to_string()),
            LlmError::Parse(e) => {
                RelayError::UpstreamTransport(format!("malformed upstream response: {e}"))
            }
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = match &self {
            RelayError::Configuration => {
                tracing::error!("GEMINI_API_KEY is not configured");
                self.to_string()
            }
            RelayError::UpstreamRejected { status, message } => {
                tracing::error!("Gemini API returned {status}: {message}");
                message.clone()
            }
            RelayError::UpstreamTransport(detail) => {
                tracing::error!("Upstream call failed: {detail}");
                "An internal server error occurred.".to_string()
            }
            _ => self.to_string(),
        };

        let mut response = (status, Json(json!({ "error": message }))).into_response();

        if matches!(self, RelayError::MethodNotAllowed) {
            response
                .headers_mut()
                .insert(header::ALLOW, HeaderValue::from_static("POST"));
        }

        response
    }
}
