//! API error types.

use crate::error::{PresetError, SummarizeError};
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::error;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    /// The model failed or broke its output contract.
    #[error("{message}")]
    Upstream {
        message: String,
        raw: Option<String>,
        schema: Option<Value>,
    },

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn upstream(msg: impl Into<String>) -> Self {
        Self::Upstream {
            message: msg.into(),
            raw: None,
            schema: None,
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<SummarizeError> for ApiError {
    fn from(err: SummarizeError) -> Self {
        match err {
            e if e.is_input_error() => ApiError::BadRequest(e.to_string()),
            SummarizeError::InvalidModelOutput { raw, .. } => ApiError::Upstream {
                message: "Model returned invalid JSON".to_string(),
                raw: Some(raw),
                schema: None,
            },
            SummarizeError::InvalidInferredSchema { schema } => ApiError::Upstream {
                message: "Invalid schema returned by model.".to_string(),
                raw: None,
                schema: Some(schema),
            },
            e if e.is_upstream_error() => ApiError::upstream(e.to_string()),
            e => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<PresetError> for ApiError {
    fn from(err: PresetError) -> Self {
        match err {
            PresetError::NotFound(_) => ApiError::not_found("Preset not found."),
            e => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    raw: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    schema: Option<Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("{}: {}", status, self);
        }

        let body = match self {
            ApiError::Upstream {
                message,
                raw,
                schema,
            } => ErrorResponse {
                error: message,
                raw,
                schema,
            },
            other => ErrorResponse {
                error: other.to_string(),
                raw: None,
                schema: None,
            },
        };

        (status, Json(body)).into_response()
    }
}
