use serde_json::Value;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = SummarizeError> = std::result::Result<T, E>;

/// Failures of a single call to the hosted model.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("model API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("model API response had no text candidates")]
    EmptyResponse,

    #[error("{0}")]
    Other(String),
}

#[derive(Debug, Error)]
pub enum SummarizeError {
    #[error("Set GEMINI_API_KEY (or GOOGLE_API_KEY) in your environment or .env file.")]
    MissingApiKey,

    #[error("Provide a YouTube URL or video id.")]
    EmptyInput,

    #[error("No video input: pass a video URL or --input-file.")]
    NoInput,

    #[error("Batch input requires --outdir or a named --out file.")]
    MissingBatchSink,

    #[error("Invalid schema JSON: {0}")]
    InvalidSchemaJson(#[source] serde_json::Error),

    #[error("Schema must be a JSON object.")]
    SchemaNotObject,

    #[error("Could not read {}: {source}", path.display())]
    ReadInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Gemini failed after {attempts} attempts: {source}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        source: GatewayError,
    },

    #[error("Model returned invalid JSON: {message}")]
    InvalidModelOutput { message: String, raw: String },

    #[error("Invalid schema returned by model.")]
    InvalidInferredSchema { schema: Value },

    #[error("Invalid config: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl SummarizeError {
    /// Bad caller input, rejected before the model is contacted.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            SummarizeError::EmptyInput
                | SummarizeError::NoInput
                | SummarizeError::MissingBatchSink
                | SummarizeError::InvalidSchemaJson(_)
                | SummarizeError::SchemaNotObject
                | SummarizeError::ReadInput { .. }
        )
    }

    /// Upstream failures and contract violations by the model.
    pub fn is_upstream_error(&self) -> bool {
        matches!(
            self,
            SummarizeError::RetriesExhausted { .. }
                | SummarizeError::InvalidModelOutput { .. }
                | SummarizeError::InvalidInferredSchema { .. }
        )
    }
}

#[derive(Debug, Error)]
pub enum PresetError {
    #[error("preset `{0}` not found")]
    NotFound(String),

    #[error("failed to access preset `{id}`: {source}")]
    Io {
        id: String,
        #[source]
        source: std::io::Error,
    },

    #[error("preset `{id}` is malformed: {source}")]
    Malformed {
        id: String,
        #[source]
        source: serde_json::Error,
    },
}
