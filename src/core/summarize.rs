//! Single-request operations shared by the CLI and the web app.

use crate::config::Config;
use crate::core::gateway::{generate_with_retry, GenerateRequest, ModelGateway, RetryPolicy};
use crate::core::prompt::{schema_inference_prompt, PromptBuilder, SHARED_VIDEO_PROMPT};
use crate::core::sink::{parse_model_output, parse_strict_output};
use crate::core::{VideoExtraction, VideoMetadata};
use crate::error::{Result, SummarizeError};
use serde_json::{json, Value};
use tracing::info;

/// Per-run model settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelOptions {
    pub model: String,
    pub thinking_level: Option<String>,
    pub retry: RetryPolicy,
}

impl ModelOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            model: config.model.clone(),
            thinking_level: config.thinking_level.clone(),
            retry: config.retry,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    fn request(&self, video_uri: Option<String>, prompt: String, schema: Value) -> GenerateRequest {
        GenerateRequest {
            model: self.model.clone(),
            video_uri,
            prompt,
            schema,
            thinking_level: self.thinking_level.clone(),
        }
    }
}

/// Summarizes one video against a caller-chosen template and schema,
/// returning the model's raw text.
pub async fn summarize_custom<G>(
    gateway: &G,
    options: &ModelOptions,
    template: &str,
    meta: &VideoMetadata,
    schema: &Value,
) -> Result<String>
where
    G: ModelGateway + ?Sized,
{
    if meta.video_url.is_empty() {
        return Err(SummarizeError::EmptyInput);
    }

    let prompt = PromptBuilder::new(template).metadata(meta).build();
    let request = options.request(Some(meta.video_url.clone()), prompt, schema.clone());

    info!("Summarizing {} with {}", meta.video_url, options.model);
    generate_with_retry(gateway, &request, &options.retry).await
}

/// Summarizes one video with the built-in startup case-study template and
/// validates the result against [`VideoExtraction`].
pub async fn summarize_strict<G>(
    gateway: &G,
    options: &ModelOptions,
    meta: &VideoMetadata,
) -> Result<VideoExtraction>
where
    G: ModelGateway + ?Sized,
{
    let schema = VideoExtraction::json_schema();
    let raw = summarize_custom(gateway, options, SHARED_VIDEO_PROMPT, meta, &schema).await?;
    parse_strict_output(&raw)
}

/// Derives an output schema from free-text prompt intent.
///
/// The model must answer with an object whose `type` is `"object"`.
pub async fn infer_schema<G>(gateway: &G, options: &ModelOptions, prompt_text: &str) -> Result<Value>
where
    G: ModelGateway + ?Sized,
{
    let request = options.request(
        None,
        schema_inference_prompt(prompt_text),
        json!({"type": "object"}),
    );

    let raw = generate_with_retry(gateway, &request, &options.retry).await?;
    let schema = parse_model_output(&raw)?;

    if schema.get("type").and_then(Value::as_str) == Some("object") {
        Ok(schema)
    } else {
        Err(SummarizeError::InvalidInferredSchema { schema })
    }
}
