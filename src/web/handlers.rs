use crate::core::prompt::{DEFAULT_PROMPT, SHARED_VIDEO_PROMPT};
use crate::core::schema::{fallback_schema, parse_schema_object};
use crate::core::sink::{parse_model_output, render_json};
use crate::core::{infer_schema, summarize_custom, VideoMetadata};
use crate::error::SummarizeError;
use crate::presets::{Preset, PresetStore, PresetSummary};
use crate::utils::sanitize_preset_id;
use crate::web::error::{ApiError, ApiResult};
use crate::web::page::{render, PageContext};
use crate::web::AppState;
use crate::youtube::normalize_video_url;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::Html;
use axum::{Form, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};

/// Runs preset disk work on the blocking pool.
async fn with_presets<T, F>(presets: &PresetStore, f: F) -> ApiResult<T>
where
    F: FnOnce(&PresetStore) -> T + Send + 'static,
    T: Send + 'static,
{
    let presets = presets.clone();
    tokio::task::spawn_blocking(move || f(&presets))
        .await
        .map_err(|e| ApiError::Internal(format!("Preset task join error: {}", e)))
}

impl AppState {
    fn model_or_default(&self, model: Option<String>) -> String {
        model
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| self.options.model.clone())
    }

    /// Preset listing for the page; empty if the blocking task fails.
    async fn preset_list(&self) -> Vec<PresetSummary> {
        with_presets(&self.presets, |presets| presets.list())
            .await
            .unwrap_or_else(|e| {
                warn!("Listing presets failed: {}", e);
                Vec::new()
            })
    }

    async fn page(&self) -> PageContext {
        let default_id = self.default_preset_id.clone();
        let preset = with_presets(&self.presets, move |presets| presets.load_optional(&default_id))
            .await
            .unwrap_or_else(|e| {
                warn!("Loading default preset failed: {}", e);
                None
            });
        let prompt = preset
            .as_ref()
            .and_then(|p| p.prompt.clone())
            .unwrap_or_else(|| DEFAULT_PROMPT.to_string());
        let schema = preset
            .map(|p| p.schema)
            .filter(Value::is_object)
            .unwrap_or_else(fallback_schema);

        PageContext {
            prompt,
            schema: render_json(&schema).unwrap_or_default(),
            model: self.options.model.clone(),
            presets: self.preset_list().await,
            default_preset_id: self.default_preset_id.clone(),
            ..PageContext::default()
        }
    }
}

pub async fn home(State(state): State<AppState>) -> Html<String> {
    Html(render(&state.page().await))
}

#[derive(Debug, Deserialize)]
pub struct SummarizeForm {
    pub video_input: String,
    pub prompt: String,
    pub schema_json: String,
    #[serde(default)]
    pub model: Option<String>,
}

/// Form submission: errors are rendered inline instead of as status codes.
pub async fn summarize_form(State(state): State<AppState>, Form(form): Form<SummarizeForm>) -> Html<String> {
    let model = state.model_or_default(form.model);
    let mut ctx = PageContext {
        prompt: form.prompt.clone(),
        schema: form.schema_json.clone(),
        model: model.clone(),
        video_input: form.video_input.clone(),
        presets: state.preset_list().await,
        default_preset_id: state.default_preset_id.clone(),
        ..PageContext::default()
    };

    match summarize_to_json(&state, &form.video_input, &form.prompt, &form.schema_json, model).await {
        Ok(result) => ctx.result_json = Some(result),
        Err(SummarizeError::InvalidSchemaJson(e)) => ctx.error = Some(format!("Invalid schema JSON: {}", e)),
        Err(SummarizeError::SchemaNotObject) => {
            ctx.error = Some("Invalid schema JSON: Schema must be a JSON object.".to_string())
        }
        Err(e) if e.is_input_error() => ctx.error = Some(e.to_string()),
        Err(e) => ctx.error = Some(format!("Summarization failed: {}", e)),
    }

    Html(render(&ctx))
}

async fn summarize_to_json(
    state: &AppState,
    video_input: &str,
    prompt: &str,
    schema_json: &str,
    model: String,
) -> Result<String, SummarizeError> {
    let video_url = normalize_video_url(video_input);
    if video_url.is_empty() {
        return Err(SummarizeError::EmptyInput);
    }
    let schema = parse_schema_object(schema_json)?;

    let options = state.options.clone().with_model(model);
    let meta = VideoMetadata::new(video_url);
    let raw = summarize_custom(state.gateway.as_ref(), &options, prompt, &meta, &schema).await?;
    render_json(&parse_model_output(&raw)?)
}

#[derive(Debug, Deserialize)]
pub struct SummarizeRequest {
    #[serde(default)]
    pub video_input: String,
    pub prompt: Option<String>,
    pub schema: Option<Value>,
    pub model: Option<String>,
}

pub async fn api_summarize(
    State(state): State<AppState>,
    payload: Result<Json<SummarizeRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(req) = payload?;

    let schema = match req.schema {
        Some(schema @ Value::Object(_)) => schema,
        _ => return Err(ApiError::bad_request("schema must be a JSON object")),
    };

    let video_url = normalize_video_url(&req.video_input);
    if video_url.is_empty() {
        return Err(SummarizeError::EmptyInput.into());
    }

    let prompt = req.prompt.unwrap_or_else(|| SHARED_VIDEO_PROMPT.to_string());
    let options = state.options.clone().with_model(state.model_or_default(req.model));
    let meta = VideoMetadata::new(video_url);

    let raw = summarize_custom(state.gateway.as_ref(), &options, &prompt, &meta, &schema).await?;
    Ok(Json(parse_model_output(&raw)?))
}

#[derive(Debug, Deserialize)]
pub struct InferSchemaRequest {
    #[serde(default)]
    pub prompt: String,
    pub model: Option<String>,
}

pub async fn api_infer_schema(
    State(state): State<AppState>,
    payload: Result<Json<InferSchemaRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(req) = payload?;

    let prompt = req.prompt.trim();
    if prompt.is_empty() {
        return Err(ApiError::bad_request("Prompt is required."));
    }

    let options = state.options.clone().with_model(state.model_or_default(req.model));
    match infer_schema(state.gateway.as_ref(), &options, prompt).await {
        Ok(schema) => Ok(Json(schema)),
        Err(e @ SummarizeError::RetriesExhausted { .. }) => {
            Err(ApiError::upstream(format!("Schema inference failed: {}", e)))
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn list_presets(State(state): State<AppState>) -> Json<Value> {
    let presets = state.preset_list().await;
    Json(json!({ "presets": presets }))
}

pub async fn get_preset(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Preset>> {
    let id = sanitize_preset_id(&id);
    if id.is_empty() {
        return Err(ApiError::not_found("Preset not found."));
    }
    let preset = with_presets(&state.presets, move |presets| presets.load(&id)).await??;
    Ok(Json(preset))
}

#[derive(Debug, Deserialize)]
pub struct SavePresetRequest {
    #[serde(default)]
    pub name: String,
    pub prompt: Option<Value>,
    pub schema: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct SavePresetResponse {
    pub id: String,
    pub name: String,
}

pub async fn save_preset(
    State(state): State<AppState>,
    payload: Result<Json<SavePresetRequest>, JsonRejection>,
) -> ApiResult<Json<SavePresetResponse>> {
    let Json(req) = payload?;

    let name = req.name.trim().to_string();
    if name.is_empty() {
        return Err(ApiError::bad_request("Preset name is required."));
    }
    let schema = match req.schema {
        Some(schema @ Value::Object(_)) => schema,
        _ => return Err(ApiError::bad_request("Schema must be a JSON object.")),
    };
    let prompt = match req.prompt {
        Some(Value::String(prompt)) => prompt,
        _ => return Err(ApiError::bad_request("Prompt must be a string.")),
    };

    let id = sanitize_preset_id(&name);
    if id.is_empty() {
        return Err(ApiError::bad_request("Preset name has no valid characters."));
    }

    let preset = Preset {
        name: name.clone(),
        prompt: Some(prompt),
        schema,
    };
    let save_id = id.clone();
    with_presets(&state.presets, move |presets| presets.save(&save_id, &preset)).await??;
    info!("Saved preset {}", id);

    Ok(Json(SavePresetResponse { id, name }))
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
