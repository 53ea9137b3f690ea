//! Output schema resolution.

use crate::error::{Result, SummarizeError};
use crate::presets::PresetStore;
use serde_json::{json, Map, Value};
use std::path::PathBuf;
use tracing::debug;

/// User-supplied schema sources, highest precedence first.
#[derive(Debug, Clone, Default)]
pub struct SchemaSources {
    pub schema_json: Option<String>,
    pub schema_file: Option<PathBuf>,
}

/// The chosen schema plus the prompt that travelled with it, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSchema {
    pub schema: Value,
    pub preset_prompt: Option<String>,
    pub origin: SchemaOrigin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaOrigin {
    Inline,
    File,
    Preset,
    Fallback,
}

/// Minimal schema: a required `summary` string and `keyword` string array.
pub fn fallback_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "summary": {"type": "string"},
            "keyword": {"type": "array", "items": {"type": "string"}}
        },
        "required": ["summary", "keyword"]
    })
}

/// Resolves exactly one schema: inline JSON, then schema file, then the
/// default preset from `presets`, then [`fallback_schema`].
///
/// Preset failures never abort resolution.
pub fn resolve_schema(
    sources: &SchemaSources,
    presets: &PresetStore,
    default_preset_id: &str,
) -> Result<ResolvedSchema> {
    if let Some(text) = &sources.schema_json {
        let schema = parse_schema_object(text)?;
        debug!("Using inline schema");
        return Ok(ResolvedSchema {
            schema,
            preset_prompt: None,
            origin: SchemaOrigin::Inline,
        });
    }

    if let Some(path) = &sources.schema_file {
        let text = std::fs::read_to_string(path).map_err(|source| SummarizeError::ReadInput {
            path: path.clone(),
            source,
        })?;
        let document: Value = serde_json::from_str(&text).map_err(SummarizeError::InvalidSchemaJson)?;
        let (schema, preset_prompt) = split_combined_document(document)?;
        debug!("Using schema file {}", path.display());
        return Ok(ResolvedSchema {
            schema,
            preset_prompt,
            origin: SchemaOrigin::File,
        });
    }

    if let Some(preset) = presets.load_optional(default_preset_id) {
        if preset.schema.is_object() {
            debug!("Using schema from preset {}", default_preset_id);
            return Ok(ResolvedSchema {
                schema: preset.schema,
                preset_prompt: preset.prompt,
                origin: SchemaOrigin::Preset,
            });
        }
        debug!("Preset {} has no object schema", default_preset_id);
    }

    Ok(ResolvedSchema {
        schema: fallback_schema(),
        preset_prompt: None,
        origin: SchemaOrigin::Fallback,
    })
}

/// Parses `text` as a JSON object.
pub fn parse_schema_object(text: &str) -> Result<Value> {
    let value: Value = serde_json::from_str(text).map_err(SummarizeError::InvalidSchemaJson)?;
    ensure_object(value)
}

pub fn ensure_object(value: Value) -> Result<Value> {
    if value.is_object() {
        Ok(value)
    } else {
        Err(SummarizeError::SchemaNotObject)
    }
}

/// A document with a `schema` key is a combined `{prompt, schema}` pair;
/// anything else is the schema itself.
fn split_combined_document(document: Value) -> Result<(Value, Option<String>)> {
    match document {
        Value::Object(mut map) if map.contains_key("schema") => {
            let prompt = take_prompt(&mut map);
            let schema = map.remove("schema").unwrap_or(Value::Null);
            Ok((ensure_object(schema)?, prompt))
        }
        other => Ok((ensure_object(other)?, None)),
    }
}

fn take_prompt(map: &mut Map<String, Value>) -> Option<String> {
    match map.remove("prompt") {
        Some(Value::String(prompt)) => Some(prompt),
        _ => None,
    }
}
