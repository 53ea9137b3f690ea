//! Fixed structured schema used by the strict extraction mode.

use schemars::gen::SchemaSettings;
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

const DEFS_PATH: &str = "#/$defs/";

/// Reads `null` as the field's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Success,
    Failure,
    Mixed,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    Active,
    Shutdown,
    Acquired,
    Pivoted,
    #[default]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum MetricType {
    Revenue,
    Profit,
    Spend,
    Burn,
    Funding,
    Valuation,
    Users,
    PayingCustomers,
    Mau,
    Dau,
    Downloads,
    Price,
    Arr,
    Mrr,
    GrowthRate,
    Churn,
    Cac,
    Ltv,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Evidence {
    /// MM:SS, HH:MM:SS, or 'N/A' if not available.
    pub timestamp: String,
    /// <= 20 words from the video (paraphrase allowed).
    pub snippet: String,
    /// Extra context if needed.
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Metric {
    pub metric_type: MetricType,
    /// Numeric value if explicitly stated; else null.
    #[serde(default)]
    pub value: Option<f64>,
    /// e.g., USD, users, %, downloads, etc.
    #[serde(default)]
    pub unit: Option<String>,
    /// e.g., 'per month', 'ARR', 'as of 2025', etc.
    #[serde(default)]
    pub time_frame: Option<String>,
    /// high if exact, medium if approximate, low if uncertain
    pub confidence: Confidence,
    /// At least one evidence item for this metric.
    pub evidence: Vec<Evidence>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Product {
    /// Product/company name if stated.
    #[serde(default)]
    pub name: Option<String>,
    /// What the product does.
    pub what_it_does: String,
    #[serde(default)]
    pub target_customer: Option<String>,
    #[serde(default)]
    pub business_model: Option<String>,
    pub outcome: Outcome,
    /// Why the outcome label was chosen (based on video statements).
    pub outcome_reasoning: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: ProductStatus,
    /// Only explicit mentions.
    #[serde(default)]
    pub competitors: Vec<String>,
    #[serde(default)]
    pub metrics: Vec<Metric>,
    #[serde(default)]
    pub key_lessons: Vec<String>,
    /// Evidence for product description/outcome/competitors.
    #[serde(default)]
    pub evidence: Vec<Evidence>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FounderStory {
    /// Founders/guests names if stated.
    #[serde(default)]
    pub people: Vec<String>,
    #[serde(default)]
    pub background: Option<String>,
    /// Prior attempts/pivots described.
    #[serde(default)]
    pub attempts: Vec<String>,
    /// Recurring themes (e.g., distribution, PMF).
    #[serde(default)]
    pub themes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct VideoExtraction {
    pub video_url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub channel: String,
    /// YYYY-MM-DD if known else empty string.
    #[serde(default, deserialize_with = "null_as_default")]
    pub upload_date: String,
    pub story: FounderStory,
    pub products: Vec<Product>,
    pub top_takeaways: Vec<String>,
    /// Important fields the video did not provide (e.g., 'revenue', 'user count').
    #[serde(default)]
    pub missing_info: Vec<String>,
    /// Caveats: timestamps missing, unclear audio.
    #[serde(default)]
    pub limitations: Vec<String>,
}

impl VideoExtraction {
    /// JSON Schema sent to the model as the strict output constraint.
    ///
    /// Shared types live under `$defs` and are referenced as `#/$defs/<Name>`.
    pub fn json_schema() -> Value {
        let mut settings = SchemaSettings::draft2019_09();
        settings.definitions_path = DEFS_PATH.to_owned();
        settings.meta_schema = None;
        let root = settings.into_generator().into_root_schema_for::<VideoExtraction>();

        // A derived RootSchema always serializes
        let mut schema = serde_json::to_value(root).unwrap_or(Value::Null);
        if let Some(map) = schema.as_object_mut() {
            if let Some(defs) = map.remove("definitions") {
                map.insert("$defs".to_string(), defs);
            }
        }
        unwrap_single_ref(&mut schema);
        schema
    }
}

/// Rewrites `{"allOf": [{"$ref": r}], ..}` as `{"$ref": r, ..}`.
fn unwrap_single_ref(value: &mut Value) {
    match value {
        Value::Object(map) => {
            let single_ref = matches!(
                map.get("allOf"),
                Some(Value::Array(items)) if items.len() == 1 && items[0].get("$ref").is_some()
            );
            if single_ref {
                if let Some(Value::Array(mut items)) = map.remove("allOf") {
                    if let Some(Value::Object(inner)) = items.pop() {
                        for (key, inner_value) in inner {
                            map.entry(key).or_insert(inner_value);
                        }
                    }
                }
            }
            map.values_mut().for_each(unwrap_single_ref);
        }
        Value::Array(items) => items.iter_mut().for_each(unwrap_single_ref),
        _ => {}
    }
}
