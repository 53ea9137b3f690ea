pub mod batch;
pub mod extraction;
pub mod gateway;
pub mod metadata;
pub mod prompt;
pub mod schema;
pub mod sink;
pub mod summarize;

pub use batch::{BatchOptions, BatchReport, BatchRunner, MetadataOverrides};
pub use extraction::VideoExtraction;
pub use gateway::{generate_with_retry, GenerateRequest, ModelGateway, RetryPolicy};
pub use metadata::VideoMetadata;
pub use prompt::{PromptBuilder, PromptOverrides, DEFAULT_PROMPT, SHARED_VIDEO_PROMPT};
pub use schema::{resolve_schema, ResolvedSchema, SchemaSources};
pub use sink::Sink;
pub use summarize::{infer_schema, summarize_custom, summarize_strict, ModelOptions};
