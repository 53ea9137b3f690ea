pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod gemini;
pub mod presets;
pub mod utils;
pub mod web;
pub mod youtube;

pub use config::Config;
pub use self::core::{
    BatchRunner, GenerateRequest, ModelGateway, ModelOptions, PromptBuilder, RetryPolicy, VideoExtraction,
    VideoMetadata,
};
pub use error::{GatewayError, PresetError, SummarizeError};
pub use gemini::GeminiClient;
pub use presets::{Preset, PresetStore};
