use crate::core::RetryPolicy;
use crate::error::{Result, SummarizeError};
use crate::gemini::DEFAULT_API_BASE;
use crate::presets::DEFAULT_PRESET_ID;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_CONFIG_FILE: &str = "yt-summarize.toml";

const API_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "GOOGLE_API_KEY"];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Never read from or written to the config file.
    #[serde(skip)]
    pub api_key: String,
    pub model: String,
    pub api_base: String,
    pub request_timeout_secs: u64,
    pub thinking_level: Option<String>,
    pub retry: RetryPolicy,
    pub presets_dir: PathBuf,
    pub default_preset_id: String,
    pub host: String,
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            request_timeout_secs: 120,
            thinking_level: Some("low".to_string()),
            retry: RetryPolicy::default(),
            presets_dir: PathBuf::from("data/presets"),
            default_preset_id: DEFAULT_PRESET_ID.to_string(),
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

impl Config {
    /// Settings from the optional TOML file and the environment (including
    /// `.env`), plus the API key. A missing key is fatal.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = Self::load_file()?;
        config.apply_env(|name| std::env::var(name).ok());
        config.api_key = api_key_from(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    fn load_file() -> Result<Self> {
        match std::env::var("YT_SUMMARIZE_CONFIG") {
            Ok(path) => Self::from_file(Path::new(&path)),
            Err(_) if Path::new(DEFAULT_CONFIG_FILE).exists() => Self::from_file(Path::new(DEFAULT_CONFIG_FILE)),
            Err(_) => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading config from {}", path.display());
        let text = std::fs::read_to_string(path).map_err(|source| SummarizeError::ReadInput {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| SummarizeError::Config(e.to_string()))
    }

    fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup("YT_SUMMARIZE_PRESETS_DIR") {
            self.presets_dir = PathBuf::from(dir);
        }
        if let Some(base) = lookup("GEMINI_API_BASE") {
            self.api_base = base;
        }
    }

    pub fn validate(&self) -> Result<()> {
        let retry = &self.retry;
        if retry.max_attempts == 0 {
            return Err(SummarizeError::Config("retry.max_attempts must be at least 1".into()));
        }
        if !(retry.base_delay_secs >= 0.0 && retry.max_delay_secs >= 0.0) {
            return Err(SummarizeError::Config("retry delays must be non-negative".into()));
        }
        Ok(())
    }
}

fn api_key_from<F>(lookup: F) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    API_KEY_VARS
        .iter()
        .filter_map(|&name| lookup(name))
        .find(|key| !key.trim().is_empty())
        .ok_or(SummarizeError::MissingApiKey)
}
