use crate::config::Config;
use crate::core::batch::{BatchOptions, BatchRunner, MetadataOverrides};
use crate::core::prompt::{resolve_template, PromptOverrides};
use crate::core::schema::{resolve_schema, SchemaSources};
use crate::core::sink::{render_json, Sink};
use crate::core::{summarize_strict, ModelOptions, VideoMetadata};
use crate::error::SummarizeError;
use crate::gemini::GeminiClient;
use crate::presets::PresetStore;
use crate::web::{self, AppState};
use crate::youtube::normalize_video_url;
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "yt-summarize")]
#[command(about = "Structured JSON summaries of YouTube videos via Gemini")]
#[command(version)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Summarize one video into the fixed startup case-study format
    Strict(StrictArgs),
    /// Summarize one or more videos with a custom prompt and schema
    Summarize(SummarizeArgs),
    /// Run the web app
    Serve(ServeArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct MetadataArgs {
    /// Optional title override
    #[arg(long, default_value = "")]
    pub title: String,

    /// Optional channel override
    #[arg(long, default_value = "")]
    pub channel: String,

    /// Optional upload date override (YYYY-MM-DD)
    #[arg(long, default_value = "")]
    pub upload_date: String,
}

impl From<MetadataArgs> for MetadataOverrides {
    fn from(args: MetadataArgs) -> Self {
        Self {
            title: args.title,
            channel: args.channel,
            upload_date: args.upload_date,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct ModelArgs {
    /// Gemini model name [default: gemini-3-flash-preview]
    #[arg(long)]
    pub model: Option<String>,

    /// Thinking effort hint (e.g. low, high); `none` disables it
    #[arg(long)]
    pub thinking: Option<String>,
}

impl ModelArgs {
    fn options(&self, config: &Config) -> ModelOptions {
        let mut options = ModelOptions::from_config(config);
        if let Some(model) = &self.model {
            options.model = model.clone();
        }
        match self.thinking.as_deref() {
            Some("none") => options.thinking_level = None,
            Some(level) => options.thinking_level = Some(level.to_string()),
            None => {}
        }
        options
    }
}

#[derive(Args, Debug, Clone)]
pub struct StrictArgs {
    /// Public YouTube video URL or id
    #[arg(value_name = "VIDEO_URL")]
    pub video_url: String,

    #[command(flatten)]
    pub metadata: MetadataArgs,

    #[command(flatten)]
    pub model: ModelArgs,

    /// Output path for JSON (`-` for stdout)
    #[arg(long, default_value = "-")]
    pub out: String,
}

#[derive(Args, Debug, Clone)]
pub struct SummarizeArgs {
    /// Public YouTube video URL or id
    #[arg(value_name = "VIDEO_URL")]
    pub video_url: Option<String>,

    /// File with one video URL or id per line (`#` starts a comment)
    #[arg(long)]
    pub input_file: Option<PathBuf>,

    /// Directory for per-video `<video_id>.json` files
    #[arg(long)]
    pub outdir: Option<PathBuf>,

    /// Output path for JSON (`-` for stdout)
    #[arg(long)]
    pub out: Option<String>,

    #[command(flatten)]
    pub metadata: MetadataArgs,

    #[command(flatten)]
    pub model: ModelArgs,

    /// JSON Schema file, or a `{prompt, schema}` preset document
    #[arg(long)]
    pub schema: Option<PathBuf>,

    /// Inline JSON Schema (takes precedence over --schema)
    #[arg(long)]
    pub schema_json: Option<String>,

    /// Prompt text (takes precedence over --prompt-file)
    #[arg(long)]
    pub prompt: Option<String>,

    /// File containing the prompt
    #[arg(long)]
    pub prompt_file: Option<PathBuf>,

    /// Continue with the remaining videos when one fails
    #[arg(long)]
    pub keep_going: bool,
}

impl SummarizeArgs {
    pub fn batch_options(&self) -> BatchOptions {
        BatchOptions {
            video_url: self.video_url.clone(),
            input_file: self.input_file.clone(),
            outdir: self.outdir.clone(),
            out: self.out.clone(),
            keep_going: self.keep_going,
        }
    }

    pub fn schema_sources(&self) -> SchemaSources {
        SchemaSources {
            schema_json: self.schema_json.clone(),
            schema_file: self.schema.clone(),
        }
    }

    pub fn prompt_overrides(&self) -> PromptOverrides {
        PromptOverrides {
            prompt: self.prompt.clone(),
            prompt_file: self.prompt_file.clone(),
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Address to bind [default: 127.0.0.1]
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on [default: 8000]
    #[arg(short, long)]
    pub port: Option<u16>,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Strict(args) => run_strict(args).await,
            Command::Summarize(args) => run_summarize(args).await,
            Command::Serve(args) => run_serve(args).await,
        }
    }
}

async fn run_strict(args: StrictArgs) -> Result<()> {
    let video_url = normalize_video_url(&args.video_url);
    if video_url.is_empty() {
        return Err(SummarizeError::EmptyInput.into());
    }

    let config = Config::load()?;
    let options = args.model.options(&config);
    let client = GeminiClient::from_config(&config)?;

    let meta = VideoMetadata::new(video_url)
        .with_title(args.metadata.title)
        .with_channel(args.metadata.channel)
        .with_upload_date(args.metadata.upload_date);

    let extraction = summarize_strict(&client, &options, &meta).await?;
    let payload = render_json(&extraction)?;

    let sink = Sink::from_options(None, Some(args.out.as_str()));
    sink.write("", &payload, &mut std::io::stdout().lock())?;
    Ok(())
}

async fn run_summarize(args: SummarizeArgs) -> Result<()> {
    // Reject unusable runs before any API spend
    let batch = args.batch_options();
    batch.validate()?;
    let references = batch.references()?;

    let config = Config::load()?;
    let presets = PresetStore::new(&config.presets_dir);
    let resolved = resolve_schema(&args.schema_sources(), &presets, &config.default_preset_id)?;
    let template = resolve_template(&args.prompt_overrides(), resolved.preset_prompt.as_deref())?;
    info!("Schema source: {:?}; {} video(s) queued", resolved.origin, references.len());

    let options = args.model.options(&config);
    let client = GeminiClient::from_config(&config)?;

    let runner = BatchRunner::new(&client, &options, template, resolved.schema, batch.sink())
        .overrides(args.metadata.clone().into())
        .keep_going(batch.keep_going);

    let report = runner
        .run(&references, &mut std::io::stdout().lock(), &mut std::io::stderr())
        .await?;

    info!("Processed {} of {} video(s)", report.processed, references.len());
    if !report.failures.is_empty() {
        for failure in &report.failures {
            eprintln!("failed: {}: {}", failure.reference, failure.error);
        }
        anyhow::bail!("{} of {} videos failed", report.failures.len(), references.len());
    }
    Ok(())
}

async fn run_serve(args: ServeArgs) -> Result<()> {
    let config = Config::load()?;
    let host = args.host.unwrap_or_else(|| config.host.clone());
    let port = args.port.unwrap_or(config.port);
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .with_context(|| format!("invalid bind address {}:{}", host, port))?;

    let client = GeminiClient::from_config(&config)?;
    let state = AppState::new(&config, Arc::new(client));
    web::serve(state, addr).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summarize_args_parse() {
        let cli = Cli::parse_from([
            "yt-summarize",
            "summarize",
            "--input-file",
            "videos.txt",
            "--outdir",
            "out",
            "--schema-json",
            "{}",
            "--prompt",
            "Hi",
            "--thinking",
            "none",
        ]);
        let Command::Summarize(args) = cli.command else {
            panic!("expected summarize");
        };

        assert_eq!(args.video_url, None);
        assert!(args.batch_options().validate().is_ok());
        assert_eq!(args.schema_sources().schema_json.as_deref(), Some("{}"));
        assert_eq!(args.prompt_overrides().prompt.as_deref(), Some("Hi"));

        let options = args.model.options(&Config::default());
        assert_eq!(options.model, "gemini-3-flash-preview");
        assert_eq!(options.thinking_level, None);
    }

    #[test]
    fn test_strict_args_defaults() {
        let cli = Cli::parse_from(["yt-summarize", "-v", "strict", "dQw4w9WgXcQ", "--title", "T"]);
        assert!(cli.verbose);
        let Command::Strict(args) = cli.command else {
            panic!("expected strict");
        };
        assert_eq!(args.out, "-");
        assert_eq!(args.metadata.title, "T");
        assert_eq!(args.metadata.channel, "");
    }

    #[test]
    fn test_batch_without_sink_is_rejected() {
        let cli = Cli::parse_from(["yt-summarize", "summarize", "--input-file", "videos.txt"]);
        let Command::Summarize(args) = cli.command else {
            panic!("expected summarize");
        };
        assert!(matches!(
            args.batch_options().validate(),
            Err(SummarizeError::MissingBatchSink)
        ));
    }
}
