//! Sequential processing of one or more video references.

use crate::core::gateway::ModelGateway;
use crate::core::sink::{parse_model_output, render_json, Sink, STDOUT_SENTINEL};
use crate::core::summarize::{summarize_custom, ModelOptions};
use crate::core::VideoMetadata;
use crate::error::{Result, SummarizeError};
use crate::utils::{progress_line, sanitize_filename};
use crate::youtube::{extract_video_id, normalize_video_url};
use serde_json::Value;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Where the references come from and where the results go.
#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    pub video_url: Option<String>,
    pub input_file: Option<PathBuf>,
    pub outdir: Option<PathBuf>,
    pub out: Option<String>,
    pub keep_going: bool,
}

impl BatchOptions {
    /// File input needs a directory or a named file to write to.
    pub fn validate(&self) -> Result<()> {
        let named_out = self.out.as_deref().is_some_and(|out| out != STDOUT_SENTINEL);
        if self.input_file.is_some() && self.outdir.is_none() && !named_out {
            return Err(SummarizeError::MissingBatchSink);
        }
        Ok(())
    }

    pub fn sink(&self) -> Sink {
        Sink::from_options(self.outdir.as_deref(), self.out.as_deref())
    }

    /// The positional reference (if any) followed by the input file's entries.
    pub fn references(&self) -> Result<Vec<String>> {
        let mut references = Vec::new();
        if let Some(url) = self.video_url.as_deref().map(str::trim).filter(|u| !u.is_empty()) {
            references.push(url.to_string());
        }
        if let Some(path) = &self.input_file {
            references.extend(read_references(path)?);
        }

        if references.is_empty() {
            return Err(SummarizeError::NoInput);
        }
        Ok(references)
    }
}

pub fn read_references(path: &Path) -> Result<Vec<String>> {
    let text = std::fs::read_to_string(path).map_err(|source| SummarizeError::ReadInput {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_references(&text))
}

/// One reference per line; blank lines and `#` comments are skipped.
pub fn parse_references(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Metadata applied to every item of a run.
#[derive(Debug, Clone, Default)]
pub struct MetadataOverrides {
    pub title: String,
    pub channel: String,
    pub upload_date: String,
}

impl MetadataOverrides {
    fn apply(&self, video_url: String) -> VideoMetadata {
        VideoMetadata::new(video_url)
            .with_title(&self.title)
            .with_channel(&self.channel)
            .with_upload_date(&self.upload_date)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchFailure {
    pub reference: String,
    pub error: String,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub processed: usize,
    pub written: Vec<PathBuf>,
    pub failures: Vec<BatchFailure>,
    /// A single-file sink was filled before the input ran out.
    pub stopped_early: bool,
}

/// Runs the summarize pipeline over a list of references with a template and
/// schema resolved once for the whole run.
pub struct BatchRunner<'a, G: ModelGateway + ?Sized> {
    gateway: &'a G,
    options: &'a ModelOptions,
    template: String,
    schema: Value,
    overrides: MetadataOverrides,
    sink: Sink,
    keep_going: bool,
}

impl<'a, G: ModelGateway + ?Sized> BatchRunner<'a, G> {
    pub fn new(gateway: &'a G, options: &'a ModelOptions, template: String, schema: Value, sink: Sink) -> Self {
        Self {
            gateway,
            options,
            template,
            schema,
            overrides: MetadataOverrides::default(),
            sink,
            keep_going: false,
        }
    }

    pub fn overrides(mut self, overrides: MetadataOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// Record per-item failures and continue instead of halting.
    pub fn keep_going(mut self, keep_going: bool) -> Self {
        self.keep_going = keep_going;
        self
    }

    /// Processes `references` in order. Results go to `stdout` for the
    /// stdout sink; progress lines go to `diag`.
    pub async fn run<W, D>(&self, references: &[String], stdout: &mut W, diag: &mut D) -> Result<BatchReport>
    where
        W: Write + ?Sized,
        D: Write + ?Sized,
    {
        let total = references.len();
        let mut report = BatchReport::default();

        for (index, reference) in references.iter().enumerate() {
            let video_id = output_stem(reference, index);
            if total > 1 {
                writeln!(diag, "{}", progress_line(index + 1, total, &video_id))?;
            }

            let payload = match self.summarize_one(reference).await {
                Ok(payload) => payload,
                Err(e) if self.keep_going => {
                    warn!("Skipping {}: {}", reference, e);
                    report.failures.push(BatchFailure {
                        reference: reference.clone(),
                        error: e.to_string(),
                    });
                    continue;
                }
                Err(e) => return Err(e),
            };

            report.processed += 1;
            if let Some(path) = self.sink.write(&video_id, &payload, stdout)? {
                report.written.push(path);
            }

            if matches!(self.sink, Sink::File(_)) {
                if index + 1 < total {
                    info!("Single output file filled; {} remaining inputs not processed", total - index - 1);
                    report.stopped_early = true;
                }
                break;
            }
        }

        Ok(report)
    }

    async fn summarize_one(&self, reference: &str) -> Result<String> {
        let video_url = normalize_video_url(reference);
        let meta = self.overrides.apply(video_url);
        let raw = summarize_custom(self.gateway, self.options, &self.template, &meta, &self.schema).await?;
        render_json(&parse_model_output(&raw)?)
    }
}

/// Filename stem for a reference: its video id, or `video_<n>` (1-based).
pub fn output_stem(reference: &str, index: usize) -> String {
    let id = sanitize_filename(&extract_video_id(reference));
    if id.is_empty() {
        format!("video_{}", index + 1)
    } else {
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_references_skips_comments_and_blanks() {
        let text = "# guests\nhttps://youtu.be/aaa\n\n   \n  bbb  \n#ccc\n";
        assert_eq!(parse_references(text), vec!["https://youtu.be/aaa", "bbb"]);
    }

    #[test]
    fn test_file_input_requires_named_sink() {
        let mut options = BatchOptions {
            input_file: Some("videos.txt".into()),
            ..BatchOptions::default()
        };
        assert!(matches!(options.validate(), Err(SummarizeError::MissingBatchSink)));

        options.out = Some("-".to_string());
        assert!(matches!(options.validate(), Err(SummarizeError::MissingBatchSink)));

        options.out = Some("result.json".to_string());
        assert!(options.validate().is_ok());

        options.out = None;
        options.outdir = Some("out".into());
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_single_video_may_use_stdout() {
        let options = BatchOptions {
            video_url: Some("abc".to_string()),
            ..BatchOptions::default()
        };
        assert!(options.validate().is_ok());
        assert_eq!(options.sink(), Sink::Stdout);
        assert_eq!(options.references().unwrap(), vec!["abc"]);
    }

    #[test]
    fn test_no_input_is_rejected() {
        let options = BatchOptions {
            video_url: Some("  ".to_string()),
            ..BatchOptions::default()
        };
        assert!(matches!(options.references(), Err(SummarizeError::NoInput)));
    }

    #[test]
    fn test_output_stem() {
        assert_eq!(output_stem("https://youtu.be/dQw4w9WgXcQ", 0), "dQw4w9WgXcQ");
        assert_eq!(output_stem("   ", 2), "video_3");
        assert_eq!(output_stem("https://vimeo.com/1", 0), "https_--vimeo.com-1");
    }
}
