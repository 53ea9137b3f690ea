//! Parsing model output and writing it to its destination.

use crate::core::VideoExtraction;
use crate::error::{Result, SummarizeError};
use serde::Serialize;
use serde_json::Value;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// `--out` value that means standard output.
pub const STDOUT_SENTINEL: &str = "-";

/// Parses raw model text as JSON. Markdown code fences are tolerated.
pub fn parse_model_output(raw: &str) -> Result<Value> {
    serde_json::from_str(strip_code_fence(raw)).map_err(|e| invalid_output(e, raw))
}

/// Parses raw model text into the strict extraction structure.
pub fn parse_strict_output(raw: &str) -> Result<VideoExtraction> {
    serde_json::from_str(strip_code_fence(raw)).map_err(|e| invalid_output(e, raw))
}

fn invalid_output(err: serde_json::Error, raw: &str) -> SummarizeError {
    SummarizeError::InvalidModelOutput {
        message: err.to_string(),
        raw: raw.to_string(),
    }
}

fn strip_code_fence(raw: &str) -> &str {
    let text = raw.trim();
    let text = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
        .unwrap_or(text);
    text.strip_suffix("```").unwrap_or(text).trim()
}

pub fn render_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Where a result goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sink {
    Stdout,
    /// One fixed file; only a single result can be written to it.
    File(PathBuf),
    /// `<dir>/<video_id>.json` per result.
    Directory(PathBuf),
}

impl Sink {
    /// An output directory wins over a named file; `-` or nothing means stdout.
    pub fn from_options(outdir: Option<&Path>, out: Option<&str>) -> Self {
        if let Some(dir) = outdir {
            return Sink::Directory(dir.to_path_buf());
        }
        match out {
            Some(path) if path != STDOUT_SENTINEL => Sink::File(PathBuf::from(path)),
            _ => Sink::Stdout,
        }
    }

    /// Writes `payload` for `video_id`, returning the file written, if any.
    pub fn write<W: Write + ?Sized>(
        &self,
        video_id: &str,
        payload: &str,
        stdout: &mut W,
    ) -> Result<Option<PathBuf>> {
        match self {
            Sink::Stdout => {
                writeln!(stdout, "{}", payload)?;
                stdout.flush()?;
                Ok(None)
            }
            Sink::File(path) => {
                write_file(path, payload)?;
                Ok(Some(path.clone()))
            }
            Sink::Directory(dir) => {
                let path = dir.join(format!("{}.json", video_id));
                write_file(&path, payload)?;
                Ok(Some(path))
            }
        }
    }
}

pub fn write_file(path: &Path, payload: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, payload)?;
    info!("Wrote {}", path.display());
    Ok(())
}
