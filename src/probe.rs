use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tokio::process::Command;
use tracing::debug;

#[cfg(test)]
use mockall::automock;

use crate::config::MediaConfig;
use crate::error::{Result, RenderError};

/// Parsed `ffprobe -show_streams -print_format json` output
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProbeResult {
    #[serde(default)]
    pub streams: Vec<ProbeStream>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeStream {
    #[serde(default)]
    pub index: Option<u32>,
    #[serde(default)]
    pub codec_type: Option<String>,
    #[serde(default)]
    pub codec_name: Option<String>,
}

/// What kind of media a file holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Video,
    Audio,
    Unknown,
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaKind::Video => write!(f, "video"),
            MediaKind::Audio => write!(f, "audio"),
            MediaKind::Unknown => write!(f, "unknown"),
        }
    }
}

impl ProbeResult {
    /// Kind of the first audio or video stream, by position.
    pub fn media_kind(&self) -> MediaKind {
        self.streams
            .iter()
            .find_map(|stream| match stream.codec_type.as_deref() {
                Some("video") => Some(MediaKind::Video),
                Some("audio") => Some(MediaKind::Audio),
                _ => None,
            })
            .unwrap_or(MediaKind::Unknown)
    }
}

/// Access to stream metadata of a media file
#[cfg_attr(test, automock)]
#[async_trait]
pub trait MediaProbe: Send + Sync {
    /// Dump the stream list of `path`
    async fn probe_streams(&self, path: &Path) -> Result<ProbeResult>;

    /// Container duration of `path` in seconds
    async fn probe_duration(&self, path: &Path) -> Result<f64>;
}

/// ffprobe backed implementation of [`MediaProbe`]
pub struct FfprobeProber {
    binary_path: String,
}

impl FfprobeProber {
    pub fn new(config: &MediaConfig) -> Self {
        Self {
            binary_path: config.ffprobe_path.clone(),
        }
    }

    async fn run(&self, args: &[&str], path: &Path) -> Result<String> {
        let mut cmd = Command::new(&self.binary_path);
        cmd.args(args).arg(path);

        debug!("Executing ffprobe command: {:?}", cmd);

        let output = cmd.output().await
            .map_err(|e| RenderError::ProbeFailure(format!("Failed to execute ffprobe: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RenderError::ProbeFailure(format!(
                "ffprobe exited with {} for {}: {}",
                output.status,
                path.display(),
                stderr.trim()
            )));
        }

        String::from_utf8(output.stdout)
            .map_err(|e| RenderError::ProbeFailure(format!("ffprobe output is not UTF-8: {}", e)))
    }
}

#[async_trait]
impl MediaProbe for FfprobeProber {
    async fn probe_streams(&self, path: &Path) -> Result<ProbeResult> {
        let stdout = self
            .run(&["-v", "error", "-show_format", "-show_streams", "-print_format", "json"], path)
            .await?;
        parse_probe_json(&stdout)
    }

    async fn probe_duration(&self, path: &Path) -> Result<f64> {
        let stdout = self
            .run(
                &[
                    "-v", "error",
                    "-show_entries", "format=duration",
                    "-of", "default=noprint_wrappers=1:nokey=1",
                ],
                path,
            )
            .await?;
        parse_duration(&stdout)
    }
}

/// Parse the JSON stream dump
pub fn parse_probe_json(output: &str) -> Result<ProbeResult> {
    serde_json::from_str(output)
        .map_err(|e| RenderError::ProbeFailure(format!("Malformed ffprobe output: {}", e)))
}

/// Parse the plain-text duration answer
pub fn parse_duration(output: &str) -> Result<f64> {
    let line = output.trim();
    line.parse::<f64>()
        .ok()
        .filter(|seconds| seconds.is_finite())
        .ok_or_else(|| RenderError::ProbeFailure(format!("Unparsable duration: {:?}", line)))
}

/// Classify `path`, degrading any probe failure to [`MediaKind::Unknown`].
///
/// The error is handed to `on_error` instead of being returned.
pub async fn classify_media(
    probe: &dyn MediaProbe,
    path: &Path,
    on_error: &mut dyn FnMut(&RenderError),
) -> MediaKind {
    match probe.probe_streams(path).await {
        Ok(result) => result.media_kind(),
        Err(e) => {
            debug!("Could not probe {}: {}", path.display(), e);
            on_error(&e);
            MediaKind::Unknown
        }
    }
}
