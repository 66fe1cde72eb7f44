use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::error::{Result, RenderError};

/// File name picked up from the current directory when no `--config` is given
pub const DEFAULT_CONFIG_FILE: &str = "rendersrt.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub media: MediaConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// Path to ffmpeg binary
    pub ffmpeg_path: String,
    /// Path to ffprobe binary
    pub ffprobe_path: String,
    /// Additional encoding options inserted before the output path
    /// Common options: ["-preset", "medium", "-crf", "23", "-c:a", "copy"]
    pub render_options: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// What to do when the subtitle file is missing or invalid
    pub subtitle_policy: SubtitlePolicy,
    /// Always exit with status 0, as rendersrt 0.0.1 did
    pub legacy_exit_codes: bool,
    /// Delete the output file if ffmpeg fails halfway through
    pub remove_partial_output: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SubtitlePolicy {
    /// Stop at the first subtitle problem
    FailFast,
    /// Print the problem and keep going; nothing gets rendered
    Warn,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Directory for daily rotated log files; console only when unset
    pub directory: Option<PathBuf>,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: "ffmpeg".to_string(),
            ffprobe_path: "ffprobe".to_string(),
            render_options: vec![],
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            subtitle_policy: SubtitlePolicy::FailFast,
            legacy_exit_codes: false,
            remove_partial_output: true,
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| RenderError::Config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| RenderError::Config(format!("Failed to parse config file: {}", e)))
    }
}
