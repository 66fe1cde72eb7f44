//! rendersrt - burn SRT subtitles into video files
//!
//! A thin orchestration layer around ffprobe and ffmpeg: path patterns are
//! resolved, the media and subtitle files validated, and ffmpeg's progress
//! output turned into a percentage.

pub mod cli;
pub mod config;
pub mod workflow;
pub mod paths;
pub mod probe;
pub mod subtitle;
pub mod progress;
pub mod media;
pub mod error;
