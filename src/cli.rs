use clap::{ArgAction, Parser};
use std::path::PathBuf;

use crate::config::SubtitlePolicy;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None, disable_version_flag = true)]
pub struct Args {
    /// Video file path (glob patterns allowed)
    pub video_file_path: String,

    /// SRT subtitle file path (glob patterns allowed)
    pub subtitle_file_path: String,

    /// Output video file path
    pub output_file_path: PathBuf,

    /// Print version
    #[arg(short = 'v', long, action = ArgAction::Version)]
    pub version: Option<bool>,

    /// Enable verbose logging
    #[arg(long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// How to handle a missing or invalid subtitle file
    #[arg(long, value_enum)]
    pub subtitle_policy: Option<SubtitlePolicy>,

    /// Always exit with status 0, even on errors
    #[arg(long)]
    pub legacy_exit_codes: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_positional_arguments() {
        let args = Args::try_parse_from(["rendersrt", "movie.mp4", "movie.srt", "out.mp4"]).unwrap();
        assert_eq!(args.video_file_path, "movie.mp4");
        assert_eq!(args.subtitle_file_path, "movie.srt");
        assert_eq!(args.output_file_path, PathBuf::from("out.mp4"));
        assert!(!args.verbose);
        assert!(args.subtitle_policy.is_none());
    }

    #[test]
    fn test_optional_flags() {
        let args = Args::try_parse_from([
            "rendersrt", "--subtitle-policy", "warn", "--legacy-exit-codes",
            "-c", "custom.toml", "*.mp4", "*.srt", "out.mp4",
        ])
        .unwrap();
        assert_eq!(args.subtitle_policy, Some(SubtitlePolicy::Warn));
        assert!(args.legacy_exit_codes);
        assert_eq!(args.config, Some(PathBuf::from("custom.toml")));
    }

    #[test]
    fn test_version_flag() {
        let err = Args::try_parse_from(["rendersrt", "-v"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
        assert!(err.to_string().contains("rendersrt 0.0.1"));
    }

    #[test]
    fn test_missing_arguments() {
        assert!(Args::try_parse_from(["rendersrt", "movie.mp4"]).is_err());
    }
}
