use std::path::Path;
use std::process::Stdio;
use tokio::process::{Child, Command};
use tracing::debug;

use crate::error::{Result, RenderError};

/// Abstract media processing command representation
#[derive(Debug, Clone)]
pub struct MediaCommand {
    pub binary_path: String,
    pub args: Vec<String>,
    pub description: String,
}

impl MediaCommand {
    /// Create a new media processing command
    pub fn new<S1: Into<String>, S2: Into<String>>(binary_path: S1, description: S2) -> Self {
        Self {
            binary_path: binary_path.into(),
            args: Vec::new(),
            description: description.into(),
        }
    }

    /// Add an argument
    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add multiple arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(|s| s.into()));
        self
    }

    /// Add input file
    pub fn input<S: Into<String>>(self, path: S) -> Self {
        self.arg("-i").arg(path)
    }

    /// Add output file
    pub fn output<S: Into<String>>(self, path: S) -> Self {
        self.arg(path)
    }

    /// Force overwrite output
    pub fn overwrite(self) -> Self {
        self.arg("-y")
    }

    /// Add video filter
    pub fn video_filter<S: Into<String>>(self, filter: S) -> Self {
        self.arg("-vf").arg(filter)
    }

    /// Launch the command with its status stream (stderr) piped
    pub fn spawn(&self) -> Result<Child> {
        debug!("Executing media processing command: {} {:?}", self.binary_path, self.args);
        debug!("Description: {}", self.description);

        Command::new(&self.binary_path)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| RenderError::TranscodeLaunchFailure(format!(
                "{}: {}", self.binary_path, e
            )))
    }
}

/// Builder for the commands this tool runs
pub struct MediaCommandBuilder {
    binary_path: String,
}

impl MediaCommandBuilder {
    /// Create a new command builder
    pub fn new<S: Into<String>>(binary_path: S) -> Self {
        Self {
            binary_path: binary_path.into(),
        }
    }

    /// Build subtitle burn-in command
    pub fn burn_subtitles(
        &self,
        video_path: &str,
        subtitle_path: &str,
        output_path: &str,
        additional_options: &[String],
    ) -> MediaCommand {
        MediaCommand::new(&self.binary_path, "Subtitle burn-in")
            .overwrite()
            .input(video_path)
            .video_filter(format!("subtitles={}", escape_filter_value(subtitle_path)))
            .args(additional_options.iter().cloned())
            .output(output_path)
    }
}

/// Forward-slash form of `path`, as ffmpeg accepts on every platform
pub fn normalize_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Escape `value` for use as a filter option inside a `-vf` filtergraph.
///
/// Two rounds: one for the option parser, one for the filtergraph parser.
pub fn escape_filter_value(value: &str) -> String {
    let option_level = escape_chars(value, &['\\', '\'', ':']);
    escape_chars(&option_level, &['\\', '\'', '[', ']', ',', ';'])
}

fn escape_chars(value: &str, special: &[char]) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if special.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path(Path::new(r"C:\Videos\movie.mp4")), "C:/Videos/movie.mp4");
        assert_eq!(normalize_path(Path::new("/home/me/movie.mp4")), "/home/me/movie.mp4");
    }

    #[test]
    fn test_escape_filter_value() {
        assert_eq!(escape_filter_value("movie.srt"), "movie.srt");
        assert_eq!(escape_filter_value("C:/subs/movie.srt"), r"C\\:/subs/movie.srt");
        assert_eq!(escape_filter_value("it's.srt"), r"it\\\'s.srt");
        assert_eq!(escape_filter_value("Movie [1080p], part 1.srt"), r"Movie \[1080p\]\, part 1.srt");
    }

    #[test]
    fn test_burn_subtitles_command() {
        let builder = MediaCommandBuilder::new("ffmpeg");
        let options = vec!["-crf".to_string(), "23".to_string()];
        let cmd = builder.burn_subtitles("in.mp4", "subs.srt", "out.mp4", &options);

        assert_eq!(cmd.binary_path, "ffmpeg");
        assert_eq!(
            cmd.args,
            vec!["-y", "-i", "in.mp4", "-vf", "subtitles=subs.srt", "-crf", "23", "out.mp4"]
        );
    }

    #[tokio::test]
    async fn test_spawn_missing_binary() {
        let cmd = MediaCommand::new("/nonexistent/ffmpeg-binary", "Subtitle burn-in").arg("-version");
        assert!(matches!(cmd.spawn(), Err(RenderError::TranscodeLaunchFailure(_))));
    }
}
