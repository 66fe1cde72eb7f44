use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, trace, warn};

use crate::config::MediaConfig;
use crate::error::{Result, RenderError};
use crate::probe::{MediaKind, MediaProbe};
use crate::progress::{for_each_line, ProgressSink, ProgressState};
use super::{normalize_path, MediaCommandBuilder};

/// Lines of ffmpeg output kept for the failure message
const OUTPUT_TAIL_LINES: usize = 10;

/// Burns a subtitle file into a video with ffmpeg, tracking its progress
pub struct SubtitleRenderer {
    config: MediaConfig,
    command_builder: MediaCommandBuilder,
    remove_partial_output: bool,
}

impl SubtitleRenderer {
    pub fn new(config: MediaConfig, remove_partial_output: bool) -> Self {
        let command_builder = MediaCommandBuilder::new(&config.ffmpeg_path);

        Self {
            config,
            command_builder,
            remove_partial_output,
        }
    }

    /// Render `subtitle_path` into `video_path`, writing `output_path`.
    ///
    /// `kind` is only used for logging. Returns the output path on success.
    pub async fn render(
        &self,
        probe: &dyn MediaProbe,
        video_path: &Path,
        subtitle_path: &Path,
        output_path: &Path,
        kind: MediaKind,
        progress: &mut dyn ProgressSink,
    ) -> Result<PathBuf> {
        let video = normalize_path(video_path);
        let subtitle = normalize_path(subtitle_path);
        let output = normalize_path(output_path);

        info!("Rendering subtitles from {} into {} file {} -> {}", subtitle, kind, video, output);

        let total_duration = probe.probe_duration(Path::new(&video)).await?;
        debug!("Total duration of {}: {}s", video, total_duration);

        let command = self.command_builder.burn_subtitles(
            &video,
            &subtitle,
            &output,
            &self.config.render_options,
        );

        let output_existed = Path::new(&output).exists();
        let mut child = command.spawn()?;
        let stderr = child.stderr.take().ok_or_else(|| {
            RenderError::TranscodeLaunchFailure("ffmpeg status stream unavailable".to_string())
        })?;

        progress.start();
        let mut state = ProgressState::new(total_duration);
        let mut tail: VecDeque<String> = VecDeque::with_capacity(OUTPUT_TAIL_LINES);

        let streamed = for_each_line(stderr, |line| {
            if let Some(percent) = state.observe(line) {
                progress.update(percent);
            } else {
                trace!("ffmpeg: {}", line);
                if tail.len() == OUTPUT_TAIL_LINES {
                    tail.pop_front();
                }
                tail.push_back(line.to_string());
            }
        })
        .await;

        let status = child.wait().await
            .map_err(|e| RenderError::TranscodeRuntimeFailure(format!("Failed to wait for ffmpeg: {}", e)));

        let failure = match (streamed, status) {
            (Ok(()), Ok(status)) if status.success() => None,
            (Err(e), _) => Some(format!("Failed to read ffmpeg output: {}", e)),
            (_, Err(e)) => Some(e.to_string()),
            (_, Ok(status)) => Some(format!(
                "{} exited with {}: {}",
                command.description,
                status,
                Vec::from(tail).join("\n")
            )),
        };

        if let Some(message) = failure {
            progress.abandon();
            if self.remove_partial_output && !output_existed {
                self.remove_partial(Path::new(&output)).await;
            }
            return Err(RenderError::TranscodeRuntimeFailure(message));
        }

        progress.finish();
        info!("Subtitle burn-in completed at {}%", state.last_percent);
        Ok(PathBuf::from(output))
    }

    async fn remove_partial(&self, output_path: &Path) {
        if !output_path.exists() {
            return;
        }

        match fs::remove_file(output_path).await {
            Ok(()) => info!("Removed partial output {}", output_path.display()),
            Err(e) => warn!("Could not remove partial output {}: {}", output_path.display(), e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::MockMediaProbe;

    #[derive(Default)]
    struct RecordingProgress {
        updates: Vec<u32>,
        finished: bool,
        abandoned: bool,
    }

    impl ProgressSink for RecordingProgress {
        fn update(&mut self, percent: u32) {
            self.updates.push(percent);
        }

        fn finish(&mut self) {
            self.finished = true;
        }

        fn abandon(&mut self) {
            self.abandoned = true;
        }
    }

    #[tokio::test]
    async fn test_duration_probe_failure_stops_render() {
        let mut probe = MockMediaProbe::new();
        probe.expect_probe_duration().times(1).returning(|_| {
            Err(RenderError::ProbeFailure("Unparsable duration: \"N/A\"".to_string()))
        });

        let renderer = SubtitleRenderer::new(MediaConfig::default(), true);
        let mut progress = RecordingProgress::default();
        let err = renderer
            .render(
                &probe,
                Path::new("in.mp4"),
                Path::new("in.srt"),
                Path::new("out.mp4"),
                MediaKind::Video,
                &mut progress,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, RenderError::ProbeFailure(_)));
        assert!(progress.updates.is_empty());
        assert!(!progress.finished);
    }

    #[tokio::test]
    async fn test_missing_ffmpeg_is_launch_failure() {
        let mut probe = MockMediaProbe::new();
        probe.expect_probe_duration().returning(|_| Ok(100.0));

        let config = MediaConfig {
            ffmpeg_path: "/nonexistent/ffmpeg-binary".to_string(),
            ..MediaConfig::default()
        };
        let renderer = SubtitleRenderer::new(config, true);
        let mut progress = RecordingProgress::default();
        let err = renderer
            .render(
                &probe,
                Path::new("in.mp4"),
                Path::new("in.srt"),
                Path::new("out.mp4"),
                MediaKind::Audio,
                &mut progress,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, RenderError::TranscodeLaunchFailure(_)));
        assert!(!progress.abandoned);
    }
}
