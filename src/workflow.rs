use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::{Config, SubtitlePolicy};
use crate::error::{Result, RenderError};
use crate::media::SubtitleRenderer;
use crate::paths::{resolve_pattern, PathResolution, Platform};
use crate::probe::{classify_media, FfprobeProber, MediaKind, MediaProbe};
use crate::progress::ProgressSink;
use crate::subtitle::is_valid_srt;

/// One invocation: what to burn into what, and where to write it
#[derive(Debug, Clone)]
pub struct RenderJob {
    pub video_pattern: String,
    pub subtitle_pattern: String,
    pub output_path: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaClass {
    Video,
    Audio,
    Unknown,
    NotFound,
}

impl From<MediaKind> for MediaClass {
    fn from(kind: MediaKind) -> Self {
        match kind {
            MediaKind::Video => MediaClass::Video,
            MediaKind::Audio => MediaClass::Audio,
            MediaKind::Unknown => MediaClass::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaCandidate {
    pub path: String,
    pub class: MediaClass,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleCandidate {
    pub path: String,
    pub exists: bool,
    pub valid: bool,
}

pub struct Workflow {
    config: Config,
    probe: Box<dyn MediaProbe>,
    renderer: SubtitleRenderer,
    platform: Platform,
}

impl Workflow {
    pub fn new(config: Config) -> Self {
        let probe = Box::new(FfprobeProber::new(&config.media));
        Self::with_probe(config, probe)
    }

    pub fn with_probe(config: Config, probe: Box<dyn MediaProbe>) -> Self {
        let renderer = SubtitleRenderer::new(
            config.media.clone(),
            config.pipeline.remove_partial_output,
        );

        Self {
            config,
            probe,
            renderer,
            platform: Platform::current(),
        }
    }

    /// Resolve and classify the media pattern; `None` when nothing matched.
    pub async fn resolve_media(
        &self,
        pattern: &str,
        on_message: &mut dyn FnMut(&str),
    ) -> Option<MediaCandidate> {
        match resolve_pattern(pattern, self.platform) {
            PathResolution::Found(path) => {
                let kind = classify_media(self.probe.as_ref(), &path, &mut |e| {
                    on_message(&e.to_string())
                })
                .await;
                info!("Media file {} classified as {}", path.display(), kind);

                Some(MediaCandidate {
                    path: path.display().to_string(),
                    class: kind.into(),
                })
            }
            PathResolution::Missing(path) => Some(MediaCandidate {
                path,
                class: MediaClass::NotFound,
            }),
            PathResolution::NoMatch => None,
        }
    }

    /// Resolve and validate the subtitle pattern; `None` when nothing matched.
    pub async fn resolve_subtitle(&self, pattern: &str) -> Option<SubtitleCandidate> {
        match resolve_pattern(pattern, self.platform) {
            PathResolution::Found(path) => Some(SubtitleCandidate {
                valid: is_valid_srt(&path).await,
                path: path.display().to_string(),
                exists: true,
            }),
            PathResolution::Missing(path) => Some(SubtitleCandidate {
                path,
                exists: false,
                valid: false,
            }),
            PathResolution::NoMatch => None,
        }
    }

    /// Run the whole pipeline for `job`.
    ///
    /// User-facing notices go to `on_message`; the returned error carries the
    /// message for the stage that stopped the run.
    pub async fn run(
        &self,
        job: &RenderJob,
        progress: &mut dyn ProgressSink,
        on_message: &mut dyn FnMut(&str),
    ) -> Result<PathBuf> {
        info!("Resolving media file pattern {:?}", job.video_pattern);
        let media = match self.resolve_media(&job.video_pattern, on_message).await {
            None => return Err(RenderError::NoMatch("video".to_string())),
            Some(candidate) => candidate,
        };
        let kind = match media.class {
            MediaClass::Video => MediaKind::Video,
            MediaClass::Audio => MediaKind::Audio,
            MediaClass::Unknown => return Err(RenderError::InvalidMediaFile(media.path)),
            MediaClass::NotFound => return Err(RenderError::PathNotFound(media.path)),
        };

        info!("Resolving subtitle file pattern {:?}", job.subtitle_pattern);
        let subtitle = match self.resolve_subtitle(&job.subtitle_pattern).await {
            Some(SubtitleCandidate { path, valid: true, .. }) => Ok(path),
            Some(SubtitleCandidate { path, exists: false, .. }) => Err(RenderError::PathNotFound(path)),
            Some(SubtitleCandidate { path, .. }) => Err(RenderError::InvalidSubtitleFile(path)),
            None => Err(RenderError::NoMatch("SRT subtitle".to_string())),
        };

        let subtitle = match (subtitle, self.config.pipeline.subtitle_policy) {
            (Ok(path), _) => path,
            (Err(e), SubtitlePolicy::FailFast) => return Err(e),
            (Err(e), SubtitlePolicy::Warn) => {
                warn!("Continuing without a usable subtitle file: {}", e);
                on_message(&e.to_string());
                info!("Skipping render");
                return Err(RenderError::RenderSkipped);
            }
        };

        let output = self
            .renderer
            .render(
                self.probe.as_ref(),
                Path::new(&media.path),
                Path::new(&subtitle),
                &job.output_path,
                kind,
                progress,
            )
            .await?;

        if !output.exists() {
            return Err(RenderError::TranscodeRuntimeFailure(format!(
                "ffmpeg finished but {} was not created",
                output.display()
            )));
        }

        on_message(&format!("Done! Output video file : {}", output.display()));
        Ok(output)
    }
}
