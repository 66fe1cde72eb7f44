use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    /// Messages below are printed verbatim to the user.
    #[error("{0} is not exist")]
    PathNotFound(String),

    #[error("No any {0} file matching filename you typed")]
    NoMatch(String),

    #[error("{0} is not valid video or audio file")]
    InvalidMediaFile(String),

    #[error("{0} is not a valid SRT subtitle file")]
    InvalidSubtitleFile(String),

    #[error("Nothing was rendered: no valid subtitle file")]
    RenderSkipped,

    #[error("Probe error: {0}")]
    ProbeFailure(String),

    #[error("Failed to start transcoder: {0}")]
    TranscodeLaunchFailure(String),

    #[error("Rendering failed: {0}")]
    TranscodeRuntimeFailure(String),
}

impl RenderError {
    /// Process exit code reported for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            RenderError::Io(_) | RenderError::Config(_) => 1,
            RenderError::PathNotFound(_) => 3,
            RenderError::NoMatch(_) => 4,
            RenderError::InvalidMediaFile(_) => 5,
            RenderError::InvalidSubtitleFile(_) | RenderError::RenderSkipped => 6,
            RenderError::ProbeFailure(_) => 7,
            RenderError::TranscodeLaunchFailure(_) => 8,
            RenderError::TranscodeRuntimeFailure(_) => 9,
        }
    }
}

/// Exit code for `err`, or 0 for every error when `legacy` is set.
pub fn exit_code_for(err: &RenderError, legacy: bool) -> i32 {
    if legacy { 0 } else { err.exit_code() }
}

pub type Result<T> = std::result::Result<T, RenderError>;
