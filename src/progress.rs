//! Progress estimation from ffmpeg's textual status output.
//!
//! ffmpeg rewrites its status line in place using carriage returns, so the
//! stream is split on both `\r` and `\n` before each line is inspected for a
//! `time=HH:MM:SS.ff` marker.

use indicatif::{ProgressBar, ProgressStyle};
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::trace;

const TIME_MARKER: &str = "time=";

/// Convert a colon separated clock token to seconds.
///
/// Components are weighted by successive powers of 60 from the right.
pub fn parse_elapsed_time(token: &str) -> Option<f64> {
    token
        .split(':')
        .rev()
        .enumerate()
        .try_fold(0.0, |total, (i, part)| {
            let value = part.parse::<f64>().ok().filter(|v| v.is_finite())?;
            Some(total + value * 60f64.powi(i as i32))
        })
}

/// Percentage of `total_duration` reached according to one output line.
///
/// Returns `None` for lines without a usable time marker and while the
/// elapsed time is still zero.
pub fn parse_progress_line(line: &str, total_duration: f64) -> Option<u32> {
    let (_, rest) = line.split_once(TIME_MARKER)?;
    let token = rest.split_whitespace().next()?;

    let Some(elapsed) = parse_elapsed_time(token) else {
        trace!("Ignoring unparsable progress token {:?}", token);
        return None;
    };

    if elapsed <= 0.0 || total_duration <= 0.0 {
        return None;
    }

    let percent = (elapsed * 100.0 / total_duration).floor().min(100.0);
    Some(percent as u32)
}

/// Progress of one render, owned by the call that drives ffmpeg
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressState {
    pub total_duration: f64,
    pub last_percent: u32,
}

impl ProgressState {
    pub fn new(total_duration: f64) -> Self {
        Self {
            total_duration,
            last_percent: 0,
        }
    }

    /// Feed one output line; returns the percentage to report, if any.
    pub fn observe(&mut self, line: &str) -> Option<u32> {
        let percent = parse_progress_line(line, self.total_duration)?;
        self.last_percent = percent;
        Some(percent)
    }
}

/// Receiver of render progress
pub trait ProgressSink: Send {
    fn start(&mut self) {}

    fn update(&mut self, percent: u32);

    fn finish(&mut self) {}

    fn abandon(&mut self) {}
}

/// Terminal progress bar
pub struct ConsoleProgress {
    bar: Option<ProgressBar>,
}

impl ConsoleProgress {
    pub fn new() -> Self {
        Self { bar: None }
    }
}

impl Default for ConsoleProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for ConsoleProgress {
    fn start(&mut self) {
        let bar = ProgressBar::new(100);
        let style = ProgressStyle::default_bar()
            .template("Rendering subtitle file into video file : {percent:>3}% [{bar:40.cyan/blue}] ETA {eta}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");
        bar.set_style(style);
        self.bar = Some(bar);
    }

    fn update(&mut self, percent: u32) {
        if let Some(bar) = &self.bar {
            bar.set_position(u64::from(percent));
        }
    }

    fn finish(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.set_position(100);
            bar.finish();
        }
    }

    fn abandon(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.abandon();
        }
    }
}

/// Call `on_line` for every `\r` or `\n` terminated line read from `reader`.
///
/// Empty lines are skipped and invalid UTF-8 is replaced lossily. A trailing
/// line without terminator is delivered once the reader is exhausted.
pub async fn for_each_line<R, F>(mut reader: R, mut on_line: F) -> std::io::Result<()>
where
    R: AsyncRead + Unpin,
    F: FnMut(&str),
{
    let mut pending: Vec<u8> = Vec::new();
    let mut chunk = [0u8; 4096];

    loop {
        let read = reader.read(&mut chunk).await?;
        if read == 0 {
            break;
        }

        for &byte in &chunk[..read] {
            if byte == b'\n' || byte == b'\r' {
                if !pending.is_empty() {
                    on_line(&String::from_utf8_lossy(&pending));
                    pending.clear();
                }
            } else {
                pending.push(byte);
            }
        }
    }

    if !pending.is_empty() {
        on_line(&String::from_utf8_lossy(&pending));
    }

    Ok(())
}
