use std::fmt;
use std::path::Path;
use tokio::fs;
use tracing::{debug, info};

use crate::error::{Result, RenderError};

/// One timed text entry of an SRT document
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleCue {
    pub index: Option<u32>,
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds
    pub end: f64,
    pub text: String,
}

/// Why an SRT document was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SrtParseError {
    InvalidEncoding,
    MissingTiming { line: usize },
    InvalidTimestamp { line: usize, value: String },
}

impl fmt::Display for SrtParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SrtParseError::InvalidEncoding => write!(f, "file is not valid UTF-8, UTF-16 or UTF-32 text"),
            SrtParseError::MissingTiming { line } => {
                write!(f, "line {}: expected a `start --> end` timing line", line)
            }
            SrtParseError::InvalidTimestamp { line, value } => {
                write!(f, "line {}: invalid timestamp {:?}", line, value)
            }
        }
    }
}

impl std::error::Error for SrtParseError {}

/// Parse SRT content into cues.
///
/// Blank or whitespace-only content yields no cues.
pub fn parse_srt(content: &str) -> std::result::Result<Vec<SubtitleCue>, SrtParseError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut cues = Vec::new();
    let mut lines = content.lines().enumerate().peekable();

    loop {
        // Skip separators between blocks
        while lines.next_if(|(_, line)| line.trim().is_empty()).is_some() {}

        let Some((number, first)) = lines.next() else {
            break;
        };

        let (index, (timing_number, timing)) = match first.trim().parse::<u32>() {
            Ok(index) => match lines.next() {
                Some(next) => (Some(index), next),
                None => return Err(SrtParseError::MissingTiming { line: number + 2 }),
            },
            Err(_) => (None, (number, first)),
        };

        let (start, end) = parse_timing_line(timing, timing_number + 1)?;

        let mut text = Vec::new();
        while let Some((_, line)) = lines.next_if(|(_, line)| !line.trim().is_empty()) {
            text.push(line.trim_end());
        }

        cues.push(SubtitleCue {
            index,
            start,
            end,
            text: text.join("\n"),
        });
    }

    Ok(cues)
}

fn parse_timing_line(line: &str, number: usize) -> std::result::Result<(f64, f64), SrtParseError> {
    let (start, rest) = line
        .split_once("-->")
        .ok_or(SrtParseError::MissingTiming { line: number })?;

    // Position hints such as `X1:100 X2:200` may follow the end time
    let end = rest.split_whitespace().next().unwrap_or("");

    Ok((parse_srt_time(start.trim(), number)?, parse_srt_time(end, number)?))
}

/// Parse `HH:MM:SS,mmm` (or `HH:MM:SS.mmm`) into seconds
fn parse_srt_time(value: &str, number: usize) -> std::result::Result<f64, SrtParseError> {
    let invalid = || SrtParseError::InvalidTimestamp {
        line: number,
        value: value.to_string(),
    };

    let (clock, millis) = value
        .split_once([',', '.'])
        .ok_or_else(invalid)?;

    let parts: Vec<&str> = clock.split(':').collect();
    let [hours, minutes, seconds] = parts.as_slice() else {
        return Err(invalid());
    };

    let field = |text: &str, max: u64| -> Option<u64> {
        if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        text.parse::<u64>().ok().filter(|n| *n < max)
    };

    let hours = field(*hours, u64::MAX).ok_or_else(invalid)?;
    let minutes = field(*minutes, 60).ok_or_else(invalid)?;
    let seconds = field(*seconds, 60).ok_or_else(invalid)?;
    if millis.len() > 3 {
        return Err(invalid());
    }
    let millis = field(millis, 1000).ok_or_else(invalid)?;

    Ok(hours as f64 * 3600.0 + (minutes * 60 + seconds) as f64 + millis as f64 / 1000.0)
}

/// Decode subtitle bytes, picking UTF-32 or UTF-16 from a byte order mark.
///
/// Anything without one of those marks must be UTF-8.
fn decode_text(bytes: &[u8]) -> Option<String> {
    match bytes {
        [0xff, 0xfe, 0x00, 0x00, ..] => decode_utf32(&bytes[4..], u32::from_le_bytes),
        [0x00, 0x00, 0xfe, 0xff, ..] => decode_utf32(&bytes[4..], u32::from_be_bytes),
        [0xff, 0xfe, ..] => decode_utf16(&bytes[2..], u16::from_le_bytes),
        [0xfe, 0xff, ..] => decode_utf16(&bytes[2..], u16::from_be_bytes),
        _ => String::from_utf8(bytes.to_vec()).ok(),
    }
}

fn decode_utf16(bytes: &[u8], unit: fn([u8; 2]) -> u16) -> Option<String> {
    if bytes.len() % 2 != 0 {
        return None;
    }
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| unit([pair[0], pair[1]]))
        .collect();
    String::from_utf16(&units).ok()
}

fn decode_utf32(bytes: &[u8], unit: fn([u8; 4]) -> u32) -> Option<String> {
    if bytes.len() % 4 != 0 {
        return None;
    }
    bytes
        .chunks_exact(4)
        .map(|quad| char::from_u32(unit([quad[0], quad[1], quad[2], quad[3]])))
        .collect()
}

/// Read and parse an SRT file
pub async fn read_srt<P: AsRef<Path>>(path: P) -> Result<Vec<SubtitleCue>> {
    let path = path.as_ref();
    let bytes = fs::read(path).await?;
    let content = decode_text(&bytes).ok_or_else(|| {
        RenderError::InvalidSubtitleFile(format!("{}: {}", path.display(), SrtParseError::InvalidEncoding))
    })?;

    parse_srt(&content)
        .map_err(|e| RenderError::InvalidSubtitleFile(format!("{}: {}", path.display(), e)))
}

/// Whether `path` is a readable, well-formed SRT file
pub async fn is_valid_srt<P: AsRef<Path>>(path: P) -> bool {
    let path = path.as_ref();
    if !path.is_file() {
        return false;
    }

    match read_srt(path).await {
        Ok(cues) => {
            let last_end = cues.iter().map(|cue| cue.end).fold(0.0, f64::max);
            info!("Subtitle file {} has {} cues ending at {}",
                  path.display(), cues.len(), format_srt_time(last_end));
            true
        }
        Err(e) => {
            debug!("Rejected subtitle file: {}", e);
            false
        }
    }
}

/// Format time in seconds to SRT time format (HH:MM:SS,mmm)
pub fn format_srt_time(seconds: f64) -> String {
    let total_milliseconds = (seconds * 1000.0).round() as u64;
    let hours = total_milliseconds / 3_600_000;
    let minutes = (total_milliseconds % 3_600_000) / 60_000;
    let secs = (total_milliseconds % 60_000) / 1_000;
    let millis = total_milliseconds % 1_000;

    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, secs, millis)
}
