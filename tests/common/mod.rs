#![allow(dead_code)]

//! Stand-in ffprobe/ffmpeg executables for pipeline tests

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use rendersrt::config::Config;
use rendersrt::progress::ProgressSink;

pub const VALID_SRT: &str = "1\n00:00:01,000 --> 00:00:04,000\nHello world\n\n\
                             2\n00:00:05,000 --> 00:00:08,000\nSecond line\n";

/// ffprobe reporting one video stream and a 10 second duration
pub const FAKE_FFPROBE: &str = r#"#!/bin/sh
case "$*" in
  *format=duration*) echo "10.000000" ;;
  *) echo '{"streams":[{"index":0,"codec_type":"video"},{"index":1,"codec_type":"audio"}]}' ;;
esac
"#;

/// ffmpeg printing three status updates and writing its last argument
pub const FAKE_FFMPEG_OK: &str = r#"#!/bin/sh
for last; do :; done
echo "Input #0, mov,mp4,m4a,3gp,3g2,mj2, from 'movie.mp4':" >&2
printf 'frame=    1 fps=0.0 q=0.0 size=       0kB time=00:00:00.00 bitrate=N/A speed=   0x\r' >&2
printf 'frame=  120 fps= 60 q=28.0 size=     256kB time=00:00:05.00 bitrate= 419.4kbits/s speed=2x\r' >&2
printf 'frame=  240 fps= 60 q=28.0 size=     512kB time=00:00:10.00 bitrate= 419.4kbits/s speed=2x\n' >&2
echo "rendered" > "$last"
"#;

/// ffmpeg that starts writing its output and then fails
pub const FAKE_FFMPEG_FAIL: &str = r#"#!/bin/sh
for last; do :; done
echo "partial" > "$last"
printf 'frame=   60 fps= 60 q=28.0 size=     128kB time=00:00:02.50 bitrate= 419.4kbits/s speed=2x\r' >&2
echo "Error while filtering: Invalid data found when processing input" >&2
exit 1
"#;

/// ffmpeg that reports progress and exits cleanly without writing anything
pub const FAKE_FFMPEG_NO_OUTPUT: &str = r#"#!/bin/sh
printf 'frame=  240 fps= 60 q=28.0 size=       0kB time=00:00:10.00 bitrate=N/A speed=2x\n' >&2
exit 0
"#;

pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, body).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

pub fn config_with(ffprobe: &Path, ffmpeg: &Path) -> Config {
    let mut config = Config::default();
    config.media.ffprobe_path = ffprobe.to_string_lossy().to_string();
    config.media.ffmpeg_path = ffmpeg.to_string_lossy().to_string();
    config
}

#[derive(Default)]
pub struct RecordingProgress {
    pub started: bool,
    pub updates: Vec<u32>,
    pub finished: bool,
    pub abandoned: bool,
}

impl ProgressSink for RecordingProgress {
    fn start(&mut self) {
        self.started = true;
    }

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
