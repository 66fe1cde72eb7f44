// Media processing
//
// - Commands: ffmpeg command building and filter argument escaping
// - Processor: the subtitle burn-in driver with progress tracking

pub mod commands;
pub mod processor;

pub use commands::*;
pub use processor::*;
