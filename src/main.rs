//! rendersrt - burn an SRT subtitle file into a video file
//!
//! Resolves the video and subtitle path patterns, checks that both files are
//! usable and then drives ffmpeg while showing a progress bar.

use anyhow::Result;
use clap::Parser;
use std::path::Path;
use tracing::{debug, info, Level};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use rendersrt::cli::Args;
use rendersrt::config::{Config, LoggingConfig, DEFAULT_CONFIG_FILE};
use rendersrt::error::exit_code_for;
use rendersrt::progress::ConsoleProgress;
use rendersrt::workflow::{RenderJob, Workflow};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Load configuration
    let mut config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            if Path::new(DEFAULT_CONFIG_FILE).exists() {
                Config::from_file(DEFAULT_CONFIG_FILE)?
            } else {
                Config::default()
            }
        }
    };

    if let Some(policy) = args.subtitle_policy {
        config.pipeline.subtitle_policy = policy;
    }
    if args.legacy_exit_codes {
        config.pipeline.legacy_exit_codes = true;
    }

    // Keep the file writer guard alive until the program ends
    let guard = setup_logging(args.verbose, &config.logging)?;
    debug!("Effective configuration: {:?}", config);

    let job = RenderJob {
        video_pattern: args.video_file_path,
        subtitle_pattern: args.subtitle_file_path,
        output_path: args.output_file_path,
    };

    let legacy_exit_codes = config.pipeline.legacy_exit_codes;
    let workflow = Workflow::new(config);
    let mut progress = ConsoleProgress::new();

    match workflow.run(&job, &mut progress, &mut |message| println!("{}", message)).await {
        Ok(output) => {
            info!("rendersrt completed successfully: {}", output.display());
            Ok(())
        }
        Err(e) => {
            println!("{}", e);
            let code = exit_code_for(&e, legacy_exit_codes);
            info!("rendersrt stopped: {} (exit code {})", e, code);
            // Flush the log file before exiting
            drop(guard);
            std::process::exit(code);
        }
    }
}

/// Setup logging to the console and, when configured, to a daily log file
fn setup_logging(verbose: bool, logging: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    // Determine log level
    let log_level = if verbose { Level::DEBUG } else { Level::WARN };

    // Create console layer
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_file(verbose)
        .with_line_number(verbose);

    // Create file layer
    let (file_layer, guard) = match &logging.directory {
        Some(log_dir) => {
            std::fs::create_dir_all(log_dir)?;
            let file_appender = rolling::daily(log_dir, "rendersrt.log");
            let (non_blocking_file, guard) = non_blocking(file_appender);
            let layer = fmt::layer()
                .with_writer(non_blocking_file)
                .with_target(false)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .with_ansi(false) // No ANSI colors in file
                .boxed();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    // Setup layered subscriber
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!("Logging initialized - console: {}, file: {}", log_level,
          logging.directory.as_ref().map_or("disabled".to_string(), |d| d.join("rendersrt.log").display().to_string()));

    Ok(guard)
}
