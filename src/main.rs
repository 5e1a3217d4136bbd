//! CLI entry point for the trip segmenter.
//!
//! Reads a headerless `device_id,lat,lon,timestamp` CSV, logs rejected rows,
//! and writes the reconstructed trips as GeoJSON.

use anyhow::Result;
use clap::Parser;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::error;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};
use trip_segmenter::pipeline::{
    DEFAULT_INPUT, DEFAULT_OUTPUT, DEFAULT_REJECTS, PipelineConfig, run,
};

#[derive(Parser)]
#[command(name = "trip_segmenter")]
#[command(about = "Split device location samples into trips and export GeoJSON", long_about = None)]
struct Cli {
    /// Headerless CSV with device_id, latitude, longitude, timestamp
    #[arg(short, long, default_value = DEFAULT_INPUT)]
    input: PathBuf,

    /// File receiving rejected rows, one per line
    #[arg(short, long, default_value = DEFAULT_REJECTS)]
    rejects: PathBuf,

    /// GeoJSON file to write, replaced on every run
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    output: PathBuf,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/trip_segmenter.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("trip_segmenter.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let config = PipelineConfig {
        input: cli.input,
        rejects: cli.rejects,
        output: cli.output,
    };

    match run(&config) {
        Ok(summary) => {
            println!(
                "Processing complete. Trips saved to {}",
                summary.output.display()
            );
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Run aborted");
            Err(e)
        }
    }
}
