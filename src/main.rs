//! Entry point for the e-book normalizer.
//!
//! Responsibilities here are intentionally minimal:
//! - Parse command-line arguments.
//! - Load user configuration from `conf/config.toml`.
//! - Run the normalization pipeline with the native engine.
//! - Print the report and where the cleaned book landed.

mod config;
mod engine;
mod epub_loader;
mod epub_writer;
mod markup;
mod metadata;
mod pdf_loader;
mod pipeline;
mod report;
mod synthesize;

use crate::config::{DEFAULT_CONFIG_PATH, load_config};
use crate::engine::NativeEngine;
use crate::pipeline::Pipeline;
use anyhow::{Result, anyhow};
use std::env;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*, reload};

type ReloadHandle = reload::Handle<EnvFilter, tracing_subscriber::Registry>;

const DEFAULT_OUTPUT_DIR: &str = "output";

fn main() {
    let reload_handle = init_tracing();
    if let Err(err) = run(&reload_handle) {
        error!("{err:?}");
        std::process::exit(1);
    }
}

fn run(reload_handle: &ReloadHandle) -> Result<()> {
    let args = parse_args(env::args().skip(1))?;
    let config = load_config(Path::new(DEFAULT_CONFIG_PATH));
    set_log_level(reload_handle, config.logging.log_level.as_filter_str());
    info!(
        input = %args.input.display(),
        output_dir = %args.output_dir.display(),
        level = %config.logging.log_level,
        "Starting e-book normalizer"
    );

    let pipeline = Pipeline::new(&config, NativeEngine);
    let job = pipeline.run(&args.input, &args.output_dir)?;

    print!("{}", job.report.render_text());
    println!();
    println!(
        "Success! Clean EPUB created at: {}",
        job.output_path.display()
    );
    println!(
        "Test with Kindle Previewer or run: epubcheck {}",
        job.output_path.display()
    );
    info!(report = %job.report_path.display(), "Report written");
    Ok(())
}

#[derive(Debug, PartialEq)]
struct CliArgs {
    input: PathBuf,
    output_dir: PathBuf,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<CliArgs> {
    let input = args
        .next()
        .ok_or_else(|| anyhow!("Usage: ebup-normalizer <input.epub|input.pdf> [output_dir]"))?;

    let input = PathBuf::from(input);
    if !input.exists() {
        return Err(anyhow!("File not found: {}", input.display()));
    }
    let output_dir = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));
    Ok(CliArgs { input, output_dir })
}

fn init_tracing() -> ReloadHandle {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let (filter_layer, handle) = reload::Layer::new(env_filter);
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_filter(filter_layer),
        )
        .init();
    handle
}

fn set_log_level(handle: &ReloadHandle, level: &str) {
    if env::var_os("RUST_LOG").is_some() {
        info!("RUST_LOG is set; ignoring configured log level");
        return;
    }
    let parsed = EnvFilter::builder()
        .parse(level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    if let Err(err) = handle.modify(|filter| *filter = parsed) {
        warn!(%level, "Failed to update log level from config: {err}");
    } else {
        info!(%level, "Applied log level from config");
    }
}
