//! Configuration loading for the normalizer.
//!
//! All user-tunable settings are centralized here and loaded from
//! `conf/config.toml` if present. Any missing or invalid entries fall back to
//! defaults so a run can always proceed.

mod defaults;
mod io;
mod models;

pub use io::{DEFAULT_CONFIG_PATH, load_config};
pub use models::{AppConfig, LogLevel, MetadataConfig, SimilarityMeasure};
