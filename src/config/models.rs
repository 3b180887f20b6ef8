use ebup_dedup::DedupConfig;
use serde::Deserialize;

/// High-level configuration; deserializable from TOML.
#[derive(Debug, Clone, Default, Deserialize, serde::Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub dedup: DedupSettings,
    #[serde(default)]
    pub metadata: MetadataConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Heuristic thresholds for the deduplication pass.
#[derive(Debug, Clone, Deserialize, serde::Serialize)]
pub struct DedupSettings {
    #[serde(default = "crate::config::defaults::default_blank_min_chars")]
    pub blank_min_chars: usize,
    #[serde(default = "crate::config::defaults::default_similarity_threshold")]
    pub similarity_threshold: f64,
    #[serde(default)]
    pub measure: SimilarityMeasure,
    /// Skip the edit-distance computation when lengths alone rule out a match.
    #[serde(default = "crate::config::defaults::default_length_prefilter")]
    pub length_prefilter: bool,
}

impl Default for DedupSettings {
    fn default() -> Self {
        DedupSettings {
            blank_min_chars: crate::config::defaults::default_blank_min_chars(),
            similarity_threshold: crate::config::defaults::default_similarity_threshold(),
            measure: SimilarityMeasure::default(),
            length_prefilter: crate::config::defaults::default_length_prefilter(),
        }
    }
}

impl DedupSettings {
    pub fn to_dedup_config(&self) -> DedupConfig {
        DedupConfig {
            blank_min_chars: self.blank_min_chars,
            similarity_threshold: self.similarity_threshold,
        }
    }
}

/// Edit-distance ratio used for near-duplicate detection.
#[derive(Debug, Clone, Copy, Default, Deserialize, serde::Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SimilarityMeasure {
    /// Insertions and deletions only, over the combined length.
    #[default]
    Indel,
    /// Levenshtein distance over the longer length.
    Levenshtein,
}

/// Fallbacks used when the source does not carry a field.
#[derive(Debug, Clone, Deserialize, serde::Serialize)]
pub struct MetadataConfig {
    #[serde(default = "crate::config::defaults::default_language")]
    pub language: String,
    #[serde(default = "crate::config::defaults::default_publisher")]
    pub publisher: String,
    #[serde(default = "crate::config::defaults::default_unknown_author")]
    pub unknown_author: String,
    #[serde(default = "crate::config::defaults::default_untitled")]
    pub untitled: String,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        MetadataConfig {
            language: crate::config::defaults::default_language(),
            publisher: crate::config::defaults::default_publisher(),
            unknown_author: crate::config::defaults::default_unknown_author(),
            untitled: crate::config::defaults::default_untitled(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
pub struct OutputConfig {
    #[serde(default = "crate::config::defaults::default_epub_filename")]
    pub epub_filename: String,
    #[serde(default = "crate::config::defaults::default_report_filename")]
    pub report_filename: String,
    #[serde(default)]
    pub write_report_json: bool,
    #[serde(default = "crate::config::defaults::default_report_json_filename")]
    pub report_json_filename: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            epub_filename: crate::config::defaults::default_epub_filename(),
            report_filename: crate::config::defaults::default_report_filename(),
            write_report_json: false,
            report_json_filename: crate::config::defaults::default_report_json_filename(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
pub struct LoggingConfig {
    #[serde(default = "crate::config::defaults::default_log_level")]
    pub log_level: LogLevel,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            log_level: crate::config::defaults::default_log_level(),
        }
    }
}

/// Supported logging verbosity levels.
#[derive(Debug, Clone, Copy, Deserialize, serde::Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel::Info
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_filter_str())
    }
}

impl LogLevel {
    pub fn as_filter_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}
