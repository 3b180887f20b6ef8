pub(crate) fn default_blank_min_chars() -> usize {
    ebup_dedup::DEFAULT_BLANK_MIN_CHARS
}

pub(crate) fn default_similarity_threshold() -> f64 {
    ebup_dedup::DEFAULT_SIMILARITY_THRESHOLD
}

pub(crate) fn default_length_prefilter() -> bool {
    true
}

pub(crate) fn default_language() -> String {
    "en".to_string()
}

pub(crate) fn default_publisher() -> String {
    "Self-published".to_string()
}

pub(crate) fn default_unknown_author() -> String {
    "Unknown".to_string()
}

pub(crate) fn default_untitled() -> String {
    "Untitled".to_string()
}

pub(crate) fn default_epub_filename() -> String {
    "cleaned-book.epub".to_string()
}

pub(crate) fn default_report_filename() -> String {
    "normalization-report.txt".to_string()
}

pub(crate) fn default_report_json_filename() -> String {
    "normalization-report.json".to_string()
}

pub(crate) fn default_log_level() -> crate::config::LogLevel {
    crate::config::LogLevel::Info
}
