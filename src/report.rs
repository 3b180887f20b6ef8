//! Processing log and the human-readable run report.

use ebup_dedup::DedupEvent;
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

const RULE_WIDTH: usize = 60;

/// Ordered, human-readable record of what a run did. Every line is also
/// emitted through `tracing`.
#[derive(Debug, Clone, Default)]
pub struct ProcessingLog {
    lines: Vec<String>,
}

impl ProcessingLog {
    pub fn record(&mut self, message: impl Into<String>) {
        let message = message.into();
        info!("{message}");
        self.lines.push(message);
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NormalizationReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub generated_at: String,
    pub blanks_removed: usize,
    pub duplicates_removed: usize,
    pub chapters_kept: usize,
    pub log: Vec<String>,
    pub events: Vec<DedupEvent>,
}

impl NormalizationReport {
    pub fn total_removed(&self) -> usize {
        self.blanks_removed + self.duplicates_removed
    }

    pub fn render_text(&self) -> String {
        let rule = "=".repeat(RULE_WIDTH);
        let epub_name = self
            .output
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.output.display().to_string());

        let mut out = String::new();
        out.push('\n');
        out.push_str(&format!("{rule}\nEPUB NORMALIZATION REPORT\n{rule}\n"));
        out.push_str(&format!("Input File: {}\n", self.input.display()));
        out.push_str(&format!("Output File: {}\n", self.output.display()));
        out.push_str(&format!("Date: {}\n\n", self.generated_at));

        out.push_str("STATISTICS:\n");
        out.push_str(&format!("- Blank pages removed: {}\n", self.blanks_removed));
        out.push_str(&format!(
            "- Duplicate pages removed: {}\n",
            self.duplicates_removed
        ));
        out.push_str(&format!("- Total pages removed: {}\n\n", self.total_removed()));

        out.push_str("PROCESSING LOG:\n");
        for line in &self.log {
            out.push_str(&format!("  {line}\n"));
        }

        out.push_str(&format!("\n{rule}\n"));
        out.push_str(&format!(
            "VALIDATION: Run 'epubcheck {epub_name}' to validate\n"
        ));
        out.push_str(&format!("{rule}\n"));
        out
    }
}
