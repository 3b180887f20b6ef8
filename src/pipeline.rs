//! End-to-end normalization job: extract, deduplicate, clean, write.

use crate::config::{AppConfig, SimilarityMeasure};
use crate::engine::{Chapter, Engine, OutputBook, SourceMetadata};
use crate::epub_loader::document_title;
use crate::epub_writer::chapter_file_name;
use crate::markup::normalize_markup;
use crate::metadata::{file_stem_title, resolve_metadata};
use crate::report::{NormalizationReport, ProcessingLog};
use crate::synthesize::synthesize_markup;
use anyhow::{Context, Result, bail};
use chrono::Local;
use ebup_dedup::{
    ContentUnit, DedupOutcome, Deduplicator, IndelRatio, LengthPrefilter, LevenshteinRatio,
    SimilarityScorer, Verdict,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Pdf,
    Epub,
}

impl SourceFormat {
    /// Recognize the input by extension, case-insensitively.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "pdf" => Ok(SourceFormat::Pdf),
            "epub" => Ok(SourceFormat::Epub),
            _ => bail!("Unsupported file format: .{ext}"),
        }
    }
}

pub struct Pipeline<E: Engine> {
    cfg: AppConfig,
    engine: E,
}

pub struct JobOutput {
    pub output_path: PathBuf,
    pub report_path: PathBuf,
    pub report: NormalizationReport,
}

impl<E: Engine> Pipeline<E> {
    pub fn new(cfg: &AppConfig, engine: E) -> Self {
        Self {
            cfg: cfg.clone(),
            engine,
        }
    }

    pub fn run(&self, input: &Path, output_dir: &Path) -> Result<JobOutput> {
        let started = Instant::now();
        let mut log = ProcessingLog::default();
        log.record(format!("Starting normalization of: {}", input.display()));

        let format = SourceFormat::from_path(input)?;
        let units = match format {
            SourceFormat::Pdf => self.pdf_units(input, &mut log)?,
            SourceFormat::Epub => self.epub_units(input, &mut log)?,
        };

        let outcome = self.deduplicator().deduplicate(units);
        log_removals(&outcome, &mut log);
        log.record(format!("Kept {} unique chapters", outcome.survivors.len()));

        let DedupOutcome {
            survivors,
            events,
            blanks_removed,
            duplicates_removed,
        } = outcome;

        let chapters: Vec<Chapter> = survivors
            .into_iter()
            .enumerate()
            .map(|(position, unit)| {
                let (title, body, _) = unit.map_markup(normalize_markup).into_parts();
                Chapter {
                    title,
                    file_name: chapter_file_name(position),
                    body,
                }
            })
            .collect();

        let metadata = resolve_metadata(
            self.source_metadata(input, format, &mut log),
            &self.fallback_title(input, format),
            &self.cfg.metadata,
        );
        log.record(format!(
            "Metadata: {} by {}",
            metadata.title, metadata.author
        ));

        fs::create_dir_all(output_dir).with_context(|| {
            format!("Failed to create output directory {}", output_dir.display())
        })?;
        let output_path = output_dir.join(&self.cfg.output.epub_filename);
        let chapters_kept = chapters.len();
        let book = OutputBook { metadata, chapters };
        self.engine.write_container(&book, &output_path)?;
        log.record(format!("Created EPUB: {}", output_path.display()));

        let report = NormalizationReport {
            input: input.to_path_buf(),
            output: output_path.clone(),
            generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            blanks_removed,
            duplicates_removed,
            chapters_kept,
            log: log.into_lines(),
            events,
        };

        let report_path = output_dir.join(&self.cfg.output.report_filename);
        fs::write(&report_path, report.render_text())
            .with_context(|| format!("Failed to write report {}", report_path.display()))?;

        if self.cfg.output.write_report_json {
            let json_path = output_dir.join(&self.cfg.output.report_json_filename);
            let json = serde_json::to_string_pretty(&report).context("Failed to encode report")?;
            fs::write(&json_path, json)
                .with_context(|| format!("Failed to write report {}", json_path.display()))?;
            debug!(path = %json_path.display(), "Wrote JSON report");
        }

        info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            chapters = chapters_kept,
            removed = report.total_removed(),
            "Normalization finished"
        );

        Ok(JobOutput {
            output_path,
            report_path,
            report,
        })
    }

    fn pdf_units(&self, input: &Path, log: &mut ProcessingLog) -> Result<Vec<ContentUnit>> {
        log.record(format!("Converting PDF: {}", input.display()));
        let pages = self.engine.extract_pages(input)?;
        let units: Vec<ContentUnit> = pages
            .into_iter()
            .map(|page| {
                let markup = synthesize_markup(&page.runs, &page.plain_text);
                ContentUnit::new(format!("Page {}", page.index + 1), markup, page.plain_text)
            })
            .collect();
        log.record(format!("Extracted {} pages from PDF", units.len()));
        Ok(units)
    }

    fn epub_units(&self, input: &Path, log: &mut ProcessingLog) -> Result<Vec<ContentUnit>> {
        log.record(format!("Reading EPUB: {}", input.display()));
        let documents = self.engine.read_documents(input)?;
        let units: Vec<ContentUnit> = documents
            .into_iter()
            .map(|doc| {
                let title = document_title(&doc.markup).unwrap_or(doc.id);
                ContentUnit::from_markup(title, doc.markup)
            })
            .collect();
        log.record(format!("Extracted {} chapters from EPUB", units.len()));
        Ok(units)
    }

    fn deduplicator(&self) -> Deduplicator<Box<dyn SimilarityScorer>> {
        let settings = &self.cfg.dedup;
        let floor = settings.similarity_threshold;
        let scorer: Box<dyn SimilarityScorer> = match (settings.measure, settings.length_prefilter)
        {
            (SimilarityMeasure::Indel, true) => Box::new(LengthPrefilter::new(IndelRatio, floor)),
            (SimilarityMeasure::Indel, false) => Box::new(IndelRatio),
            (SimilarityMeasure::Levenshtein, true) => {
                Box::new(LengthPrefilter::new(LevenshteinRatio, floor))
            }
            (SimilarityMeasure::Levenshtein, false) => Box::new(LevenshteinRatio),
        };
        debug!(
            measure = ?settings.measure,
            prefilter = settings.length_prefilter,
            "Similarity scorer"
        );
        Deduplicator::with_scorer(settings.to_dedup_config(), scorer)
    }

    /// Metadata failures never abort the run; the caller falls back to
    /// file-derived values.
    fn source_metadata(
        &self,
        input: &Path,
        format: SourceFormat,
        log: &mut ProcessingLog,
    ) -> SourceMetadata {
        let result = match format {
            SourceFormat::Pdf => self.engine.read_pdf_metadata(input),
            SourceFormat::Epub => self.engine.read_epub_metadata(input),
        };
        match result {
            Ok(meta) => meta,
            Err(err) => {
                log.record(format!("Could not extract metadata: {err:#}"));
                SourceMetadata {
                    title: Some(file_stem_title(input)),
                    ..SourceMetadata::default()
                }
            }
        }
    }

    /// Title used when the source carries none.
    fn fallback_title(&self, input: &Path, format: SourceFormat) -> String {
        match format {
            SourceFormat::Pdf => file_stem_title(input),
            SourceFormat::Epub => self.cfg.metadata.untitled.clone(),
        }
    }
}

fn log_removals(outcome: &DedupOutcome, log: &mut ProcessingLog) {
    for event in &outcome.events {
        match &event.verdict {
            Verdict::ExactDuplicate { .. } => {
                log.record(format!("Removed duplicate (hash): {}", event.title));
            }
            Verdict::FuzzyDuplicate { score, .. } => {
                debug!(title = %event.title, score, "Fuzzy match");
                log.record(format!("Removed duplicate (similarity): {}", event.title));
            }
            Verdict::Blank => {
                log.record(format!("Removed blank page: {}", event.title));
            }
            Verdict::Kept => {}
        }
    }
}
