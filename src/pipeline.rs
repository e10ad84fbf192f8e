//! Preprocessing pipeline: pure stage functions over immutable batches, and the
//! `Preprocessor` orchestrator that loads, runs the stages, and saves.
//!
//! Stage order: normalize → require title → clean → length filter → derive features
//! → word-count filter → score filter → dedup by id → dedup by full text.

use crate::clean::{clean_post, CleanedText};
use crate::config::{PipelineOptions, QualityThresholds};
use crate::dedupe::{dedup_by_full_text, dedup_by_id};
use crate::error::{LoadError, SaveError};
use crate::features::derive_features;
use crate::filters::{enough_words, has_title, long_enough, score_ok};
use crate::normalize::normalize_post;
use crate::record::{CleanedPost, RawPost, Tabular};
use crate::summary::{render_summary, retention_pct};
use crate::tabular::{load_raw, save_records, save_text};
use crate::util::init_tracing_once;
use std::path::{Path, PathBuf};

// ----------------------------- Stages -------------------------------------

pub fn normalize_stage(raw: &[RawPost]) -> Vec<RawPost> {
    raw.iter().map(normalize_post).collect()
}

pub fn title_stage(posts: &[RawPost]) -> Vec<RawPost> {
    posts.iter().filter(|p| has_title(p)).cloned().collect()
}

pub fn clean_stage(posts: &[RawPost]) -> Vec<CleanedText> {
    posts.iter().map(clean_post).collect()
}

pub fn length_stage(items: &[CleanedText], t: &QualityThresholds) -> Vec<CleanedText> {
    items.iter().filter(|it| long_enough(it, t)).cloned().collect()
}

pub fn feature_stage(items: &[CleanedText], unknown_author: &str) -> Vec<CleanedPost> {
    items.iter().cloned().map(|it| derive_features(it, unknown_author)).collect()
}

pub fn word_count_stage(posts: &[CleanedPost], t: &QualityThresholds) -> Vec<CleanedPost> {
    posts.iter().filter(|p| enough_words(p, t)).cloned().collect()
}

pub fn score_stage(posts: &[CleanedPost], t: &QualityThresholds) -> Vec<CleanedPost> {
    posts.iter().filter(|p| score_ok(p, t)).cloned().collect()
}

/// How many records each stage removed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StageCounts {
    pub input: usize,
    pub missing_title: usize,
    pub too_short: usize,
    pub too_few_words: usize,
    pub low_score: usize,
    pub duplicate_id: usize,
    pub duplicate_text: usize,
    pub output: usize,
}

/// Result of a preprocessing pass.
#[derive(Clone, Debug, PartialEq)]
pub struct CleanedBatch {
    pub posts: Vec<CleanedPost>,
    pub counts: StageCounts,
}

impl CleanedBatch {
    pub fn original_count(&self) -> usize {
        self.counts.input
    }
    pub fn cleaned_count(&self) -> usize {
        self.posts.len()
    }
    pub fn retention_pct(&self) -> f64 {
        retention_pct(self.counts.input, self.posts.len())
    }
    pub fn summary(&self, brand: Option<&str>) -> String {
        render_summary(brand, &self.counts, CleanedPost::COLUMNS)
    }
}

/// Run every stage over `raw`. Pure: no I/O, input untouched.
pub fn preprocess(raw: &[RawPost], opts: &PipelineOptions) -> CleanedBatch {
    let t = &opts.thresholds;
    let mut counts = StageCounts { input: raw.len(), ..Default::default() };

    tracing::info!("Cleaning text fields...");
    let normalized = normalize_stage(raw);
    let titled = title_stage(&normalized);
    counts.missing_title = normalized.len() - titled.len();

    let cleaned = clean_stage(&titled);
    let long = length_stage(&cleaned, t);
    counts.too_short = cleaned.len() - long.len();

    tracing::info!("Adding derived features...");
    let featured = feature_stage(&long, &opts.unknown_author);

    tracing::info!("Filtering quality content...");
    let worded = word_count_stage(&featured, t);
    counts.too_few_words = featured.len() - worded.len();
    let scored = score_stage(&worded, t);
    counts.low_score = worded.len() - scored.len();

    tracing::info!("Removing duplicates...");
    let unique_ids = dedup_by_id(&scored);
    counts.duplicate_id = scored.len() - unique_ids.len();
    let unique = dedup_by_full_text(&unique_ids);
    counts.duplicate_text = unique_ids.len() - unique.len();
    tracing::info!("Removed {} duplicate posts", counts.duplicate_id + counts.duplicate_text);

    counts.output = unique.len();
    tracing::info!(
        input = counts.input,
        output = counts.output,
        "Preprocessing completed: {} clean posts",
        counts.output
    );
    CleanedBatch { posts: unique, counts }
}

// ----------------------------- Orchestrator -------------------------------

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SavedPaths {
    pub output: PathBuf,
    pub summary: PathBuf,
}

/// Terminal state of `Preprocessor::run`. None of these is fatal; the caller decides
/// whether to continue with later stages.
#[derive(Debug)]
pub enum RunOutcome {
    LoadFailed(LoadError),
    SaveFailed { batch: CleanedBatch, error: SaveError },
    Saved { batch: CleanedBatch, paths: SavedPaths },
}

impl RunOutcome {
    pub fn batch(&self) -> Option<&CleanedBatch> {
        match self {
            RunOutcome::LoadFailed(_) => None,
            RunOutcome::SaveFailed { batch, .. } | RunOutcome::Saved { batch, .. } => Some(batch),
        }
    }
    pub fn is_saved(&self) -> bool {
        matches!(self, RunOutcome::Saved { .. })
    }
}

#[derive(Clone, Debug, Default)]
pub struct Preprocessor {
    pub(crate) opts: PipelineOptions,
}

impl Preprocessor {
    pub fn new() -> Self {
        Self { opts: PipelineOptions::default() }
    }
    pub fn with_options(opts: PipelineOptions) -> Self {
        Self { opts }
    }

    // -------- Builder methods --------
    pub fn input(mut self, path: impl AsRef<Path>) -> Self { self.opts = self.opts.with_input(path); self }
    pub fn output(mut self, path: impl AsRef<Path>) -> Self { self.opts = self.opts.with_output(path); self }
    pub fn summary(mut self, path: impl AsRef<Path>) -> Self { self.opts = self.opts.with_summary(path); self }
    pub fn brand(mut self, brand: impl AsRef<str>) -> Self { self.opts = self.opts.with_brand(brand); self }
    pub fn thresholds(mut self, t: QualityThresholds) -> Self { self.opts = self.opts.with_thresholds(t); self }
    pub fn min_text_len(mut self, n: usize) -> Self { self.opts = self.opts.with_min_text_len(n); self }
    pub fn min_word_count(mut self, n: usize) -> Self { self.opts = self.opts.with_min_word_count(n); self }
    pub fn min_score(mut self, score: i64) -> Self { self.opts = self.opts.with_min_score(score); self }
    pub fn unknown_author(mut self, placeholder: impl Into<String>) -> Self { self.opts = self.opts.with_unknown_author(placeholder); self }
    pub fn write_buffer(mut self, bytes: usize) -> Self { self.opts = self.opts.with_write_buffer(bytes); self }

    pub fn options(&self) -> &PipelineOptions {
        &self.opts
    }

    pub fn load(&self) -> Result<Vec<RawPost>, LoadError> {
        let posts = load_raw(&self.opts.input)?;
        tracing::info!("Loaded {} posts from {}", posts.len(), self.opts.input.display());
        Ok(posts)
    }

    pub fn preprocess(&self, raw: &[RawPost]) -> CleanedBatch {
        preprocess(raw, &self.opts)
    }

    /// Write the cleaned batch, then the summary. Each file is all-or-nothing.
    pub fn save(&self, batch: &CleanedBatch) -> Result<SavedPaths, SaveError> {
        let output = self.opts.output.clone();
        let summary = self.opts.summary_path();
        save_records(&output, &batch.posts, self.opts.write_buffer_bytes)?;
        tracing::info!("Cleaned data saved to {}", output.display());
        save_text(&summary, &batch.summary(self.opts.brand.as_deref()))?;
        tracing::info!("Summary saved to {}", summary.display());
        Ok(SavedPaths { output, summary })
    }

    /// Load → preprocess → save. Load and save failures are logged and reported,
    /// never propagated as panics or hard errors.
    pub fn run(&self) -> RunOutcome {
        init_tracing_once();
        let raw = match self.load() {
            Ok(raw) => raw,
            Err(e) => {
                tracing::error!(error = %e, "Error loading data; nothing to preprocess");
                return RunOutcome::LoadFailed(e);
            }
        };
        let batch = self.preprocess(&raw);
        match self.save(&batch) {
            Ok(paths) => RunOutcome::Saved { batch, paths },
            Err(error) => {
                tracing::error!(error = %error, "Error saving data");
                RunOutcome::SaveFailed { batch, error }
            }
        }
    }
}
