mod config;
mod error;
mod record;

mod normalize;
mod clean;
mod date;
mod features;
mod filters;
mod dedupe;
mod summary;
mod pipeline;

mod ndjson;
mod tabular;
mod progress;
mod util;

mod collect;
mod sentiment;
mod store;
mod viz;

pub use crate::config::{
    default_keywords, normalize_subreddit, CollectOptions, PipelineOptions, QualityThresholds, StoreOptions,
};
pub use crate::error::{CollectError, LoadError, SaveError, StoreError};
pub use crate::record::{CleanedPost, RawPost, Tabular};
pub use crate::pipeline::{preprocess, CleanedBatch, Preprocessor, RunOutcome, SavedPaths, StageCounts};

// expose the individual cleaning stages for callers that run them piecemeal
pub use crate::normalize::{normalize_post, normalize_value, to_ascii};
pub use crate::clean::{clean_post, clean_text, join_full_text, CleanedText};
pub use crate::date::{calendar_for, format_utc, Calendar};
pub use crate::features::{engagement_score, text_length, word_count};
pub use crate::dedupe::{dedup_by_full_text, dedup_by_id};
pub use crate::pipeline::{
    clean_stage, feature_stage, length_stage, normalize_stage, score_stage, title_stage, word_count_stage,
};
pub use crate::summary::{render_summary, retention_pct};

// collaborators around the cleaning core
pub use crate::collect::{parse_listing, CollectReport, CollectionStats, Collector, RedditSearchClient, SearchClient};
pub use crate::sentiment::{LexiconScorer, SentimentLabel, SentimentScorer, SentimentScores};
pub use crate::store::{score_and_store, ScoredPost, SentimentSink, SqliteStore, UpdateTally, SENTIMENT_COLUMNS};
pub use crate::viz::{
    label_distribution, render_charts, sentiment_trend, term_frequencies, LabelCount, TermFrequency, TrendPoint,
    DISTRIBUTION_FILE, NEGATIVE_CLOUD_FILE, POSITIVE_CLOUD_FILE, TREND_FILE,
};

// file helpers, so binaries can import from crate root
pub use crate::tabular::{load_raw, load_records, save_records, save_text, TableFormat};
pub use crate::util::{init_tracing_once, inprogress_path};
