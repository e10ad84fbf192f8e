use std::path::{Path, PathBuf};
use std::time::Duration;

/// Quality thresholds applied after cleaning.
/// - `min_text_len`: full text must be strictly longer than this (chars)
/// - `min_word_count`: at least this many whitespace tokens
/// - `min_score`: score (missing → 0) must be at least this
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QualityThresholds {
    pub min_text_len: usize,
    pub min_word_count: usize,
    pub min_score: i64,
}

impl Default for QualityThresholds {
    fn default() -> Self {
        Self { min_text_len: 10, min_word_count: 3, min_score: -50 }
    }
}

/// Preprocessing options with sensible defaults and builder chaining.
#[derive(Clone, Debug)]
pub struct PipelineOptions {
    pub input: PathBuf,
    pub output: PathBuf,
    pub summary: Option<PathBuf>,     // None → `<output stem>_summary.txt`
    pub brand: Option<String>,        // only used in the summary header
    pub thresholds: QualityThresholds,
    pub unknown_author: String,       // placeholder for missing authors
    pub write_buffer_bytes: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            input: PathBuf::from("reddit_posts.csv"),
            output: PathBuf::from("reddit_posts_cleaned.csv"),
            summary: None,
            brand: None,
            thresholds: QualityThresholds::default(),
            unknown_author: "[unknown]".to_string(),
            write_buffer_bytes: 256 * 1024,
        }
    }
}

impl PipelineOptions {
    pub fn with_input(mut self, path: impl AsRef<Path>) -> Self {
        self.input = path.as_ref().to_path_buf();
        self
    }
    pub fn with_output(mut self, path: impl AsRef<Path>) -> Self {
        self.output = path.as_ref().to_path_buf();
        self
    }
    pub fn with_summary(mut self, path: impl AsRef<Path>) -> Self {
        self.summary = Some(path.as_ref().to_path_buf());
        self
    }
    pub fn with_brand(mut self, brand: impl AsRef<str>) -> Self {
        let b = brand.as_ref().trim();
        self.brand = if b.is_empty() { None } else { Some(b.to_string()) };
        self
    }
    pub fn with_thresholds(mut self, thresholds: QualityThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }
    pub fn with_min_text_len(mut self, n: usize) -> Self {
        self.thresholds.min_text_len = n;
        self
    }
    pub fn with_min_word_count(mut self, n: usize) -> Self {
        self.thresholds.min_word_count = n;
        self
    }
    pub fn with_min_score(mut self, score: i64) -> Self {
        self.thresholds.min_score = score;
        self
    }
    pub fn with_unknown_author(mut self, placeholder: impl Into<String>) -> Self {
        self.unknown_author = placeholder.into();
        self
    }
    pub fn with_write_buffer(mut self, bytes: usize) -> Self {
        self.write_buffer_bytes = bytes.max(8 * 1024);
        self
    }

    /// Summary destination: explicit path, else `<output stem>_summary.txt` beside the output.
    pub fn summary_path(&self) -> PathBuf {
        if let Some(p) = &self.summary {
            return p.clone();
        }
        let name = self.output.file_name().and_then(|s| s.to_str()).unwrap_or("cleaned");
        // strip compound extensions like `.jsonl.zst` too
        let stem = name.split('.').next().filter(|s| !s.is_empty()).unwrap_or("cleaned");
        self.output.with_file_name(format!("{stem}_summary.txt"))
    }
}

/// Collection options (search keywords × subreddits).
#[derive(Clone, Debug)]
pub struct CollectOptions {
    pub brand: String,
    pub keywords: Vec<String>,
    pub subreddits: Vec<String>,      // normalized, no "r/"
    pub max_posts: usize,             // split evenly across keywords
    pub sort: String,
    pub time_filter: String,
    pub page_size: usize,             // listing page size, capped at 100 by the API
    pub page_delay: Duration,         // fixed pause between page requests
    pub user_agent: String,
    pub base_url: String,
    pub timeout: Duration,
    pub progress: bool,
}

/// Keyword set used when none is configured.
pub fn default_keywords() -> Vec<String> {
    [
        "Nike", "nike", "Air Jordan", "air jordan",
        "Nike Air Max", "nike air max", "Just Do It",
        "Nike Dunk", "nike dunk", "swoosh", "Nike shoes",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Default for CollectOptions {
    fn default() -> Self {
        Self {
            brand: "Nike".to_string(),
            keywords: default_keywords(),
            subreddits: vec!["all".to_string()],
            max_posts: 1000,
            sort: "relevance".to_string(),
            time_filter: "month".to_string(),
            page_size: 100,
            page_delay: Duration::from_millis(1000),
            user_agent: format!("rsent/{} (brand sentiment research)", env!("CARGO_PKG_VERSION")),
            base_url: "https://www.reddit.com".to_string(),
            timeout: Duration::from_secs(30),
            progress: true,
        }
    }
}

impl CollectOptions {
    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = brand.into();
        self
    }
    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let v: Vec<String> = keywords
            .into_iter()
            .map(|k| -> String { k.into() })
            .filter(|k| !k.trim().is_empty())
            .collect();
        if !v.is_empty() {
            self.keywords = v;
        }
        self
    }
    pub fn with_subreddits<I, S>(mut self, subs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let v: Vec<String> = subs.into_iter().map(|s| normalize_subreddit(s.as_ref())).filter(|s| !s.is_empty()).collect();
        if !v.is_empty() {
            self.subreddits = v;
        }
        self
    }
    pub fn with_max_posts(mut self, n: usize) -> Self {
        self.max_posts = n;
        self
    }
    pub fn with_sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = sort.into();
        self
    }
    pub fn with_time_filter(mut self, t: impl Into<String>) -> Self {
        self.time_filter = t.into();
        self
    }
    pub fn with_page_size(mut self, n: usize) -> Self {
        self.page_size = n.clamp(1, 100);
        self
    }
    pub fn with_page_delay(mut self, delay: Duration) -> Self {
        self.page_delay = delay;
        self
    }
    pub fn with_user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = ua.into();
        self
    }
    pub fn with_base_url(mut self, url: impl AsRef<str>) -> Self {
        self.base_url = url.as_ref().trim_end_matches('/').to_string();
        self
    }
    pub fn with_progress(mut self, yes: bool) -> Self {
        self.progress = yes;
        self
    }

    /// Posts requested per keyword and subreddit.
    pub fn per_keyword_limit(&self) -> usize {
        if self.keywords.is_empty() { 0 } else { self.max_posts / self.keywords.len() }
    }
}

/// Relational store location.
#[derive(Clone, Debug)]
pub struct StoreOptions {
    pub db_path: PathBuf,
    pub table: String,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self { db_path: PathBuf::from("reddit_posts.db"), table: "posts".to_string() }
    }
}

impl StoreOptions {
    pub fn with_db_path(mut self, path: impl AsRef<Path>) -> Self {
        self.db_path = path.as_ref().to_path_buf();
        self
    }
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }
}

#[inline]
pub fn normalize_subreddit(s: &str) -> String {
    let s = s.trim().to_lowercase();
    if let Some(rest) = s.strip_prefix("r/") { rest.to_string() } else { s }
}
