//! SQLite-backed post store: cleaned rows keyed by id, plus five sentiment columns
//! added on demand. The connection lives exactly as long as the `SqliteStore` value.

use crate::config::StoreOptions;
use crate::error::StoreError;
use crate::progress::maybe_count_progress;
use crate::record::{CleanedPost, Tabular};
use crate::sentiment::{SentimentLabel, SentimentScorer, SentimentScores};
use rusqlite::{params, Connection, OptionalExtension};

pub const SENTIMENT_COLUMNS: &[(&str, &str)] = &[
    ("sentiment_neg", "REAL"),
    ("sentiment_neu", "REAL"),
    ("sentiment_pos", "REAL"),
    ("sentiment_compound", "REAL"),
    ("sentiment_label", "TEXT"),
];

/// Success/failure count for a row-by-row write.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UpdateTally {
    pub succeeded: usize,
    pub failed: usize,
}

impl UpdateTally {
    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }
}

/// Destination for per-record sentiment results.
pub trait SentimentSink {
    /// Create the sentiment columns if they are missing. Idempotent.
    fn ensure_sentiment_columns(&mut self) -> Result<(), StoreError>;
    fn upsert_sentiment(&mut self, id: &str, scores: &SentimentScores, label: SentimentLabel) -> Result<(), StoreError>;
}

/// A row read back for chart rendering.
#[derive(Clone, Debug, PartialEq)]
pub struct ScoredPost {
    pub id: String,
    pub date_only: Option<String>,
    pub label: SentimentLabel,
    pub compound: f64,
    pub text: String,
}

pub struct SqliteStore {
    conn: Connection,
    table: String,
}

impl SqliteStore {
    pub fn open(opts: &StoreOptions) -> Result<Self, StoreError> {
        validate_table(&opts.table)?;
        if let Some(parent) = opts.db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            // surfaced as a sqlite open error below if this fails
            let _ = std::fs::create_dir_all(parent);
        }
        let conn = Connection::open(&opts.db_path)?;
        tracing::debug!(db = %opts.db_path.display(), table = %opts.table, "Opened store");
        Self::with_connection(conn, &opts.table)
    }

    pub fn open_in_memory(table: &str) -> Result<Self, StoreError> {
        validate_table(table)?;
        Self::with_connection(Connection::open_in_memory()?, table)
    }

    fn with_connection(conn: Connection, table: &str) -> Result<Self, StoreError> {
        let cols: Vec<String> = CleanedPost::COLUMNS
            .iter()
            .map(|c| match *c {
                "id" => "id TEXT PRIMARY KEY".to_string(),
                other => format!("{other} {}", column_type(other)),
            })
            .collect();
        conn.execute_batch(&format!("CREATE TABLE IF NOT EXISTS {table} ({});", cols.join(", ")))?;
        Ok(Self { conn, table: table.to_string() })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn count(&self) -> Result<usize, StoreError> {
        let n: i64 = self.conn.query_row(&format!("SELECT COUNT(*) FROM {}", self.table), [], |r| r.get(0))?;
        Ok(n.max(0) as usize)
    }

    /// Insert or replace cleaned rows by id. Rows fail individually; the tally says how many.
    pub fn upsert_posts(&mut self, posts: &[CleanedPost]) -> Result<UpdateTally, StoreError> {
        let cols = CleanedPost::COLUMNS;
        let placeholders: Vec<String> = (1..=cols.len()).map(|i| format!("?{i}")).collect();
        let updates: Vec<String> = cols.iter().filter(|c| **c != "id").map(|c| format!("{c} = excluded.{c}")).collect();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({}) ON CONFLICT(id) DO UPDATE SET {}",
            self.table,
            cols.join(", "),
            placeholders.join(", "),
            updates.join(", ")
        );

        let mut tally = UpdateTally::default();
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(&sql)?;
            for p in posts {
                let res = stmt.execute(params![
                    p.id, p.title, p.selftext, p.author, p.created_utc, p.created_date, p.score,
                    p.upvote_ratio, p.num_comments, p.subreddit, p.url, p.permalink, p.search_keyword,
                    p.full_text, p.title_cleaned, p.selftext_cleaned, p.full_text_cleaned,
                    p.text_length as i64, p.word_count as i64, p.engagement_score, p.date_only,
                    p.hour.map(i64::from), p.day_of_week,
                ]);
                match res {
                    Ok(_) => tally.succeeded += 1,
                    Err(e) => {
                        tracing::warn!(id = %p.id, error = %e, "Failed to store post");
                        tally.failed += 1;
                    }
                }
            }
        }
        tx.commit()?;
        tracing::info!(stored = tally.succeeded, failed = tally.failed, table = %self.table, "Stored cleaned posts");
        Ok(tally)
    }

    /// `(id, full_text_cleaned)` for every row; NULL text reads as "".
    pub fn fetch_texts(&self) -> Result<Vec<(String, String)>, StoreError> {
        let mut stmt = self.conn.prepare(&format!("SELECT id, full_text_cleaned FROM {}", self.table))?;
        let rows = stmt
            .query_map([], |r| Ok((r.get::<_, String>(0)?, r.get::<_, Option<String>>(1)?.unwrap_or_default())))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Rows that carry a sentiment label, ordered by date then id.
    pub fn fetch_scored(&self) -> Result<Vec<ScoredPost>, StoreError> {
        if !self.has_column("sentiment_label")? {
            return Ok(Vec::new());
        }
        let mut stmt = self.conn.prepare(&format!(
            "SELECT id, date_only, sentiment_label, sentiment_compound, full_text_cleaned \
             FROM {} WHERE sentiment_label IS NOT NULL ORDER BY date_only, id",
            self.table
        ))?;
        let raw = stmt
            .query_map([], |r| {
                Ok((
                    r.get::<_, String>(0)?,
                    r.get::<_, Option<String>>(1)?,
                    r.get::<_, String>(2)?,
                    r.get::<_, Option<f64>>(3)?,
                    r.get::<_, Option<String>>(4)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(raw
            .into_iter()
            .filter_map(|(id, date_only, label, compound, text)| {
                let Some(label) = SentimentLabel::parse(&label) else {
                    tracing::warn!(id = %id, label = %label, "Skipping row with unknown sentiment label");
                    return None;
                };
                Some(ScoredPost { id, date_only, label, compound: compound.unwrap_or(0.0), text: text.unwrap_or_default() })
            })
            .collect())
    }

    /// Sentiment values stored for one id, if the row exists and has been scored.
    pub fn sentiment_for(&self, id: &str) -> Result<Option<(SentimentScores, SentimentLabel)>, StoreError> {
        if !self.has_column("sentiment_label")? {
            return Ok(None);
        }
        let row = self
            .conn
            .query_row(
                &format!(
                    "SELECT sentiment_neg, sentiment_neu, sentiment_pos, sentiment_compound, sentiment_label \
                     FROM {} WHERE id = ?1",
                    self.table
                ),
                params![id],
                |r| {
                    Ok((
                        r.get::<_, Option<f64>>(0)?,
                        r.get::<_, Option<f64>>(1)?,
                        r.get::<_, Option<f64>>(2)?,
                        r.get::<_, Option<f64>>(3)?,
                        r.get::<_, Option<String>>(4)?,
                    ))
                },
            )
            .optional()?;
        Ok(row.and_then(|(neg, neu, pos, compound, label)| {
            let label = SentimentLabel::parse(label.as_deref()?)?;
            let scores = SentimentScores { neg: neg?, neu: neu?, pos: pos?, compound: compound? };
            Some((scores, label))
        }))
    }

    fn column_names(&self) -> Result<Vec<String>, StoreError> {
        let mut stmt = self.conn.prepare(&format!("PRAGMA table_info({})", self.table))?;
        let names = stmt.query_map([], |r| r.get::<_, String>(1))?.collect::<Result<Vec<_>, _>>()?;
        Ok(names)
    }

    fn has_column(&self, name: &str) -> Result<bool, StoreError> {
        Ok(self.column_names()?.iter().any(|c| c.eq_ignore_ascii_case(name)))
    }
}

impl SentimentSink for SqliteStore {
    fn ensure_sentiment_columns(&mut self) -> Result<(), StoreError> {
        let existing = self.column_names()?;
        for (name, ty) in SENTIMENT_COLUMNS {
            if !existing.iter().any(|c| c.eq_ignore_ascii_case(name)) {
                self.conn.execute_batch(&format!("ALTER TABLE {} ADD COLUMN {name} {ty};", self.table))?;
                tracing::debug!(column = %name, table = %self.table, "Added sentiment column");
            }
        }
        Ok(())
    }

    fn upsert_sentiment(&mut self, id: &str, scores: &SentimentScores, label: SentimentLabel) -> Result<(), StoreError> {
        self.conn.execute(
            &format!(
                "INSERT INTO {} (id, sentiment_neg, sentiment_neu, sentiment_pos, sentiment_compound, sentiment_label) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6) \
                 ON CONFLICT(id) DO UPDATE SET \
                 sentiment_neg = excluded.sentiment_neg, sentiment_neu = excluded.sentiment_neu, \
                 sentiment_pos = excluded.sentiment_pos, sentiment_compound = excluded.sentiment_compound, \
                 sentiment_label = excluded.sentiment_label",
                self.table
            ),
            params![id, scores.neg, scores.neu, scores.pos, scores.compound, label.as_str()],
        )?;
        Ok(())
    }
}

/// Score every `(id, text)` pair and write the result row by row.
/// A failed column migration is logged and scoring still runs; each failed row is
/// logged with its id and counted, never aborting the batch.
pub fn score_and_store<S, K>(texts: &[(String, String)], scorer: &S, sink: &mut K, progress: bool) -> UpdateTally
where
    S: SentimentScorer + ?Sized,
    K: SentimentSink + ?Sized,
{
    match sink.ensure_sentiment_columns() {
        Ok(()) => tracing::info!("Sentiment columns ensured"),
        Err(e) => tracing::error!(error = %e, "Sentiment column creation failed"),
    }

    let pb = maybe_count_progress(progress, texts.len() as u64, "Scoring sentiment");
    let mut tally = UpdateTally::default();
    for (id, text) in texts {
        let scores = scorer.polarity_scores(text);
        match sink.upsert_sentiment(id, &scores, scores.label()) {
            Ok(()) => tally.succeeded += 1,
            Err(e) => {
                tracing::warn!(id = %id, error = %e, "Failed to update sentiment");
                tally.failed += 1;
            }
        }
        if let Some(pb) = &pb { pb.inc(1); }
    }
    if let Some(pb) = pb { pb.finish_with_message("sentiment done"); }

    tracing::info!("{} rows updated successfully, {} rows failed", tally.succeeded, tally.failed);
    tally
}

fn validate_table(name: &str) -> Result<(), StoreError> {
    let mut chars = name.chars();
    let ok = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if ok { Ok(()) } else { Err(StoreError::InvalidTable(name.to_string())) }
}

fn column_type(column: &str) -> &'static str {
    match column {
        "created_utc" | "upvote_ratio" => "REAL",
        "score" | "num_comments" | "text_length" | "word_count" | "engagement_score" | "hour" => "INTEGER",
        _ => "TEXT",
    }
}
