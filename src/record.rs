//! Post records at both ends of the pipeline, plus lenient field coercion for
//! rows read from CSV/JSONL where every column may be missing, null, or mistyped.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One input row as loaded from a tabular file: column name → value.
pub type Row = Map<String, Value>;

/// A record type that can be written to and read from tabular files.
/// `COLUMNS` lists the serialized field names in order (CSV header order).
pub trait Tabular: Serialize + DeserializeOwned {
    const COLUMNS: &'static [&'static str];
}

/// Unprocessed post as produced by the collection client.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPost {
    pub id: String,
    pub title: Option<String>,
    pub selftext: Option<String>,
    pub author: Option<String>,
    pub created_utc: Option<f64>,
    pub created_date: Option<String>,
    pub score: Option<i64>,
    pub upvote_ratio: Option<f64>,
    pub num_comments: Option<i64>,
    pub subreddit: Option<String>,
    pub url: Option<String>,
    pub permalink: Option<String>,
    pub search_keyword: Option<String>,
    pub full_text: Option<String>,
}

impl Tabular for RawPost {
    const COLUMNS: &'static [&'static str] = &[
        "id", "title", "selftext", "author", "created_utc", "created_date", "score",
        "upvote_ratio", "num_comments", "subreddit", "url", "permalink", "search_keyword",
        "full_text",
    ];
}

impl RawPost {
    /// Build from a loosely-typed row. Never fails: missing or unusable values become `None`
    /// (or an empty id).
    pub fn from_row(row: &Row) -> Self {
        Self {
            id: text_of(row.get("id")).map(|s| s.trim().to_string()).unwrap_or_default(),
            title: text_of(row.get("title")),
            selftext: text_of(row.get("selftext")),
            author: text_of(row.get("author")),
            created_utc: float_of(row.get("created_utc")),
            created_date: text_of(row.get("created_date")),
            score: int_of(row.get("score")),
            upvote_ratio: float_of(row.get("upvote_ratio")),
            num_comments: int_of(row.get("num_comments")),
            subreddit: text_of(row.get("subreddit")),
            url: text_of(row.get("url")),
            permalink: text_of(row.get("permalink")),
            search_keyword: text_of(row.get("search_keyword")),
            full_text: text_of(row.get("full_text")),
        }
    }
}

/// Post after normalization, cleaning, filtering and feature derivation.
/// Field order is the output column order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CleanedPost {
    pub id: String,
    pub title: String,
    pub selftext: String,
    pub author: String,
    pub created_utc: Option<f64>,
    pub created_date: Option<String>,
    pub score: i64,
    pub upvote_ratio: Option<f64>,
    pub num_comments: i64,
    pub subreddit: Option<String>,
    pub url: Option<String>,
    pub permalink: Option<String>,
    pub search_keyword: Option<String>,
    pub full_text: Option<String>,
    pub title_cleaned: String,
    pub selftext_cleaned: String,
    pub full_text_cleaned: String,
    pub text_length: usize,
    pub word_count: usize,
    pub engagement_score: i64,
    pub date_only: Option<String>,
    pub hour: Option<u8>,
    pub day_of_week: Option<String>,
}

impl Tabular for CleanedPost {
    const COLUMNS: &'static [&'static str] = &[
        "id", "title", "selftext", "author", "created_utc", "created_date", "score",
        "upvote_ratio", "num_comments", "subreddit", "url", "permalink", "search_keyword",
        "full_text", "title_cleaned", "selftext_cleaned", "full_text_cleaned", "text_length",
        "word_count", "engagement_score", "date_only", "hour", "day_of_week",
    ];
}

// ----------------------------- Coercion ------------------------------------

/// Text form of a value: strings as-is, numbers/bools stringified, null/missing → None.
pub fn text_of(v: Option<&Value>) -> Option<String> {
    match v? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

/// Integer form of a value. Floats and numeric strings are truncated; anything else → None.
pub fn int_of(v: Option<&Value>) -> Option<i64> {
    match v? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(float_to_int)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>().ok().or_else(|| s.parse::<f64>().ok().and_then(float_to_int))
        }
        _ => None,
    }
}

/// Float form of a value. Numeric strings are parsed; NaN/inf and anything else → None.
pub fn float_of(v: Option<&Value>) -> Option<f64> {
    let f = match v? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    f.is_finite().then_some(f)
}

fn float_to_int(f: f64) -> Option<i64> {
    if f.is_finite() && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
        Some(f.trunc() as i64)
    } else {
        None
    }
}
