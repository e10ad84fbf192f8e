//! ASCII folding for raw collected text. Runs before any pattern-based cleaning so
//! encoding artifacts cannot break the regexes downstream.

use crate::record::{text_of, RawPost};
use serde_json::Value;
use unicode_normalization::UnicodeNormalization;

/// Decompose (NFKD) and keep only ASCII. Accented letters fold to their base letter,
/// compatibility forms (ligatures, full-width) to their ASCII spelling; everything
/// without an ASCII representation is dropped.
pub fn to_ascii(text: &str) -> String {
    if text.is_ascii() {
        return text.to_string();
    }
    text.nfkd().filter(char::is_ascii).collect()
}

/// Normalize an optional text field; missing → "".
pub fn normalize_text(text: Option<&str>) -> String {
    text.map(to_ascii).unwrap_or_default()
}

/// Normalize any JSON value: null/missing → "", non-strings stringified first.
pub fn normalize_value(v: Option<&Value>) -> String {
    normalize_text(text_of(v).as_deref())
}

/// Fold the free-text fields of one record. Titles and bodies are always present
/// afterwards (possibly empty); the raw `full_text` column is folded only if it exists.
pub fn normalize_post(post: &RawPost) -> RawPost {
    RawPost {
        title: Some(normalize_text(post.title.as_deref())),
        selftext: Some(normalize_text(post.selftext.as_deref())),
        full_text: post.full_text.as_deref().map(to_ascii),
        ..post.clone()
    }
}
