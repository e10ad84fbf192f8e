//! Record-level keep/drop predicates. Each takes the thresholds explicitly so the
//! numbers stay configuration, not logic.

use crate::clean::CleanedText;
use crate::config::QualityThresholds;
use crate::record::{CleanedPost, RawPost};

/// A title is required; absent or empty titles are dropped.
#[inline]
pub fn has_title(post: &RawPost) -> bool {
    post.title.as_deref().map_or(false, |t| !t.is_empty())
}

/// Full text must be strictly longer than `min_text_len` characters.
#[inline]
pub fn long_enough(item: &CleanedText, t: &QualityThresholds) -> bool {
    item.full_text_cleaned.chars().count() > t.min_text_len
}

#[inline]
pub fn enough_words(post: &CleanedPost, t: &QualityThresholds) -> bool {
    post.word_count >= t.min_word_count
}

#[inline]
pub fn score_ok(post: &CleanedPost, t: &QualityThresholds) -> bool {
    post.score >= t.min_score
}
