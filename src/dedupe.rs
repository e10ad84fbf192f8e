//! First-occurrence deduplication. Input order decides which record survives;
//! no score or time ranking is involved.

use crate::record::CleanedPost;
use ahash::AHashSet;
use std::hash::Hash;

/// Keep the first record for each key, in input order.
pub fn dedup_first_by<T, K, F>(items: &[T], key: F) -> Vec<T>
where
    T: Clone,
    K: Hash + Eq,
    F: Fn(&T) -> K,
{
    let mut seen: AHashSet<K> = AHashSet::with_capacity(items.len());
    items.iter().filter(|it| seen.insert(key(it))).cloned().collect()
}

pub fn dedup_by_id(posts: &[CleanedPost]) -> Vec<CleanedPost> {
    dedup_first_by(posts, |p| p.id.clone())
}

/// Catches cross-posts and re-collection under a different id.
pub fn dedup_by_full_text(posts: &[CleanedPost]) -> Vec<CleanedPost> {
    dedup_first_by(posts, |p| p.full_text_cleaned.clone())
}
