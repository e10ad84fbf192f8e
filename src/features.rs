//! Derived per-record features: sizes, engagement, calendar fields.

use crate::clean::CleanedText;
use crate::date::calendar_for;
use crate::record::CleanedPost;

#[inline]
pub fn text_length(full_text: &str) -> usize {
    full_text.chars().count()
}

#[inline]
pub fn word_count(full_text: &str) -> usize {
    full_text.split_whitespace().count()
}

/// `score + 2 × comments`, with missing values counted as 0.
#[inline]
pub fn engagement_score(score: Option<i64>, num_comments: Option<i64>) -> i64 {
    let score = score.unwrap_or(0);
    let comments = num_comments.unwrap_or(0);
    score.saturating_add(comments.saturating_mul(2))
}

/// Turn a cleaned record into its final output shape.
/// `unknown_author` replaces a missing author.
pub fn derive_features(item: CleanedText, unknown_author: &str) -> CleanedPost {
    let CleanedText { post, title_cleaned, selftext_cleaned, full_text_cleaned } = item;
    let calendar = calendar_for(post.created_date.as_deref(), post.created_utc);
    let (date_only, hour, day_of_week) = match calendar {
        Some(c) => (Some(c.date), Some(c.hour), Some(c.weekday)),
        None => (None, None, None),
    };

    CleanedPost {
        text_length: text_length(&full_text_cleaned),
        word_count: word_count(&full_text_cleaned),
        engagement_score: engagement_score(post.score, post.num_comments),
        score: post.score.unwrap_or(0),
        num_comments: post.num_comments.unwrap_or(0),
        author: post.author.filter(|a| !a.is_empty()).unwrap_or_else(|| unknown_author.to_string()),
        id: post.id,
        title: post.title.unwrap_or_default(),
        selftext: post.selftext.unwrap_or_default(),
        created_utc: post.created_utc,
        created_date: post.created_date,
        upvote_ratio: post.upvote_ratio,
        subreddit: post.subreddit,
        url: post.url,
        permalink: post.permalink,
        search_keyword: post.search_keyword,
        full_text: post.full_text,
        title_cleaned,
        selftext_cleaned,
        full_text_cleaned,
        date_only,
        hour,
        day_of_week,
    }
}
