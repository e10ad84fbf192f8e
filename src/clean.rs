//! Pattern-based text cleaning. The steps run in a fixed order: later patterns
//! assume URLs, mentions and placeholders are already gone.

use crate::record::RawPost;
use regex::Regex;
use std::sync::OnceLock;

struct Patterns {
    url: Regex,
    user_mention: Regex,
    sub_mention: Regex,
    placeholder: Regex,
    newlines: Regex,
    whitespace: Regex,
    disallowed: Regex,
}

static PATTERNS: OnceLock<Patterns> = OnceLock::new();

fn patterns() -> &'static Patterns {
    PATTERNS.get_or_init(|| Patterns {
        url: Regex::new(r"https?://\S+").unwrap(),
        user_mention: Regex::new(r"/u/\w+").unwrap(),
        sub_mention: Regex::new(r"/r/\w+").unwrap(),
        placeholder: Regex::new(r"\[deleted\]|\[removed\]").unwrap(),
        newlines: Regex::new(r"\n+").unwrap(),
        whitespace: Regex::new(r"\s+").unwrap(),
        disallowed: Regex::new(r"[^a-zA-Z0-9\s.,!?-]").unwrap(),
    })
}

/// Clean one (already ASCII-folded) text value:
/// 1. drop `http(s)://` URLs
/// 2. drop `/u/name` and `/r/name` mentions
/// 3. drop `[deleted]` / `[removed]`
/// 4. newline runs → one space
/// 5. whitespace runs → one space
/// 6. drop everything but letters, digits, whitespace and `. , ! ? -`
/// 7. trim
///
/// Step 6 can leave two spaces where a symbol sat between words; those are collapsed
/// again before the trim so the result is a fixed point of `clean_text`.
pub fn clean_text(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let p = patterns();
    let s = p.url.replace_all(text, "");
    let s = p.user_mention.replace_all(&s, "");
    let s = p.sub_mention.replace_all(&s, "");
    let s = p.placeholder.replace_all(&s, "");
    let s = p.newlines.replace_all(&s, " ");
    let s = p.whitespace.replace_all(&s, " ");
    let s = p.disallowed.replace_all(&s, "");
    let s = p.whitespace.replace_all(&s, " ");
    s.trim().to_string()
}

/// Missing input cleans to "".
pub fn clean_optional(text: Option<&str>) -> String {
    text.map(clean_text).unwrap_or_default()
}

/// Full text: cleaned title and body joined by one space, trimmed.
pub fn join_full_text(title_cleaned: &str, body_cleaned: &str) -> String {
    format!("{title_cleaned} {body_cleaned}").trim().to_string()
}

/// A record carrying its cleaned text fields, between cleaning and feature derivation.
#[derive(Clone, Debug, PartialEq)]
pub struct CleanedText {
    pub post: RawPost,
    pub title_cleaned: String,
    pub selftext_cleaned: String,
    pub full_text_cleaned: String,
}

pub fn clean_post(post: &RawPost) -> CleanedText {
    let title_cleaned = clean_optional(post.title.as_deref());
    let selftext_cleaned = clean_optional(post.selftext.as_deref());
    let full_text_cleaned = join_full_text(&title_cleaned, &selftext_cleaned);
    CleanedText { post: post.clone(), title_cleaned, selftext_cleaned, full_text_cleaned }
}
