#[path = "common/mod.rs"]
mod common;

use common::*;
use rsent::parse_listing;
use rsent::{CollectError, CollectOptions, CollectionStats, Collector, RawPost, SearchClient};

/// Canned search results keyed by keyword.
struct FakeClient;

impl FakeClient {
    fn new() -> Self {
        FakeClient
    }
}

impl SearchClient for FakeClient {
    fn search(&self, subreddit: &str, keyword: &str, limit: usize) -> Result<Vec<RawPost>, CollectError> {
        assert!(limit > 0);
        let tagged = |mut p: RawPost| {
            p.search_keyword = Some(keyword.to_string());
            p.subreddit = Some(subreddit.to_string());
            p
        };
        match keyword {
            "Nike" => Ok(vec![tagged(post("n1", "Nike one", "", 10, 1)), tagged(post("n2", "Nike two", "", 30, 2))]),
            // overlaps with "Nike": n2 was already seen
            "swoosh" => Ok(vec![tagged(post("n2", "Nike two again", "", 30, 2)), tagged(post("s1", "Swoosh", "", 5, 0))]),
            "broken" => Err(CollectError::Status { status: 503, url: "http://test/search.json".into() }),
            _ => Ok(Vec::new()),
        }
    }
}

fn opts(keywords: &[&str], subs: &[&str]) -> CollectOptions {
    CollectOptions::default()
        .with_keywords(keywords.iter().copied())
        .with_subreddits(subs.iter().copied())
        .with_max_posts(100)
        .with_progress(false)
}

#[test]
fn collector_searches_every_keyword_in_every_subreddit() {
    let client = FakeClient::new();
    let collector = Collector::new(client, opts(&["Nike", "swoosh"], &["r/Sneakers", "Running"]));
    let report = collector.collect();

    assert_eq!(report.total_searches, 4);
    assert_eq!(report.failed_searches, 0);
}

#[test]
fn collector_keeps_first_copy_of_each_id() {
    let collector = Collector::new(FakeClient::new(), opts(&["Nike", "swoosh"], &["all"]));
    let report = collector.collect();

    let ids: Vec<&str> = report.posts.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["n1", "n2", "s1"]);
    let n2 = &report.posts[1];
    assert_eq!(n2.title.as_deref(), Some("Nike two"));
    assert_eq!(n2.search_keyword.as_deref(), Some("Nike"));
}

#[test]
fn failed_searches_are_counted_and_skipped() {
    let collector = Collector::new(FakeClient::new(), opts(&["broken", "Nike"], &["all"]));
    let report = collector.collect();
    assert_eq!(report.failed_searches, 1);
    assert_eq!(report.total_searches, 2);
    assert_eq!(report.posts.len(), 2);
}

#[test]
fn per_keyword_limit_splits_max_posts() {
    let client = FakeClient::new();
    let o = opts(&["a", "b", "c"], &["all"]);
    assert_eq!(o.per_keyword_limit(), 33);
    let collector = Collector::new(client, o);
    let report = collector.collect();
    assert!(report.is_empty());
}

#[test]
fn subreddit_names_are_normalized() {
    let o = opts(&["Nike"], &["r/Sneakers", "  RUNNING ", ""]);
    assert_eq!(o.subreddits, vec!["sneakers".to_string(), "running".to_string()]);
}

#[test]
fn listing_children_map_to_raw_posts() {
    let body = listing_page(&["abc", "def"], Some("t3_def"));
    let (posts, after) = parse_listing(&body, "Nike").unwrap();
    assert_eq!(after.as_deref(), Some("t3_def"));
    assert_eq!(posts.len(), 2);

    let p = &posts[0];
    assert_eq!(p.id, "abc");
    assert_eq!(p.title.as_deref(), Some("Post abc about Nike"));
    assert_eq!(p.author.as_deref(), Some("runner42"));
    assert_eq!(p.created_date.as_deref(), Some("2023-11-14 22:13:20"));
    assert_eq!(p.score, Some(12));
    assert_eq!(p.num_comments, Some(3));
    assert_eq!(p.permalink.as_deref(), Some("https://reddit.com/r/Sneakers/comments/abc/post/"));
    assert_eq!(p.search_keyword.as_deref(), Some("Nike"));
    assert_eq!(p.full_text.as_deref(), Some("Post abc about Nike Loving the new drop"));
}

#[test]
fn listing_without_cursor_or_author() {
    let mut body = listing_page(&["zzz"], None);
    body["data"]["children"][0]["data"]["author"] = serde_json::Value::Null;
    body["data"]["children"][0]["data"]["selftext"] = serde_json::json!("");
    let (posts, after) = parse_listing(&body, "swoosh").unwrap();
    assert!(after.is_none());
    assert_eq!(posts[0].author.as_deref(), Some("[deleted]"));
    assert_eq!(posts[0].full_text.as_deref(), Some("Post zzz about Nike"));
}

#[test]
fn malformed_listing_is_an_error() {
    let err = parse_listing(&serde_json::json!({"error": 429}), "Nike").unwrap_err();
    assert!(matches!(err, CollectError::Malformed(_)));
    let err = parse_listing(&serde_json::json!({"data": {}}), "Nike").unwrap_err();
    assert!(matches!(err, CollectError::Malformed(_)));
}

#[test]
fn stats_summarize_the_batch() {
    let mut posts = vec![
        post("1", "Small post", "", 2, 1),
        post("2", "Big post", "", 50, 10),
        post("3", "Medium post", "", 20, 4),
    ];
    posts[0].created_date = Some("2023-11-01 10:00:00".into());
    posts[1].subreddit = Some("Nike".into());
    posts[2].search_keyword = Some("swoosh".into());

    let stats = CollectionStats::from_posts(&posts);
    assert_eq!(stats.total_posts, 3);
    assert_eq!(
        stats.date_range,
        Some(("2023-11-01 10:00:00".to_string(), "2023-11-14 22:13:20".to_string()))
    );
    assert!((stats.average_score - 24.0).abs() < 1e-9);
    assert_eq!(stats.total_comments, 15);
    assert_eq!(stats.top_subreddits[0], ("Sneakers".to_string(), 2));
    assert_eq!(stats.keyword_counts, vec![("Nike".to_string(), 2), ("swoosh".to_string(), 1)]);
    let top: Vec<i64> = stats.top_posts.iter().map(|t| t.1).collect();
    assert_eq!(top, vec![50, 20, 2]);

    let text = stats.to_string();
    assert!(text.contains("Total Posts: 3"));
    assert!(text.contains("Average Score: 24.00"));
    assert!(text.contains("Big post... (Score: 50, r/Nike)"));
}
