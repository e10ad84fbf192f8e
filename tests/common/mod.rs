#![allow(dead_code)]

use rsent::RawPost;
use serde_json::json;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

/// Write a compressed `.zst` file containing the provided JSONL lines.
pub fn write_zst_lines(path: &Path, lines: &[String]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let f = File::create(path).unwrap();
    let mut enc = zstd::stream::write::Encoder::new(f, 3).unwrap();
    for l in lines {
        writeln!(&mut enc, "{}", l).unwrap();
    }
    enc.finish().unwrap();
}

/// Write a plain JSONL file.
pub fn write_jsonl_lines(path: &Path, lines: &[String]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let mut f = File::create(path).unwrap();
    for l in lines {
        writeln!(f, "{}", l).unwrap();
    }
}

/// Write a text file verbatim (CSV fixtures are easiest to read inline).
pub fn write_text(path: &Path, text: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, text).unwrap();
}

/// Read a JSONL file into a vector of `serde_json::Value` (skips empty lines).
pub fn read_jsonl_values(path: &Path) -> Vec<serde_json::Value> {
    let f = File::open(path).unwrap();
    let r = BufReader::new(f);
    r.lines()
        .map(|l| l.unwrap())
        .filter(|s| !s.is_empty())
        .map(|s| serde_json::from_str(&s).unwrap())
        .collect()
}

/// Read a text file line-by-line into strings.
pub fn read_lines(path: &Path) -> Vec<String> {
    let f = File::open(path).unwrap();
    let r = BufReader::new(f);
    r.lines().map(|l| l.unwrap()).filter(|s| !s.is_empty()).collect()
}

/// Minimal raw post with the given id, title, body, score and comment count.
pub fn post(id: &str, title: &str, body: &str, score: i64, comments: i64) -> RawPost {
    RawPost {
        id: id.to_string(),
        title: Some(title.to_string()),
        selftext: Some(body.to_string()),
        author: Some("sneakerhead".to_string()),
        created_utc: Some(1_700_000_000.0),
        created_date: Some("2023-11-14 22:13:20".to_string()),
        score: Some(score),
        upvote_ratio: Some(0.9),
        num_comments: Some(comments),
        subreddit: Some("Sneakers".to_string()),
        url: Some(format!("https://reddit.com/r/Sneakers/{id}")),
        permalink: Some(format!("https://reddit.com/r/Sneakers/comments/{id}/")),
        search_keyword: Some("Nike".to_string()),
        full_text: Some(format!("{title} {body}").trim().to_string()),
    }
}

/// The three-record batch: empty title, too short, and one keeper.
///
/// - `a`: empty title → dropped
/// - `b`: "Nike shoes", no body → exactly 10 chars → dropped by the length rule
/// - `c`: long title and body, score 100, 10 comments → kept, engagement 120
pub fn three_post_batch() -> Vec<RawPost> {
    vec![
        post("a", "", "some body text that is long enough", 3, 1),
        post("b", "Nike shoes", "", 5, 0),
        post("c", "I love my new Nike Air Max shoes", "Best purchase ever", 100, 10),
    ]
}

/// JSON lines for `three_post_batch`, as the collector would write them.
pub fn three_post_json_lines() -> Vec<String> {
    three_post_batch().iter().map(|p| serde_json::to_string(p).unwrap()).collect()
}

/// A listing page in the shape the search endpoint returns.
pub fn listing_page(ids: &[&str], after: Option<&str>) -> serde_json::Value {
    let children: Vec<serde_json::Value> = ids
        .iter()
        .map(|id| {
            json!({
                "kind": "t3",
                "data": {
                    "id": id,
                    "title": format!("Post {id} about Nike"),
                    "selftext": "Loving the new drop",
                    "author": "runner42",
                    "created_utc": 1700000000.0,
                    "score": 12,
                    "upvote_ratio": 0.95,
                    "num_comments": 3,
                    "subreddit": "Sneakers",
                    "url": format!("https://www.reddit.com/r/Sneakers/comments/{id}/"),
                    "permalink": format!("/r/Sneakers/comments/{id}/post/")
                }
            })
        })
        .collect();
    json!({ "kind": "Listing", "data": { "after": after, "children": children } })
}
