//! Keyword search over subreddits through the public listing endpoint.
//!
//! `Collector` fans each keyword out over every configured subreddit, asks the
//! `SearchClient` for `max_posts / keywords` posts, and keeps the first copy of each id.
//! A failing search is logged and counted, never fatal.

use crate::config::CollectOptions;
use crate::date::format_utc;
use crate::dedupe::dedup_first_by;
use crate::error::CollectError;
use crate::progress::maybe_count_progress;
use crate::record::{float_of, int_of, text_of, RawPost};
use ahash::AHashMap;
use serde_json::Value;
use std::fmt;
use std::thread::sleep;

/// Source of raw posts for one keyword in one subreddit.
pub trait SearchClient {
    fn search(&self, subreddit: &str, keyword: &str, limit: usize) -> Result<Vec<RawPost>, CollectError>;
}

/// Blocking client for `{base}/r/{sub}/search.json`, paginated by the `after` cursor.
pub struct RedditSearchClient {
    http: reqwest::blocking::Client,
    opts: CollectOptions,
}

impl RedditSearchClient {
    pub fn new(opts: &CollectOptions) -> Result<Self, CollectError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(opts.user_agent.clone())
            .timeout(opts.timeout)
            .build()?;
        Ok(Self { http, opts: opts.clone() })
    }

    fn fetch_page(&self, subreddit: &str, keyword: &str, page: usize, after: Option<&str>) -> Result<Value, CollectError> {
        let url = format!("{}/r/{}/search.json", self.opts.base_url, subreddit);
        let restrict = if subreddit == "all" { "false" } else { "true" };
        let mut query: Vec<(&str, String)> = vec![
            ("q", keyword.to_string()),
            ("sort", self.opts.sort.clone()),
            ("t", self.opts.time_filter.clone()),
            ("limit", page.to_string()),
            ("restrict_sr", restrict.to_string()),
            ("raw_json", "1".to_string()),
        ];
        if let Some(a) = after {
            query.push(("after", a.to_string()));
        }

        tracing::debug!(url = %url, keyword = %keyword, after = ?after, "Requesting search page");
        let resp = self.http.get(&url).query(&query).send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(CollectError::Status { status: status.as_u16(), url });
        }
        Ok(resp.json::<Value>()?)
    }
}

impl SearchClient for RedditSearchClient {
    fn search(&self, subreddit: &str, keyword: &str, limit: usize) -> Result<Vec<RawPost>, CollectError> {
        let mut posts = Vec::new();
        let mut after: Option<String> = None;
        while posts.len() < limit {
            let page = (limit - posts.len()).min(self.opts.page_size);
            let body = self.fetch_page(subreddit, keyword, page, after.as_deref())?;
            let (batch, next) = parse_listing(&body, keyword)?;
            if batch.is_empty() {
                break;
            }
            posts.extend(batch);
            match next {
                Some(cursor) if posts.len() < limit => {
                    after = Some(cursor);
                    sleep(self.opts.page_delay);
                }
                _ => break,
            }
        }
        posts.truncate(limit);
        Ok(posts)
    }
}

/// Map a listing response to raw posts plus the `after` cursor for the next page.
pub fn parse_listing(body: &Value, keyword: &str) -> Result<(Vec<RawPost>, Option<String>), CollectError> {
    let data = body
        .get("data")
        .ok_or_else(|| CollectError::Malformed("missing `data`".to_string()))?;
    let children = data
        .get("children")
        .and_then(Value::as_array)
        .ok_or_else(|| CollectError::Malformed("missing `data.children`".to_string()))?;

    let posts = children
        .iter()
        .filter_map(|c| c.get("data"))
        .filter_map(|d| post_from_listing(d, keyword))
        .collect();
    let after = data.get("after").and_then(Value::as_str).map(str::to_string);
    Ok((posts, after))
}

fn post_from_listing(d: &Value, keyword: &str) -> Option<RawPost> {
    let id = text_of(d.get("id"))?;
    let title = text_of(d.get("title"));
    let selftext = text_of(d.get("selftext"));
    let created_utc = float_of(d.get("created_utc"));
    let full_text = format!("{} {}", title.as_deref().unwrap_or(""), selftext.as_deref().unwrap_or(""))
        .trim()
        .to_string();
    Some(RawPost {
        id,
        author: Some(text_of(d.get("author")).unwrap_or_else(|| "[deleted]".to_string())),
        created_date: created_utc.and_then(format_utc),
        created_utc,
        score: int_of(d.get("score")),
        upvote_ratio: float_of(d.get("upvote_ratio")),
        num_comments: int_of(d.get("num_comments")),
        subreddit: text_of(d.get("subreddit")),
        url: text_of(d.get("url")),
        permalink: text_of(d.get("permalink")).map(|p| format!("https://reddit.com{p}")),
        search_keyword: Some(keyword.to_string()),
        full_text: Some(full_text),
        title,
        selftext,
    })
}

/// Posts gathered plus how many keyword × subreddit searches failed.
#[derive(Clone, Debug, Default)]
pub struct CollectReport {
    pub posts: Vec<RawPost>,
    pub failed_searches: usize,
    pub total_searches: usize,
}

impl CollectReport {
    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }
}

pub struct Collector<C: SearchClient> {
    client: C,
    opts: CollectOptions,
}

impl<C: SearchClient> Collector<C> {
    pub fn new(client: C, opts: CollectOptions) -> Self {
        Self { client, opts }
    }

    pub fn options(&self) -> &CollectOptions {
        &self.opts
    }

    pub fn collect(&self) -> CollectReport {
        let per_keyword = self.opts.per_keyword_limit();
        let total = (self.opts.keywords.len() * self.opts.subreddits.len()) as u64;
        let pb = maybe_count_progress(self.opts.progress, total, "Searching");

        let mut all = Vec::new();
        let mut report = CollectReport::default();
        for keyword in &self.opts.keywords {
            tracing::info!("Searching for: '{keyword}'");
            for sub in &self.opts.subreddits {
                report.total_searches += 1;
                match self.client.search(sub, keyword, per_keyword) {
                    Ok(found) => {
                        tracing::info!("Found {} posts in r/{sub}", found.len());
                        all.extend(found);
                    }
                    Err(e) => {
                        tracing::warn!(subreddit = %sub, keyword = %keyword, error = %e, "Search failed; skipping");
                        report.failed_searches += 1;
                    }
                }
                if let Some(pb) = &pb { pb.inc(1); }
            }
        }
        if let Some(pb) = pb { pb.finish_with_message("search done"); }

        report.posts = dedup_first_by(&all, |p| p.id.clone());
        tracing::info!("Total unique posts collected: {}", report.posts.len());
        report
    }
}

// ----------------------------- Initial analysis ---------------------------

/// Overview of a freshly collected batch.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CollectionStats {
    pub total_posts: usize,
    pub date_range: Option<(String, String)>,
    pub average_score: f64,
    pub total_comments: i64,
    pub top_subreddits: Vec<(String, usize)>,
    pub keyword_counts: Vec<(String, usize)>,
    pub top_posts: Vec<(String, i64, String)>, // (title, score, subreddit)
}

impl CollectionStats {
    pub fn from_posts(posts: &[RawPost]) -> Self {
        let dates: Vec<&str> = posts.iter().filter_map(|p| p.created_date.as_deref()).collect();
        let date_range = match (dates.iter().min(), dates.iter().max()) {
            (Some(lo), Some(hi)) => Some((lo.to_string(), hi.to_string())),
            _ => None,
        };
        let scores: Vec<i64> = posts.iter().filter_map(|p| p.score).collect();
        let average_score = if scores.is_empty() { 0.0 } else { scores.iter().sum::<i64>() as f64 / scores.len() as f64 };

        let mut top: Vec<&RawPost> = posts.iter().filter(|p| p.score.is_some()).collect();
        // stable sort keeps input order among equal scores
        top.sort_by(|a, b| b.score.cmp(&a.score));
        let top_posts = top
            .into_iter()
            .take(5)
            .map(|p| {
                (
                    p.title.clone().unwrap_or_default(),
                    p.score.unwrap_or(0),
                    p.subreddit.clone().unwrap_or_default(),
                )
            })
            .collect();

        let mut top_subreddits = value_counts(posts.iter().filter_map(|p| p.subreddit.as_deref()));
        top_subreddits.truncate(10);

        Self {
            total_posts: posts.len(),
            date_range,
            average_score,
            total_comments: posts.iter().filter_map(|p| p.num_comments).sum(),
            top_subreddits,
            keyword_counts: value_counts(posts.iter().filter_map(|p| p.search_keyword.as_deref())),
            top_posts,
        }
    }
}

/// Counts per distinct value, most frequent first; ties in first-seen order.
fn value_counts<'a>(values: impl Iterator<Item = &'a str>) -> Vec<(String, usize)> {
    let mut counts: AHashMap<&str, (usize, usize)> = AHashMap::new();
    for (i, v) in values.enumerate() {
        counts.entry(v).or_insert((0, i)).0 += 1;
    }
    let mut out: Vec<(&str, (usize, usize))> = counts.into_iter().collect();
    out.sort_by(|a, b| b.1 .0.cmp(&a.1 .0).then(a.1 .1.cmp(&b.1 .1)));
    out.into_iter().map(|(v, (n, _))| (v.to_string(), n)).collect()
}

impl fmt::Display for CollectionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", "=".repeat(50))?;
        writeln!(f, "INITIAL DATA ANALYSIS")?;
        writeln!(f, "{}", "=".repeat(50))?;
        writeln!(f, "Total Posts: {}", self.total_posts)?;
        match &self.date_range {
            Some((lo, hi)) => writeln!(f, "Date Range: {lo} to {hi}")?,
            None => writeln!(f, "Date Range: n/a")?,
        }
        writeln!(f, "Average Score: {:.2}", self.average_score)?;
        writeln!(f, "Total Comments: {}", self.total_comments)?;

        writeln!(f, "\nTop Subreddits:")?;
        for (sub, n) in &self.top_subreddits {
            writeln!(f, "  {sub:<24} {n}")?;
        }
        writeln!(f, "\nSearch Keywords Distribution:")?;
        for (kw, n) in &self.keyword_counts {
            writeln!(f, "  {kw:<24} {n}")?;
        }
        writeln!(f, "\nTop Posts by Score:")?;
        for (title, score, sub) in &self.top_posts {
            let short: String = title.chars().take(60).collect();
            writeln!(f, "  * {short}... (Score: {score}, r/{sub})")?;
        }
        Ok(())
    }
}
