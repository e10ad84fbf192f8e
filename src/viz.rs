//! Static PNG charts for the scored batch: daily sentiment trend, label distribution
//! and positive/negative word clouds. Read-only over its input.

use crate::error::SaveError;
use crate::sentiment::SentimentLabel;
use crate::store::ScoredPost;
use crate::tabular::write_atomic_via;
use ahash::{AHashMap, AHashSet};
use plotters::prelude::*;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const TREND_FILE: &str = "trendline_sentiment.png";
pub const DISTRIBUTION_FILE: &str = "sentiment_distribution.png";
pub const POSITIVE_CLOUD_FILE: &str = "positive_wordcloud.png";
pub const NEGATIVE_CLOUD_FILE: &str = "negative_wordcloud.png";

const CHART_SIZE: (u32, u32) = (1200, 600);
const CLOUD_SIZE: (u32, u32) = (800, 400);

const CLOUD_TERMS: usize = 100;
const MIN_TERM_LEN: usize = 3;
const CLOUD_FONT: (f64, f64) = (12.0, 56.0);
const CLOUD_PAD: i32 = 10;
const WORD_GAP: i32 = 8;

const POSITIVE_COLOR: RGBColor = RGBColor(46, 139, 87);
const NEUTRAL_COLOR: RGBColor = RGBColor(150, 150, 150);
const NEGATIVE_COLOR: RGBColor = RGBColor(200, 40, 40);

const STOPWORDS: &[&str] = &[
    "about", "after", "all", "also", "and", "any", "are", "because", "been", "but", "can",
    "could", "did", "does", "for", "from", "get", "got", "had", "has", "have", "her", "him",
    "his", "how", "into", "its", "just", "like", "more", "not", "now", "one", "only", "our",
    "out", "over", "she", "some", "than", "that", "the", "their", "them", "then", "there",
    "these", "they", "this", "was", "were", "what", "when", "which", "who", "will", "with",
    "would", "you", "your",
];

#[derive(Clone, Debug, PartialEq)]
pub struct TrendPoint {
    pub date: String,
    pub mean_compound: f64,
    pub posts: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabelCount {
    pub label: SentimentLabel,
    pub count: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TermFrequency {
    pub term: String,
    pub count: usize,
}

/// Mean compound per calendar date, ascending. Rows without a date are left out.
pub fn sentiment_trend(rows: &[ScoredPost]) -> Vec<TrendPoint> {
    let mut by_date: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for r in rows {
        if let Some(d) = r.date_only.as_deref() {
            let e = by_date.entry(d).or_insert((0.0, 0));
            e.0 += r.compound;
            e.1 += 1;
        }
    }
    by_date
        .into_iter()
        .map(|(date, (sum, n))| TrendPoint { date: date.to_string(), mean_compound: sum / n as f64, posts: n })
        .collect()
}

/// Count per label; every label appears, zero or not.
pub fn label_distribution(rows: &[ScoredPost]) -> Vec<LabelCount> {
    [SentimentLabel::Positive, SentimentLabel::Neutral, SentimentLabel::Negative]
        .into_iter()
        .map(|label| LabelCount { label, count: rows.iter().filter(|r| r.label == label).count() })
        .collect()
}

/// Most frequent terms in texts carrying `label`. Lowercased; stopwords and tokens
/// shorter than three letters are dropped. Ties break alphabetically.
pub fn term_frequencies(rows: &[ScoredPost], label: SentimentLabel, top: usize) -> Vec<TermFrequency> {
    let stop: AHashSet<&str> = STOPWORDS.iter().copied().collect();
    let mut counts: AHashMap<String, usize> = AHashMap::new();
    for r in rows.iter().filter(|r| r.label == label) {
        for tok in r.text.split_whitespace() {
            let term: String = tok
                .trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase();
            if term.chars().count() < MIN_TERM_LEN || !term.chars().any(char::is_alphabetic) || stop.contains(term.as_str()) {
                continue;
            }
            *counts.entry(term).or_insert(0) += 1;
        }
    }
    let mut terms: Vec<TermFrequency> = counts.into_iter().map(|(term, count)| TermFrequency { term, count }).collect();
    terms.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.term.cmp(&b.term)));
    terms.truncate(top);
    terms
}

/// Render all four charts into `out_dir`; returns their paths in write order.
pub fn render_charts(rows: &[ScoredPost], out_dir: &Path) -> Result<Vec<PathBuf>, SaveError> {
    if rows.is_empty() {
        tracing::warn!("No scored rows; charts will be empty");
    }
    let mut written = Vec::with_capacity(4);

    let trend = sentiment_trend(rows);
    written.push(write_png(out_dir, TREND_FILE, |tmp| draw_trend(tmp, &trend))?);

    let dist = label_distribution(rows);
    written.push(write_png(out_dir, DISTRIBUTION_FILE, |tmp| draw_distribution(tmp, &dist))?);

    let pos = term_frequencies(rows, SentimentLabel::Positive, CLOUD_TERMS);
    written.push(write_png(out_dir, POSITIVE_CLOUD_FILE, |tmp| {
        draw_cloud(tmp, "Positive Sentiment Word Cloud", &pos, POSITIVE_COLOR)
    })?);

    let neg = term_frequencies(rows, SentimentLabel::Negative, CLOUD_TERMS);
    written.push(write_png(out_dir, NEGATIVE_CLOUD_FILE, |tmp| {
        draw_cloud(tmp, "Negative Sentiment Word Cloud", &neg, NEGATIVE_COLOR)
    })?);

    tracing::info!(dir = %out_dir.display(), files = written.len(), "Charts written");
    Ok(written)
}

/// Draw into `<stem>.inprogress.png` and promote it; the encoder picks the
/// format from the extension.
fn write_png(dir: &Path, name: &str, draw: impl FnOnce(&Path) -> anyhow::Result<()>) -> Result<PathBuf, SaveError> {
    let path = dir.join(name);
    let tmp = path.with_extension("inprogress.png");
    write_atomic_via(&path, &tmp, |tmp| {
        draw(tmp).map_err(|e| SaveError::Render { path: path.clone(), message: format!("{e:#}") })
    })?;
    tracing::debug!(path = %path.display(), "Wrote chart");
    Ok(path)
}

fn label_color(label: SentimentLabel) -> RGBColor {
    match label {
        SentimentLabel::Positive => POSITIVE_COLOR,
        SentimentLabel::Neutral => NEUTRAL_COLOR,
        SentimentLabel::Negative => NEGATIVE_COLOR,
    }
}

fn draw_trend(tmp: &Path, trend: &[TrendPoint]) -> anyhow::Result<()> {
    let root = BitMapBackend::new(tmp, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let n = trend.len().max(1) as i32;
    let mut chart = ChartBuilder::on(&root)
        .caption("Average Sentiment Over Time", ("sans-serif", 30))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(0..n, -1f64..1f64)?;

    let date_at = |i: &i32| trend.get(*i as usize).map(|p| p.date.clone()).unwrap_or_default();
    chart
        .configure_mesh()
        .x_desc("Date")
        .y_desc("Average Compound Score")
        .x_labels(trend.len().clamp(1, 10))
        .x_label_formatter(&date_at)
        .draw()?;

    chart.draw_series(LineSeries::new(vec![(0, 0.0), (n, 0.0)], &BLACK.mix(0.3)))?;
    let points: Vec<(i32, f64)> = trend.iter().enumerate().map(|(i, p)| (i as i32, p.mean_compound)).collect();
    chart.draw_series(LineSeries::new(points.clone(), &BLUE))?;
    chart.draw_series(points.into_iter().map(|pt| Circle::new(pt, 4, BLUE.filled())))?;

    root.present()?;
    Ok(())
}

fn draw_distribution(tmp: &Path, dist: &[LabelCount]) -> anyhow::Result<()> {
    let root = BitMapBackend::new(tmp, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let top = dist.iter().map(|d| d.count).max().unwrap_or(0).max(1) as u32;
    let mut chart = ChartBuilder::on(&root)
        .caption("Sentiment Distribution", ("sans-serif", 30))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d((0u32..dist.len() as u32).into_segmented(), 0u32..top + top / 10 + 1)?;

    let label_at = |v: &SegmentValue<u32>| match v {
        SegmentValue::CenterOf(i) => dist.get(*i as usize).map(|d| d.label.to_string()).unwrap_or_default(),
        _ => String::new(),
    };
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("Sentiment")
        .y_desc("Posts")
        .x_label_formatter(&label_at)
        .draw()?;

    for (i, d) in dist.iter().enumerate() {
        chart.draw_series(
            Histogram::vertical(&chart)
                .style(label_color(d.label).filled())
                .margin(40)
                .data(std::iter::once((i as u32, d.count as u32))),
        )?;
    }

    root.present()?;
    Ok(())
}

/// Terms laid out in rows, largest first, font size scaled by frequency. Terms
/// that no longer fit are left out.
fn draw_cloud(tmp: &Path, title: &str, terms: &[TermFrequency], color: RGBColor) -> anyhow::Result<()> {
    let root = BitMapBackend::new(tmp, CLOUD_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let area = root.titled(title, ("sans-serif", 26))?;
    let (width, height) = area.dim_in_pixel();
    let (width, height) = (width as i32, height as i32);

    let (min_font, max_font) = CLOUD_FONT;
    let most = terms.first().map_or(1, |t| t.count).max(1) as f64;
    let (mut x, mut y, mut line) = (CLOUD_PAD, CLOUD_PAD, 0);
    for t in terms {
        let size = min_font + (max_font - min_font) * t.count as f64 / most;
        let style = FontDesc::new(FontFamily::SansSerif, size, FontStyle::Normal).color(&color);
        let (w, h) = area.estimate_text_size(&t.term, &style)?;
        let (w, h) = (w as i32, h as i32);
        if x + w > width - CLOUD_PAD {
            x = CLOUD_PAD;
            y += line + WORD_GAP;
            line = 0;
        }
        if y + h > height - CLOUD_PAD {
            break;
        }
        area.draw_text(&t.term, &style, (x, y))?;
        x += w + WORD_GAP;
        line = line.max(h);
    }

    root.present()?;
    Ok(())
}
