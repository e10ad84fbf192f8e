use rsent::{label_distribution, sentiment_trend, term_frequencies, DISTRIBUTION_FILE, NEGATIVE_CLOUD_FILE, TREND_FILE};
use rsent::{render_charts, ScoredPost, SentimentLabel};
use std::path::Path;

fn row(id: &str, date: Option<&str>, label: SentimentLabel, compound: f64, text: &str) -> ScoredPost {
    ScoredPost {
        id: id.to_string(),
        date_only: date.map(str::to_string),
        label,
        compound,
        text: text.to_string(),
    }
}

fn rows() -> Vec<ScoredPost> {
    vec![
        row("1", Some("2023-11-02"), SentimentLabel::Positive, 0.8, "Love these shoes, great comfort"),
        row("2", Some("2023-11-01"), SentimentLabel::Negative, -0.6, "Terrible laces, the shoes broke"),
        row("3", Some("2023-11-02"), SentimentLabel::Positive, 0.4, "Great shoes and great price"),
        row("4", None, SentimentLabel::Neutral, 0.0, "Store opens today"),
    ]
}

#[test]
fn trend_is_mean_compound_per_date_ascending() {
    let trend = sentiment_trend(&rows());
    assert_eq!(trend.len(), 2);
    assert_eq!(trend[0].date, "2023-11-01");
    assert!((trend[0].mean_compound + 0.6).abs() < 1e-9);
    assert_eq!(trend[1].date, "2023-11-02");
    assert!((trend[1].mean_compound - 0.6).abs() < 1e-9);
    assert_eq!(trend[1].posts, 2);
}

#[test]
fn distribution_lists_every_label() {
    let dist = label_distribution(&rows());
    let counts: Vec<(SentimentLabel, usize)> = dist.iter().map(|d| (d.label, d.count)).collect();
    assert_eq!(
        counts,
        vec![(SentimentLabel::Positive, 2), (SentimentLabel::Neutral, 1), (SentimentLabel::Negative, 1)]
    );
    assert!(label_distribution(&[]).iter().all(|d| d.count == 0));
}

#[test]
fn word_cloud_terms_skip_stopwords_and_short_tokens() {
    let pos = term_frequencies(&rows(), SentimentLabel::Positive, 10);
    assert_eq!(pos[0].term, "great");
    assert_eq!(pos[0].count, 3);
    assert_eq!(pos[1].term, "shoes");
    assert_eq!(pos[1].count, 2);
    assert!(pos.iter().all(|t| t.term != "and" && t.term.len() >= 3));

    let neg = term_frequencies(&rows(), SentimentLabel::Negative, 2);
    let terms: Vec<&str> = neg.iter().map(|t| t.term.as_str()).collect();
    assert_eq!(terms, vec!["broke", "laces"]);
}

/// Width and height from the PNG signature and IHDR chunk.
fn png_size(path: &Path) -> (u32, u32) {
    let bytes = std::fs::read(path).unwrap();
    assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n", "{} is not a PNG", path.display());
    let be = |at: usize| u32::from_be_bytes(bytes[at..at + 4].try_into().unwrap());
    (be(16), be(20))
}

#[test]
fn render_writes_four_png_images() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("charts");
    let paths = render_charts(&rows(), &out).unwrap();
    assert_eq!(paths.len(), 4);
    assert_eq!(paths[0], out.join(TREND_FILE));
    assert_eq!(paths[1], out.join(DISTRIBUTION_FILE));

    assert_eq!(png_size(&out.join(TREND_FILE)), (1200, 600));
    assert_eq!(png_size(&out.join(DISTRIBUTION_FILE)), (1200, 600));
    assert_eq!(png_size(&out.join(NEGATIVE_CLOUD_FILE)), (800, 400));

    // only the four charts, no temp files left behind
    let names: Vec<String> = std::fs::read_dir(&out)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names.len(), 4, "{names:?}");
    assert!(names.iter().all(|n| n.ends_with(".png") && !n.contains("inprogress")));
}

#[test]
fn render_with_no_rows_still_writes_empty_charts() {
    let dir = tempfile::tempdir().unwrap();
    let paths = render_charts(&[], dir.path()).unwrap();
    assert_eq!(paths.len(), 4);
    for p in &paths {
        let (w, h) = png_size(p);
        assert!(w > 0 && h > 0);
    }
}
