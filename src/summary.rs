//! Plain-text cleaning summary written next to the cleaned output.

use crate::pipeline::StageCounts;
use std::fmt::Write;

/// Share of input records kept, in percent. 0.0 for an empty input.
pub fn retention_pct(original: usize, cleaned: usize) -> f64 {
    if original == 0 {
        0.0
    } else {
        cleaned as f64 / original as f64 * 100.0
    }
}

pub fn render_summary(brand: Option<&str>, counts: &StageCounts, columns: &[&str]) -> String {
    let mut out = String::new();
    let header = match brand {
        Some(b) => format!("{b} Reddit Data Cleaning Summary"),
        None => "Reddit Data Cleaning Summary".to_string(),
    };
    // writes into a String are infallible
    let _ = writeln!(out, "{header}");
    let _ = writeln!(out, "{}", "=".repeat(40));
    let _ = writeln!(out, "Original posts: {}", counts.input);
    let _ = writeln!(out, "Cleaned posts: {}", counts.output);
    let _ = writeln!(out, "Retained: {:.1}%", retention_pct(counts.input, counts.output));
    let _ = writeln!(out);

    let _ = writeln!(out, "Dropped:");
    let _ = writeln!(out, " - missing title: {}", counts.missing_title);
    let _ = writeln!(out, " - too short: {}", counts.too_short);
    let _ = writeln!(out, " - too few words: {}", counts.too_few_words);
    let _ = writeln!(out, " - low score: {}", counts.low_score);
    let _ = writeln!(out, " - duplicate id: {}", counts.duplicate_id);
    let _ = writeln!(out, " - duplicate text: {}", counts.duplicate_text);
    let _ = writeln!(out);

    let _ = writeln!(out, "Columns:");
    for col in columns {
        let _ = writeln!(out, " - {col}");
    }
    out
}
