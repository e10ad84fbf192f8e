#[path = "common/mod.rs"]
mod common;

use common::*;
use rsent::inprogress_path;
use rsent::{load_raw, load_records, CleanedPost, LoadError, Preprocessor, RunOutcome, SaveError, Tabular};
use std::time::{Duration, Instant};

const RAW_CSV: &str = "\
id,title,selftext,author,created_utc,created_date,score,upvote_ratio,num_comments,subreddit,url,permalink,search_keyword,full_text
a,,body without a title,u1,1700000000,2023-11-14 22:13:20,3,0.5,1,Sneakers,,,Nike,body without a title
b,Nike shoes,,u2,1700000000,2023-11-14 22:13:20,5,0.9,0,Sneakers,,,Nike,Nike shoes
c,I love my new Nike Air Max shoes,Best purchase ever,u3,1700000000,2023-11-14 22:13:20,100,0.97,10,Sneakers,,,Nike,\"I love my new Nike Air Max shoes Best purchase ever\"
";

#[test]
fn csv_in_csv_out_with_summary() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("raw.csv");
    let output = dir.path().join("out").join("nike_cleaned.csv");
    write_text(&input, RAW_CSV);

    let outcome = Preprocessor::new().input(&input).output(&output).brand("Nike").run();
    let (batch, paths) = match outcome {
        RunOutcome::Saved { batch, paths } => (batch, paths),
        other => panic!("expected a saved run, got {other:?}"),
    };
    assert_eq!(batch.cleaned_count(), 1);
    assert_eq!(paths.output, output);
    assert_eq!(paths.summary, dir.path().join("out").join("nike_cleaned_summary.txt"));

    let lines = read_lines(&output);
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], CleanedPost::COLUMNS.join(","));
    assert!(lines[1].starts_with("c,"));

    let summary = std::fs::read_to_string(&paths.summary).unwrap();
    assert!(summary.starts_with("Nike Reddit Data Cleaning Summary"));
    assert!(summary.contains("Retained: 33.3%"));
    assert!(summary.contains(" - engagement_score\n"));

    assert!(!inprogress_path(&output).exists());
    assert!(!inprogress_path(&paths.summary).exists());

    // the cleaned file reads back as typed records
    let back: Vec<CleanedPost> = load_records(&output).unwrap();
    assert_eq!(back, batch.posts);
}

#[test]
fn printed_summary_matches_the_saved_one() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("raw.csv");
    let output = dir.path().join("cleaned.csv");
    write_text(&input, RAW_CSV);

    let pre = Preprocessor::new().input(&input).output(&output).brand("  Nike ");
    let outcome = pre.run();
    let (batch, paths) = match outcome {
        RunOutcome::Saved { batch, paths } => (batch, paths),
        other => panic!("expected a saved run, got {other:?}"),
    };
    let printed = batch.summary(pre.options().brand.as_deref());
    assert!(printed.starts_with("Nike Reddit Data Cleaning Summary\n"));
    assert_eq!(std::fs::read_to_string(&paths.summary).unwrap(), printed);
}

#[test]
fn jsonl_in_zst_out_round_trips_records() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("raw.jsonl");
    let output = dir.path().join("cleaned.jsonl.zst");
    write_jsonl_lines(&input, &three_post_json_lines());

    let outcome = Preprocessor::new().input(&input).output(&output).run();
    assert!(outcome.is_saved());
    assert!(dir.path().join("cleaned_summary.txt").exists());

    let back: Vec<CleanedPost> = load_records(&output).unwrap();
    assert_eq!(back.len(), 1);
    assert_eq!(back[0].id, "c");
    assert_eq!(back[0].engagement_score, 120);
}

#[test]
fn directory_input_reads_every_supported_file_in_name_order() {
    let dir = tempfile::tempdir().unwrap();
    let in_dir = dir.path().join("raw");
    let lines = three_post_json_lines();
    write_zst_lines(&in_dir.join("a_part.jsonl.zst"), &lines[..2]);
    write_jsonl_lines(&in_dir.join("b_part.ndjson"), &lines[2..]);
    write_text(&in_dir.join("notes.txt"), "not a table");

    let raw = load_raw(&in_dir).unwrap();
    let ids: Vec<&str> = raw.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b", "c"]);
}

#[test]
fn malformed_rows_are_skipped_and_bad_numbers_coerced() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("raw.jsonl");
    write_jsonl_lines(
        &input,
        &[
            "{not json".to_string(),
            "[1, 2, 3]".to_string(),
            r#"{"id": "n1", "title": "Nike Pegasus review after a month", "score": "abc", "num_comments": 4.0}"#.to_string(),
            "".to_string(),
        ],
    );

    let raw = load_raw(&input).unwrap();
    assert_eq!(raw.len(), 1);
    assert_eq!(raw[0].score, None);
    assert_eq!(raw[0].num_comments, Some(4));

    let out = dir.path().join("clean.jsonl");
    let outcome = Preprocessor::new().input(&input).output(&out).run();
    let batch = outcome.batch().unwrap();
    assert_eq!(batch.posts[0].score, 0);
    assert_eq!(batch.posts[0].engagement_score, 8);

    let values = read_jsonl_values(&out);
    assert_eq!(values.len(), 1);
    assert_eq!(values[0]["author"], "[unknown]");
}

#[test]
fn missing_input_is_a_load_failure() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("out.csv");
    let outcome = Preprocessor::new().input(dir.path().join("nope.csv")).output(&output).run();
    assert!(matches!(outcome, RunOutcome::LoadFailed(LoadError::NotFound(_))));
    assert!(outcome.batch().is_none());
    assert!(!output.exists());
}

#[test]
fn unsupported_input_extension_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("raw.xlsx");
    write_text(&input, "whatever");
    assert!(matches!(load_raw(&input), Err(LoadError::UnsupportedFormat(_))));
}

#[test]
fn failed_save_leaves_nothing_behind() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("raw.csv");
    let output = dir.path().join("cleaned.parquet");
    write_text(&input, RAW_CSV);

    let outcome = Preprocessor::new().input(&input).output(&output).run();
    match outcome {
        RunOutcome::SaveFailed { batch, error } => {
            assert_eq!(batch.cleaned_count(), 1);
            assert!(matches!(error, SaveError::UnsupportedFormat(_)));
        }
        other => panic!("expected a save failure, got {other:?}"),
    }
    assert!(!output.exists());
    assert!(!inprogress_path(&output).exists());
    assert!(!dir.path().join("cleaned_summary.txt").exists());
}

#[test]
fn saving_onto_a_directory_fails_fast() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("raw.csv");
    let output = dir.path().join("cleaned.csv");
    write_text(&input, RAW_CSV);
    std::fs::create_dir_all(&output).unwrap();

    let started = Instant::now();
    let outcome = Preprocessor::new().input(&input).output(&output).run();
    let elapsed = started.elapsed();

    assert!(matches!(outcome, RunOutcome::SaveFailed { .. }), "{outcome:?}");
    assert!(elapsed < Duration::from_secs(2), "took {elapsed:?}");
    assert!(output.is_dir());
    assert!(!inprogress_path(&output).exists());
}

#[test]
fn empty_batch_still_writes_the_header() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("raw.csv");
    let output = dir.path().join("cleaned.csv");
    write_text(&input, "id,title\nq,\n");

    let outcome = Preprocessor::new().input(&input).output(&output).run();
    assert!(outcome.is_saved());
    assert_eq!(read_lines(&output), vec![CleanedPost::COLUMNS.join(",")]);
    let summary = std::fs::read_to_string(dir.path().join("cleaned_summary.txt")).unwrap();
    assert!(summary.contains("Original posts: 1"));
    assert!(summary.contains("Retained: 0.0%"));
}
