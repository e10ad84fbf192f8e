use rsent::{clean_post, clean_text, join_full_text};
use rsent::{calendar_for, format_utc};
use rsent::{engagement_score, word_count};
use rsent::{normalize_post, normalize_value, to_ascii};
use rsent::RawPost;
use serde_json::json;

fn only_allowed_chars(s: &str) -> bool {
    s.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '.' | ',' | '!' | '?' | '-'))
}

#[test]
fn normalizer_folds_accents_and_drops_the_rest() {
    assert_eq!(to_ascii("Café Ñandú"), "Cafe Nandu");
    assert_eq!(to_ascii("Ｎｉｋｅ ﬁne"), "Nike fine");
    assert_eq!(to_ascii("naïve 😀"), "naive ");
    assert_eq!(to_ascii("plain ascii"), "plain ascii");
}

#[test]
fn normalizer_coerces_missing_and_non_text_values() {
    assert_eq!(normalize_value(None), "");
    assert_eq!(normalize_value(Some(&json!(null))), "");
    assert_eq!(normalize_value(Some(&json!(42))), "42");
    assert_eq!(normalize_value(Some(&json!(true))), "true");
    assert_eq!(normalize_value(Some(&json!("Crème"))), "Creme");
}

#[test]
fn normalize_post_fills_title_and_body() {
    let raw = RawPost { id: "x".into(), title: None, selftext: Some("Über".into()), ..Default::default() };
    let n = normalize_post(&raw);
    assert_eq!(n.title.as_deref(), Some(""));
    assert_eq!(n.selftext.as_deref(), Some("Uber"));
    assert_eq!(n.full_text, None);
    // the input record is untouched
    assert_eq!(raw.title, None);
}

#[test]
fn cleaner_removes_urls_entirely() {
    assert_eq!(clean_text("Check https://nike.com/deal?x=1 now!"), "Check now!");
    assert_eq!(clean_text("http://a.b/c"), "");
    let out = clean_text("see https://example.com/path/with-dashes.and.dots");
    assert!(!out.contains("example"), "url fragment left behind: {out:?}");
}

#[test]
fn cleaner_removes_mentions_and_placeholders() {
    assert_eq!(clean_text("Thanks /u/bob_99 and /r/Sneakers"), "Thanks and");
    assert_eq!(clean_text("[deleted]"), "");
    assert_eq!(clean_text("body [removed] here"), "body here");
}

#[test]
fn cleaner_collapses_newlines_and_whitespace() {
    assert_eq!(clean_text("Line one\n\n\nLine two"), "Line one Line two");
    assert_eq!(clean_text("  spaced \t\t out  "), "spaced out");
}

#[test]
fn cleaner_strips_disallowed_symbols() {
    assert_eq!(clean_text("Price: $120 (great) #nike"), "Price 120 great nike");
    assert_eq!(clean_text("a & b"), "a b");
    assert_eq!(clean_text("wait... what?! ok, sure - fine"), "wait... what?! ok, sure - fine");
}

#[test]
fn cleaner_output_uses_only_the_allowed_alphabet() {
    let samples = [
        "Just Do It™ — «quoted» 100% 🔥🔥",
        "tabs\tand\nnewlines\r\nmixed",
        "emoji only 😀😀😀",
        "<b>html</b> & entities &amp; stuff",
        "/u/someone said: \"buy @ $99\"",
    ];
    for s in samples {
        let out = clean_text(&to_ascii(s));
        assert!(only_allowed_chars(&out), "unexpected char in {out:?}");
        assert!(!out.contains("  "), "double space in {out:?}");
        assert_eq!(out, out.trim());
    }
}

#[test]
fn cleaner_is_idempotent() {
    let samples = [
        "Check https://nike.com now!! /u/bob",
        "a & b | c",
        "Price: $120 (great) #nike\n\nworth it?",
        "",
        "   ",
    ];
    for s in samples {
        let once = clean_text(s);
        assert_eq!(clean_text(&once), once, "not a fixed point for {s:?}");
    }
}

#[test]
fn full_text_joins_cleaned_title_and_body() {
    assert_eq!(join_full_text("Title", "Body"), "Title Body");
    assert_eq!(join_full_text("Title", ""), "Title");
    assert_eq!(join_full_text("", "Body"), "Body");

    let raw = RawPost {
        id: "p".into(),
        title: Some("New Dunks!".into()),
        selftext: Some("Got them at https://shop.example".into()),
        ..Default::default()
    };
    let c = clean_post(&raw);
    assert_eq!(c.title_cleaned, "New Dunks!");
    assert_eq!(c.selftext_cleaned, "Got them at");
    assert_eq!(c.full_text_cleaned, "New Dunks! Got them at");
}

#[test]
fn engagement_counts_comments_twice() {
    assert_eq!(engagement_score(Some(10), Some(5)), 20);
    assert_eq!(engagement_score(None, Some(3)), 6);
    assert_eq!(engagement_score(Some(-4), None), -4);
    assert_eq!(engagement_score(None, None), 0);
}

#[test]
fn word_count_splits_on_whitespace() {
    assert_eq!(word_count("Nike shoes"), 2);
    assert_eq!(word_count(""), 0);
    assert_eq!(word_count("a b  c"), 3);
}

#[test]
fn calendar_fields_from_text_or_epoch() {
    let c = calendar_for(Some("2023-11-14 22:13:20"), None).unwrap();
    assert_eq!((c.date.as_str(), c.hour, c.weekday.as_str()), ("2023-11-14", 22, "Tuesday"));

    let c = calendar_for(Some("2023-11-14T08:00:00"), None).unwrap();
    assert_eq!(c.hour, 8);

    // unparseable text falls back to the epoch seconds
    let c = calendar_for(Some("yesterday"), Some(1_700_000_000.0)).unwrap();
    assert_eq!(c.date, "2023-11-14");

    assert!(calendar_for(Some("yesterday"), None).is_none());
    assert!(calendar_for(None, None).is_none());
}

#[test]
fn epoch_formats_as_utc_datetime() {
    assert_eq!(format_utc(1_700_000_000.0).as_deref(), Some("2023-11-14 22:13:20"));
    assert_eq!(format_utc(f64::NAN), None);
}
