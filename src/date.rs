//! Creation timestamp parsing and calendar-derived fields.

use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

/// Calendar fields derived from one timestamp.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Calendar {
    pub date: String,    // YYYY-MM-DD
    pub hour: u8,        // 0..=23
    pub weekday: String, // "Monday".."Sunday"
}

impl Calendar {
    pub fn from_datetime(dt: PrimitiveDateTime) -> Self {
        let d = dt.date();
        Self {
            date: format!("{:04}-{:02}-{:02}", d.year(), u8::from(d.month()), d.day()),
            hour: dt.hour(),
            weekday: d.weekday().to_string(),
        }
    }
}

/// Parse a textual timestamp. Accepts `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS`
/// and RFC 3339 (the offset is kept, not converted to UTC).
pub fn parse_timestamp(s: &str) -> Option<PrimitiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    let space = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    let t_sep = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
    if let Ok(dt) = PrimitiveDateTime::parse(s, space) {
        return Some(dt);
    }
    if let Ok(dt) = PrimitiveDateTime::parse(s, t_sep) {
        return Some(dt);
    }
    OffsetDateTime::parse(s, &Rfc3339)
        .ok()
        .map(|odt| PrimitiveDateTime::new(odt.date(), odt.time()))
}

/// UTC datetime for epoch seconds (fraction ignored).
pub fn from_epoch(ts: f64) -> Option<PrimitiveDateTime> {
    if !ts.is_finite() {
        return None;
    }
    let odt = OffsetDateTime::from_unix_timestamp(ts.trunc() as i64).ok()?;
    Some(PrimitiveDateTime::new(odt.date(), odt.time()))
}

/// Calendar fields from `created_date`, falling back to `created_utc`.
/// None when neither parses.
pub fn calendar_for(created_date: Option<&str>, created_utc: Option<f64>) -> Option<Calendar> {
    created_date
        .and_then(parse_timestamp)
        .or_else(|| created_utc.and_then(from_epoch))
        .map(Calendar::from_datetime)
}

/// `YYYY-MM-DD HH:MM:SS` rendering used for collected posts.
pub fn format_utc(ts: f64) -> Option<String> {
    let dt = from_epoch(ts)?;
    let fmt = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    dt.format(fmt).ok()
}
