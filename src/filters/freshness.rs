// src/filters/freshness.rs
//! Recency window over free-text `posted_at` values. Fail-open: anything that
//! cannot be parsed is treated as fresh.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

#[derive(Debug, Clone, Copy)]
pub struct FreshnessFilter {
    window: Duration,
}

impl FreshnessFilter {
    pub fn new(window: Duration) -> Self {
        Self { window }
    }

    /// An out-of-range window saturates, which admits everything parseable.
    pub fn from_hours(hours: i64) -> Self {
        Self::new(Duration::try_hours(hours).unwrap_or(Duration::MAX))
    }

    /// Reject only a timestamp that parses and is older than `now - window`.
    pub fn is_fresh(&self, posted_at: &str, now: DateTime<Utc>) -> bool {
        let Some(cutoff) = now.checked_sub_signed(self.window) else {
            return true;
        };
        match parse_posted_at(posted_at, now) {
            Some(ts) => ts >= cutoff,
            None => true,
        }
    }
}

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Best-effort parse of the timestamp shapes the boards emit. `now` anchors the
/// relative phrases ("Posted 3 Days Ago").
pub fn parse_posted_at(raw: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|n| n.and_utc());
    }

    parse_relative(s, now)
}

fn parse_relative(s: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    static RE_AGO: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"(\d+)\+?\s*(minute|min|hour|hr|day|week|month)s?\s+ago").unwrap()
    });

    let lower = s.to_lowercase();
    if lower.contains("just posted") || lower.contains("today") || lower.contains("just now") {
        return Some(now);
    }
    if lower.contains("yesterday") {
        return now.checked_sub_signed(Duration::days(1));
    }

    // board text is untrusted: any count chrono cannot represent is unparseable
    let caps = RE_AGO.captures(&lower)?;
    let n: i64 = caps.get(1)?.as_str().parse().ok()?;
    let span = match caps.get(2)?.as_str() {
        "minute" | "min" => Duration::try_minutes(n),
        "hour" | "hr" => Duration::try_hours(n),
        "day" => Duration::try_days(n),
        "week" => Duration::try_weeks(n),
        "month" => n.checked_mul(30).and_then(Duration::try_days),
        _ => None,
    }?;
    now.checked_sub_signed(span)
}
