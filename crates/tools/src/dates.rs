//! Best-effort natural-language date parsing.
//!
//! `parse_date` never errors: it returns the parsed timestamp or
//! `None`. Recognized forms are ISO datetimes, a list of common date
//! formats, and a date embedded anywhere in a longer phrase ("finish
//! the report by 23 Feb 2026").

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use std::sync::OnceLock;
use taskmind_core::task::DueFilter;

/// Date-only formats tried in order.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d %b %Y",
    "%d %B %Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%b %d %Y",
];

/// Parse a date from free text. Best-effort, never errors.
pub fn parse_date(text: &str) -> Option<NaiveDateTime> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    // Full ISO datetime first.
    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt);
    }

    if let Some(date) = parse_exact(trimmed) {
        return date.and_hms_opt(0, 0, 0);
    }

    // Fall back to extracting an embedded date from a longer phrase.
    extract_date(trimmed).and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Interpret a due-date filter argument: one of the relative keywords,
/// or an explicit date. Unrecognized input is `None`, never an error.
pub fn parse_due_filter(text: &str) -> Option<DueFilter> {
    match text.trim().to_lowercase().as_str() {
        "overdue" => Some(DueFilter::Overdue),
        "today" => Some(DueFilter::Today),
        "this week" => Some(DueFilter::ThisWeek),
        "next week" => Some(DueFilter::NextWeek),
        "this month" => Some(DueFilter::ThisMonth),
        _ => parse_date(text).map(|dt| DueFilter::On(dt.date())),
    }
}

fn parse_exact(text: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
}

/// Find a date written somewhere inside `text`.
fn extract_date(text: &str) -> Option<NaiveDate> {
    for pattern in date_patterns() {
        if let Some(m) = pattern.find(text) {
            if let Some(date) = parse_exact(m.as_str()) {
                return Some(date);
            }
        }
    }
    None
}

fn date_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            // 02/23/2026 or 02-23-2026
            r"\b\d{1,2}[/-]\d{1,2}[/-]\d{4}\b",
            // 23 Feb 2026, 23 February 2026
            r"(?i)\b\d{1,2}\s+(?:jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\s+\d{4}\b",
            // Feb 23, 2026 / February 23 2026
            r"(?i)\b(?:jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\s+\d{1,2},?\s*\d{4}\b",
            // 2026-02-23
            r"\b\d{4}-\d{2}-\d{2}\b",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("static date pattern"))
        .collect()
    })
}
