// src/services/dates.rs

//! Heterogeneous date-text interpretation.
//!
//! The board renders dates differently depending on recency and front-end
//! version: a bare clock time for today's posts, a relative "어제" fragment
//! for yesterday's, and one of several absolute formats for older ones.

use std::sync::OnceLock;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use regex::Regex;

/// Relative-day word for "yesterday" in the board's locale.
const YESTERDAY_MARKER: &str = "어제";

/// Interpret a date-text fragment against a reference clock.
///
/// Returns `None` when no supported rendering matches or a numeric value is
/// out of range. Callers treat `None` as "skip this entry", never as a
/// crawl-stop signal.
pub fn interpret(text: &str, now: NaiveDateTime) -> Option<NaiveDateTime> {
    let reduced = reduce(text);
    let reduced = reduced.trim();
    if reduced.is_empty() {
        return None;
    }

    clock_time(reduced, now)
        .or_else(|| relative_yesterday(reduced, now))
        .or_else(|| absolute(reduced, now))
}

/// Strip everything except digits, `:`, `.`, whitespace and Hangul.
fn reduce(text: &str) -> String {
    text.chars()
        .filter(|c| {
            c.is_ascii_digit() || matches!(c, ':' | '.') || c.is_whitespace() || is_hangul(*c)
        })
        .collect()
}

fn is_hangul(c: char) -> bool {
    matches!(c, '\u{AC00}'..='\u{D7A3}' | '\u{1100}'..='\u{11FF}' | '\u{3130}'..='\u{318F}')
}

/// `H:MM` or `HH:MM` means today at that time.
fn clock_time(text: &str, now: NaiveDateTime) -> Option<NaiveDateTime> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern =
        PATTERN.get_or_init(|| Regex::new(r"^(\d{1,2}):(\d{2})$").expect("valid pattern"));

    let caps = pattern.captures(text)?;
    let hour: u32 = caps[1].parse().ok()?;
    let minute: u32 = caps[2].parse().ok()?;
    now.date().and_hms_opt(hour, minute, 0)
}

/// A "yesterday" marker with two embedded numbers: hour, then minute.
fn relative_yesterday(text: &str, now: NaiveDateTime) -> Option<NaiveDateTime> {
    if !text.contains(YESTERDAY_MARKER) {
        return None;
    }

    static NUMBERS: OnceLock<Regex> = OnceLock::new();
    let numbers = NUMBERS.get_or_init(|| Regex::new(r"\d{1,2}").expect("valid pattern"));

    let mut found = numbers.find_iter(text);
    let hour: u32 = found.next()?.as_str().parse().ok()?;
    let minute: u32 = found.next()?.as_str().parse().ok()?;

    let yesterday = now.date() - Duration::days(1);
    yesterday.and_hms_opt(hour, minute, 0)
}

/// Absolute formats, most explicit first. `MM.DD.` borrows the current year.
fn absolute(text: &str, now: NaiveDateTime) -> Option<NaiveDateTime> {
    let compact: String = text
        .chars()
        .filter(|c| !c.is_whitespace() && !is_hangul(*c))
        .collect();

    const FORMATS: [&str; 3] = ["%Y.%m.%d.", "%Y.%m.%d", "%Y-%m-%d"];
    for format in FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(&compact, format) {
            return date.and_hms_opt(0, 0, 0);
        }
    }

    static SHORT: OnceLock<Regex> = OnceLock::new();
    let short = SHORT.get_or_init(|| Regex::new(r"^(\d{1,2})\.(\d{1,2})\.$").expect("valid pattern"));

    let caps = short.captures(&compact)?;
    let month: u32 = caps[1].parse().ok()?;
    let day: u32 = caps[2].parse().ok()?;
    NaiveDate::from_ymd_opt(now.year(), month, day)?.and_hms_opt(0, 0, 0)
}
