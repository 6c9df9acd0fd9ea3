//! Collection date window.

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Inclusive calendar-date range of posts to collect.
///
/// Comparisons are by calendar date only; time of day is never consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl CrawlWindow {
    /// Create a window, rejecting an inverted range.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(AppError::validation(format!(
                "window start {start} is after end {end}"
            )));
        }
        Ok(Self { start, end })
    }

    /// Whether a date falls inside the window, inclusive on both ends.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Whether a date is strictly before the window start.
    ///
    /// On a newest-first listing this is the signal that all remaining
    /// content has aged out of the window.
    pub fn is_past(&self, date: NaiveDate) -> bool {
        date < self.start
    }
}

impl Default for CrawlWindow {
    fn default() -> Self {
        let today = Local::now().date_naive();
        Self {
            start: today,
            end: today,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, d).unwrap()
    }

    #[test]
    fn contains_is_inclusive_on_both_ends() {
        let window = CrawlWindow::new(day(1), day(6)).unwrap();
        assert!(window.contains(day(1)));
        assert!(window.contains(day(3)));
        assert!(window.contains(day(6)));
        assert!(!window.contains(day(7)));
        assert!(!window.contains(NaiveDate::from_ymd_opt(2025, 9, 30).unwrap()));
    }

    #[test]
    fn is_past_only_before_start() {
        let window = CrawlWindow::new(day(1), day(6)).unwrap();
        assert!(window.is_past(NaiveDate::from_ymd_opt(2025, 9, 29).unwrap()));
        assert!(!window.is_past(day(1)));
        assert!(!window.is_past(day(7)));
    }

    #[test]
    fn new_rejects_inverted_range() {
        assert!(CrawlWindow::new(day(6), day(1)).is_err());
    }
}
