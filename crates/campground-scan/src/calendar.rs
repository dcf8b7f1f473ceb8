use std::collections::BTreeSet;

use chrono::{Datelike, Months, NaiveDate, NaiveDateTime, Weekday};

use crate::scan_types::ScanError;

/// Format of dates given on the command line and in the banner
pub const INPUT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Format of range boundaries in human and JSON output
pub const DISPLAY_DATE_FORMAT: &str = "%m/%d/%Y";

/// Stay window: nights from `start` up to, not including, `end`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateWindow {
    /// Build a window, rejecting empty or inverted ranges
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ScanError> {
        if end <= start {
            return Err(ScanError::InvalidDateRange);
        }
        Ok(Self { start, end })
    }

    /// First night
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Checkout day
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of nights in the window
    pub fn num_nights(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    /// Every night of the window, latest first
    pub fn nights(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let start = self.start;
        let mut cursor = self.end.pred_opt();
        std::iter::from_fn(move || {
            let current = cursor.filter(|day| *day >= start)?;
            cursor = current.pred_opt();
            Some(current)
        })
    }
}

/// Parse a `YYYY-MM-DD` argument
pub fn parse_input_date(value: &str) -> Result<NaiveDate, ScanError> {
    NaiveDate::parse_from_str(value.trim(), INPUT_DATE_FORMAT)
        .map_err(|_| ScanError::InvalidDate(value.to_string()))
}

/// Render a date as `YYYY-MM-DD`
pub fn format_input_date(date: NaiveDate) -> String {
    date.format(INPUT_DATE_FORMAT).to_string()
}

/// Render a date as `MM/DD/YYYY`
pub fn format_display(date: NaiveDate) -> String {
    date.format(DISPLAY_DATE_FORMAT).to_string()
}

/// Parse an upstream availability key such as `2022-06-22T00:00:00Z`.
///
/// Only the calendar day matters; any time part is discarded.
pub fn parse_upstream_date(value: &str) -> Result<NaiveDate, ScanError> {
    if let Ok(timestamp) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%SZ") {
        return Ok(timestamp.date());
    }
    value
        .get(..10)
        .and_then(|day| NaiveDate::parse_from_str(day, INPUT_DATE_FORMAT).ok())
        .ok_or_else(|| ScanError::DataFormat(format!("Unrecognized availability date: {}", value)))
}

/// First day of every month from the month of `start` through the month of `end`
pub fn month_starts(window: &DateWindow) -> Vec<NaiveDate> {
    let mut months = Vec::new();
    let mut cursor = first_of_month(window.start);

    while let Some(month) = cursor {
        if month > window.end {
            break;
        }
        months.push(month);
        cursor = month.checked_add_months(Months::new(1));
    }
    months
}

fn first_of_month(date: NaiveDate) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1)
}

/// Saturday or Sunday
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Nights of the window eligible for a stay
pub fn candidate_nights(window: &DateWindow, weekends_only: bool) -> BTreeSet<NaiveDate> {
    window
        .nights()
        .filter(|night| !weekends_only || is_weekend(*night))
        .collect()
}
