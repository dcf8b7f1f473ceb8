use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use notification_services::NotificationError;
use rec_gov::FetchError;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::calendar::{DateWindow, format_display};

/// Identifier of a campsite as reported by the upstream source.
///
/// Numeric ids order numerically and serialize as JSON integers; anything else
/// orders after them, lexicographically, and serializes as a string. Numeric ids
/// with leading zeros stay strings so they never collide with their integer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SiteId(String);

impl SiteId {
    /// Wrap an upstream identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Raw identifier
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The identifier coerced to an integer, when it is one
    pub fn as_number(&self) -> Option<u64> {
        self.0.parse().ok()
    }
}

impl Ord for SiteId {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.as_number(), other.as_number()) {
            (Some(a), Some(b)) => a.cmp(&b).then_with(|| self.0.cmp(&other.0)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for SiteId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for SiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SiteId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl Serialize for SiteId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.as_number() {
            Some(number) if number.to_string() == self.0 => serializer.serialize_u64(number),
            _ => serializer.serialize_str(&self.0),
        }
    }
}

/// A bookable stay covering the nights `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NightRange {
    /// First night of the stay
    pub start: NaiveDate,
    /// Checkout day, not a night stayed
    pub end: NaiveDate,
}

impl NightRange {
    /// Number of nights in the stay
    pub fn nights(&self) -> i64 {
        (self.end - self.start).num_days()
    }
}

impl Serialize for NightRange {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut range = serializer.serialize_struct("NightRange", 2)?;
        range.serialize_field("start", &format_display(self.start))?;
        range.serialize_field("end", &format_display(self.end))?;
        range.end()
    }
}

/// Availability summary for one park
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParkResult {
    /// Sites with at least one qualifying range
    pub available_count: usize,
    /// Sites known for the park after exclusions
    pub total_count: usize,
    /// Qualifying ranges per site
    pub ranges_by_site: BTreeMap<SiteId, Vec<NightRange>>,
    /// Park name for display
    pub display_name: String,
}

/// Result of checking one park at a point in time
#[derive(Debug, Clone, Serialize)]
pub struct ParkReport {
    /// Park or facility id as queried
    pub park_id: u64,
    /// Availability summary
    pub result: ParkResult,
    /// When the upstream data was fetched
    pub checked_at: DateTime<Utc>,
}

/// Upstream reservation provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum SourceKind {
    /// recreation.gov
    #[default]
    Recreation,
    /// ReserveCalifornia
    ReserveCalifornia,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Recreation => f.write_str("recreation"),
            SourceKind::ReserveCalifornia => f.write_str("reserve_california"),
        }
    }
}

/// Campsite filters applied while normalizing upstream data
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CampsiteFilter {
    /// Exact campsite type to keep, e.g. `"STANDARD NONELECTRIC"`
    pub campsite_type: Option<String>,
    /// Campsite ids to keep; empty keeps every site
    pub campsite_ids: BTreeSet<String>,
    /// Site ids to drop entirely
    pub excluded_site_ids: BTreeSet<String>,
}

/// A complete availability query
#[derive(Debug, Clone, Validate)]
#[validate(schema(function = "validate_search_request"))]
pub struct SearchRequest {
    /// Parks to check, in output order
    #[validate(length(
        min = 1,
        message = "You must provide at least one park ID using --parks or --stdin."
    ))]
    pub park_ids: Vec<u64>,

    /// Stay window
    pub window: DateWindow,

    /// Minimum consecutive nights; `None` means the whole window
    #[validate(range(min = 1, message = "Not a valid number of nights"))]
    pub nights: Option<i64>,

    /// Campsite filters
    pub filter: CampsiteFilter,

    /// Only count Saturday and Sunday nights
    pub weekends_only: bool,

    /// Upstream provider
    pub source: SourceKind,
}

impl SearchRequest {
    /// Validate the request, converting failures into a [`ScanError`]
    pub fn validated(self) -> Result<Self, ScanError> {
        self.validate()?;
        Ok(self)
    }
}

fn validate_search_request(request: &SearchRequest) -> Result<(), ValidationError> {
    if request.park_ids.len() > 1 && !request.filter.campsite_ids.is_empty() {
        let mut error = ValidationError::new("campsite_ids_with_multiple_parks");
        error.message = Some("--campsite-ids can only be used with a single park ID.".into());
        return Err(error);
    }
    Ok(())
}

/// Custom error type for scan operations
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// A date could not be parsed
    #[error("Not a valid date: '{0}'.")]
    InvalidDate(String),

    /// Invalid date range
    #[error("Invalid date range: end date must be after start date")]
    InvalidDateRange,

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Upstream API error
    #[error("Upstream error: {0}")]
    Fetch(#[from] FetchError),

    /// Notification error
    #[error("Notification error: {0}")]
    Notification(#[from] NotificationError),

    /// Data format error
    #[error("Data format error: {0}")]
    DataFormat(String),

    /// I/O error, e.g. while reading an exclusion file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Output serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<ValidationErrors> for ScanError {
    fn from(errors: ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_values()
            .flat_map(|errors| errors.iter())
            .map(|error| match &error.message {
                Some(message) => message.to_string(),
                None => error.code.to_string(),
            })
            .collect();
        messages.sort();
        ScanError::Validation(messages.join("; "))
    }
}
