use std::collections::HashMap;

use chrono::NaiveDate;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

/// Errors raised while talking to an upstream reservation API
#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    /// Rate limited by external API
    #[error("Rate limited by external API")]
    RateLimited,

    /// Authentication failed with external service
    #[error("Authentication failed with external service")]
    AuthenticationFailed,

    /// The requested park, facility or campground does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Any other non-success answer from the API
    #[error("API error: {0}")]
    Api(String),

    /// Transport level failure
    #[error("Network error: {0}")]
    Network(String),

    /// The response body could not be decoded
    #[error("Data format error: {0}")]
    DataFormat(String),
}

impl FetchError {
    /// Map a non-success HTTP status onto the error taxonomy
    pub(crate) fn from_status(status: StatusCode, what: &str, body: &str) -> Self {
        match status.as_u16() {
            429 => FetchError::RateLimited,
            401 | 403 => FetchError::AuthenticationFailed,
            404 => FetchError::NotFound(what.to_string()),
            _ if body.is_empty() => FetchError::Api(format!("HTTP {}", status)),
            _ => FetchError::Api(format!("HTTP {} - {}", status, body)),
        }
    }
}

/// One month of recreation.gov availability for a campground
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RecGovMonth {
    /// Campsite data keyed by campsite id
    #[serde(default)]
    pub campsites: HashMap<String, CampsiteMonth>,
}

/// Per-campsite availability data inside a monthly payload
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CampsiteMonth {
    /// Status string per ISO date, e.g. `"2022-06-22T00:00:00Z" -> "Available"`
    #[serde(default)]
    pub availabilities: HashMap<String, String>,
    /// Campsite id as reported inside the entry
    pub campsite_id: Option<String>,
    /// Campsite type, e.g. `"STANDARD NONELECTRIC"`
    pub campsite_type: Option<String>,
    /// Loop the campsite belongs to
    #[serde(rename = "loop")]
    pub campsite_loop: Option<String>,
}

/// A single day slice of a ReserveCalifornia unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AvailabilitySlice {
    /// Unit id of the campsite
    pub site_key: String,
    /// Display name of the campsite
    pub site_name: String,
    /// Night this slice covers
    pub date: NaiveDate,
    /// Whether the slice can be booked
    pub is_free: bool,
}

/// Flattened ReserveCalifornia grid for one facility
#[derive(Debug, Clone, Serialize)]
pub struct ReserveCaliforniaGrid {
    /// Facility name as reported by the API
    pub facility_name: String,
    /// All slices of all units, ordered by unit then date
    pub slices: Vec<AvailabilitySlice>,
}

/// A facility inside a ReserveCalifornia place
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacilitySummary {
    /// Facility (campground) name
    pub campground: String,
    /// Facility id usable with the grid endpoint
    pub facility_id: String,
}
