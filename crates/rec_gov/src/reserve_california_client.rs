use std::collections::HashMap;
use std::time::Duration;

use chrono::{Months, NaiveDate, Utc};
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error, info};

use crate::types::{AvailabilitySlice, FacilitySummary, FetchError, ReserveCaliforniaGrid};

const RESERVE_CALIFORNIA_BASE_URL: &str = "https://calirdr.usedirect.com";
const SEARCH_ENDPOINT: &str = "/rdr/rdr/fd/citypark/namecontains/";
const PLACE_ENDPOINT: &str = "/rdr/rdr/search/place";
const AVAILABILITY_ENDPOINT: &str = "/rdr/rdr/search/grid";

/// Booking page for ReserveCalifornia campgrounds
pub const CAMPGROUND_URL: &str = "https://www.reservecalifornia.com/";

const REQUEST_DATE_FORMAT: &str = "%m-%d-%Y";

/// Client for the ReserveCalifornia search API
pub struct ReserveCaliforniaClient {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PlaceSearchHit {
    name: String,
    place_id: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PlaceResponse {
    selected_place: Option<SelectedPlace>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SelectedPlace {
    #[serde(default)]
    facilities: HashMap<String, PlaceFacility>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PlaceFacility {
    name: String,
    facility_id: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GridResponse {
    facility: GridFacility,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GridFacility {
    name: Option<String>,
    #[serde(default)]
    units: HashMap<String, GridUnit>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GridUnit {
    unit_id: i64,
    name: String,
    #[serde(default)]
    slices: HashMap<String, GridSlice>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GridSlice {
    date: String,
    is_free: bool,
}

impl ReserveCaliforniaClient {
    /// Create a new ReserveCalifornia client
    pub fn new() -> Result<Self, FetchError> {
        Self::with_base_url(RESERVE_CALIFORNIA_BASE_URL)
    }

    /// Create a client against a different host (used by tests)
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| FetchError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Resolve a campground name to its place id, using the top search hit
    pub async fn get_campground_id(&self, query: &str) -> Result<i64, FetchError> {
        let url = format!(
            "{}{}{}",
            self.base_url,
            SEARCH_ENDPOINT,
            urlencoding::encode(query)
        );

        let hits: Vec<PlaceSearchHit> = self.send_json(self.client.get(&url), query).await?;

        let Some(top_hit) = hits.into_iter().next() else {
            error!("Could not find campground: {}", query);
            return Err(FetchError::NotFound(format!(
                "Campground: {} not found. Try being more specific.",
                query
            )));
        };

        info!(
            "Found campground: {} (campground id: {})",
            top_hit.name, top_hit.place_id
        );
        Ok(top_hit.place_id)
    }

    /// List the facilities of the place best matching `query`, sorted by name
    pub async fn get_facility_ids(&self, query: &str) -> Result<Vec<FacilitySummary>, FetchError> {
        let place_id = self.get_campground_id(query).await?;
        let url = format!("{}{}", self.base_url, PLACE_ENDPOINT);
        let body = serde_json::json!({
            "PlaceId": place_id,
            "StartDate": Utc::now().date_naive().format(REQUEST_DATE_FORMAT).to_string(),
        });

        let response: PlaceResponse = self
            .send_json(self.client.post(&url).json(&body), query)
            .await?;

        let Some(place) = response.selected_place else {
            error!("Could not find facilities in {}", query);
            return Err(FetchError::NotFound(format!(
                "Could not find facilities in {} - try being more specific.",
                query
            )));
        };

        let mut facilities: Vec<FacilitySummary> = place
            .facilities
            .into_values()
            .map(|facility| FacilitySummary {
                campground: facility.name,
                facility_id: facility.facility_id.to_string(),
            })
            .collect();
        facilities.sort_by(|a, b| a.campground.cmp(&b.campground));

        Ok(facilities)
    }

    /// Fetch the availability grid of a facility for `months` months from `start_date`
    pub async fn get_availability_grid(
        &self,
        facility_id: u64,
        start_date: NaiveDate,
        months: u32,
    ) -> Result<ReserveCaliforniaGrid, FetchError> {
        let end_date = start_date
            .checked_add_months(Months::new(months))
            .ok_or_else(|| FetchError::DataFormat(format!("Invalid month count: {}", months)))?;

        let url = format!("{}{}", self.base_url, AVAILABILITY_ENDPOINT);
        let body = serde_json::json!({
            "FacilityId": facility_id.to_string(),
            "StartDate": start_date.format(REQUEST_DATE_FORMAT).to_string(),
            "EndDate": end_date.format(REQUEST_DATE_FORMAT).to_string(),
        });

        debug!("Requesting grid for facility {}: {}", facility_id, body);

        let what = format!("facility {}", facility_id);
        let response: GridResponse = self
            .send_json(self.client.post(&url).json(&body), &what)
            .await?;

        let facility_name = match response.facility.name {
            Some(name) if !name.is_empty() => name,
            _ => {
                error!("Could not find campground with ID: {}", facility_id);
                return Err(FetchError::NotFound(format!(
                    "Could not find campground with ID: {}",
                    facility_id
                )));
            }
        };

        info!(
            "Found campground: {} (campground id: {})",
            facility_name, facility_id
        );

        let mut slices = Vec::new();
        for unit in response.facility.units.into_values() {
            for slice in unit.slices.into_values() {
                let day = slice.date.get(..10).unwrap_or(&slice.date);
                let date = NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(|e| {
                    FetchError::DataFormat(format!("Invalid slice date {}: {}", slice.date, e))
                })?;
                slices.push(AvailabilitySlice {
                    site_key: unit.unit_id.to_string(),
                    site_name: unit.name.clone(),
                    date,
                    is_free: slice.is_free,
                });
            }
        }
        slices.sort_by(|a, b| {
            (a.site_key.len(), &a.site_key, a.date).cmp(&(b.site_key.len(), &b.site_key, b.date))
        });

        Ok(ReserveCaliforniaGrid {
            facility_name,
            slices,
        })
    }

    /// Booking page for a facility. ReserveCalifornia has no per-facility deep link.
    pub fn campground_url(&self, _facility_id: u64) -> &'static str {
        CAMPGROUND_URL
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        what: &str,
    ) -> Result<T, FetchError> {
        let response = request
            .send()
            .await
            .map_err(|e| FetchError::Network(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::from_status(status, what, &body));
        }

        response
            .json()
            .await
            .map_err(|e| FetchError::DataFormat(format!("Failed to parse response: {}", e)))
    }
}
