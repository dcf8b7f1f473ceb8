use std::time::Duration;

use chrono::{Datelike, NaiveDate};
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::types::{FetchError, RecGovMonth};

const RECREATION_BASE_URL: &str = "https://www.recreation.gov";

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Client for interacting with the recreation.gov camps API
pub struct RecGovClient {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct CampgroundResponse {
    campground: CampgroundDetails,
}

#[derive(Debug, Deserialize)]
struct CampgroundDetails {
    facility_name: String,
}

impl RecGovClient {
    /// Create a new recreation.gov API client
    pub fn new() -> Result<Self, FetchError> {
        Self::with_base_url(RECREATION_BASE_URL)
    }

    /// Create a client against a different host (used by tests)
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| FetchError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Fetch one month of availability for a campground.
    ///
    /// `month` may be any day of the month; the request always starts at the 1st.
    pub async fn get_month_availability(
        &self,
        park_id: u64,
        month: NaiveDate,
    ) -> Result<RecGovMonth, FetchError> {
        let month_start = NaiveDate::from_ymd_opt(month.year(), month.month(), 1)
            .ok_or_else(|| FetchError::DataFormat(format!("Invalid month: {}", month)))?;

        let url = format!(
            "{}/api/camps/availability/campground/{}/month",
            self.base_url, park_id
        );
        let start_date_param = format!("{}T00:00:00.000Z", month_start.format("%Y-%m-%d"));

        debug!("Making request to: {}?start_date={}", url, start_date_param);

        self.get_json(&url, &[("start_date", start_date_param)], &format!("campground {}", park_id))
            .await
    }

    /// Look up the display name of a campground
    pub async fn get_park_name(&self, park_id: u64) -> Result<String, FetchError> {
        let url = format!("{}/api/camps/campgrounds/{}", self.base_url, park_id);

        let response: CampgroundResponse = self
            .get_json(&url, &[], &format!("campground {}", park_id))
            .await?;

        Ok(response.campground.facility_name)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, String)],
        what: &str,
    ) -> Result<T, FetchError> {
        let response = self
            .client
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(|e| FetchError::Network(format!("HTTP request failed: {}", e)))?;

        debug!("API response status: {}", response.status());

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!("API request failed with status {}: {}", status, body);
            return Err(FetchError::from_status(status, what, &body));
        }

        response
            .json()
            .await
            .map_err(|e| FetchError::DataFormat(format!("Failed to parse response: {}", e)))
    }
}
