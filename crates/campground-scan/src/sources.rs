use std::sync::Arc;

use async_trait::async_trait;
use rec_gov::{FacilitySummary, RecGovClient, ReserveCaliforniaClient};
use tracing::{debug, info};

use crate::calendar::{DateWindow, month_starts};
use crate::normalizer::SourcePayload;
use crate::scan_types::{ScanError, SourceKind};

/// Everything fetched upstream for one park
#[derive(Debug, Clone)]
pub struct ParkSnapshot {
    /// Park or facility name for display
    pub display_name: String,
    /// Raw availability for the whole window
    pub payload: SourcePayload,
}

/// An upstream reservation system that can report a park's availability
#[async_trait]
pub trait CampgroundSource: Send + Sync {
    /// Which provider this is
    fn kind(&self) -> SourceKind;

    /// Fetch the raw availability covering `window` for one park
    async fn fetch_park(&self, park_id: u64, window: &DateWindow)
    -> Result<ParkSnapshot, ScanError>;
}

#[async_trait]
impl CampgroundSource for RecGovClient {
    fn kind(&self) -> SourceKind {
        SourceKind::Recreation
    }

    async fn fetch_park(
        &self,
        park_id: u64,
        window: &DateWindow,
    ) -> Result<ParkSnapshot, ScanError> {
        let mut months = Vec::new();
        for month in month_starts(window) {
            debug!("Fetching {} for park {}", month.format("%Y-%m"), park_id);
            months.push(self.get_month_availability(park_id, month).await?);
        }

        let display_name = self.get_park_name(park_id).await?;
        info!("Fetched {} month(s) for {} ({})", months.len(), display_name, park_id);

        Ok(ParkSnapshot {
            display_name,
            payload: SourcePayload::Recreation(months),
        })
    }
}

#[async_trait]
impl CampgroundSource for ReserveCaliforniaClient {
    fn kind(&self) -> SourceKind {
        SourceKind::ReserveCalifornia
    }

    async fn fetch_park(
        &self,
        park_id: u64,
        window: &DateWindow,
    ) -> Result<ParkSnapshot, ScanError> {
        let months = month_starts(window).len() as u32;
        let grid = self
            .get_availability_grid(park_id, window.start(), months)
            .await?;
        info!(
            "Fetched {} slice(s) for {} ({}), book at {}",
            grid.slices.len(),
            grid.facility_name,
            park_id,
            self.campground_url(park_id)
        );

        Ok(ParkSnapshot {
            display_name: grid.facility_name,
            payload: SourcePayload::ReserveCalifornia(grid.slices),
        })
    }
}

/// Build the HTTP client for a provider
pub fn source_for(kind: SourceKind) -> Result<Arc<dyn CampgroundSource>, ScanError> {
    let source: Arc<dyn CampgroundSource> = match kind {
        SourceKind::Recreation => Arc::new(RecGovClient::new()?),
        SourceKind::ReserveCalifornia => Arc::new(ReserveCaliforniaClient::new()?),
    };
    Ok(source)
}

/// ReserveCalifornia facilities of the place best matching `query`, with the ids `--parks` expects
pub async fn search_facilities(
    client: &ReserveCaliforniaClient,
    query: &str,
) -> Result<Vec<FacilitySummary>, ScanError> {
    let facilities = client.get_facility_ids(query).await?;
    info!("Found {} facilities for '{}'", facilities.len(), query);
    Ok(facilities)
}
