use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::aggregator::evaluate;
use crate::normalizer::normalize;
use crate::scan_types::*;
use crate::sources::CampgroundSource;

/// Source of the current time
pub trait Clock: Send + Sync {
    /// Current UTC time
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Checks parks against a search request
pub struct ScanExecutor {
    source: Arc<dyn CampgroundSource>,
    clock: Arc<dyn Clock>,
}

impl ScanExecutor {
    /// Executor over `source`, stamping reports with the wall clock
    pub fn new(source: Arc<dyn CampgroundSource>) -> Self {
        Self::with_clock(source, Arc::new(SystemClock))
    }

    /// Executor with an explicit clock
    pub fn with_clock(source: Arc<dyn CampgroundSource>, clock: Arc<dyn Clock>) -> Self {
        Self { source, clock }
    }

    /// The executor's clock
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Fetch, normalize and evaluate a single park
    pub async fn check_park(
        &self,
        park_id: u64,
        request: &SearchRequest,
    ) -> Result<ParkReport, ScanError> {
        debug!("Checking park {} on {}", park_id, self.source.kind());

        let snapshot = self.source.fetch_park(park_id, &request.window).await?;
        let checked_at = self.clock.now();

        let availability = normalize(&snapshot.payload, &request.filter)?;
        let evaluation = evaluate(
            &availability,
            &request.window,
            request.nights,
            request.weekends_only,
        );

        info!(
            "{} ({}): {} of {} site(s) available",
            snapshot.display_name, park_id, evaluation.available_count, evaluation.total_count
        );

        Ok(ParkReport {
            park_id,
            result: ParkResult {
                available_count: evaluation.available_count,
                total_count: evaluation.total_count,
                ranges_by_site: evaluation.ranges_by_site,
                display_name: snapshot.display_name,
            },
            checked_at,
        })
    }

    /// Check every park of the request, in order. The first failure aborts.
    pub async fn run_campsite_check(
        &self,
        request: &SearchRequest,
    ) -> Result<Vec<ParkReport>, ScanError> {
        let mut reports = Vec::with_capacity(request.park_ids.len());
        for park_id in &request.park_ids {
            reports.push(self.check_park(*park_id, request).await?);
        }
        Ok(reports)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::{NaiveDate, TimeZone};
    use rec_gov::{CampsiteMonth, FetchError, RecGovMonth};

    use super::*;
    use crate::calendar::DateWindow;
    use crate::normalizer::SourcePayload;
    use crate::sources::ParkSnapshot;

    pub(crate) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    pub(crate) struct FixedClock;

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            Utc.with_ymd_and_hms(2022, 6, 1, 8, 0, 0).unwrap()
        }
    }

    /// Serves canned responses per park, one per call; the last one repeats
    #[derive(Default)]
    pub(crate) struct FakeSource {
        responses: Mutex<HashMap<u64, Vec<Result<Vec<(&'static str, Vec<NaiveDate>)>, ()>>>>,
        pub(crate) calls: Mutex<Vec<u64>>,
    }

    impl FakeSource {
        pub(crate) fn respond(self, park_id: u64, sites: Vec<(&'static str, Vec<NaiveDate>)>) -> Self {
            self.responses.lock().unwrap().entry(park_id).or_default().push(Ok(sites));
            self
        }

        pub(crate) fn fail(self, park_id: u64) -> Self {
            self.responses.lock().unwrap().entry(park_id).or_default().push(Err(()));
            self
        }

        pub(crate) fn calls(&self) -> Vec<u64> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CampgroundSource for FakeSource {
        fn kind(&self) -> SourceKind {
            SourceKind::Recreation
        }

        async fn fetch_park(
            &self,
            park_id: u64,
            _window: &DateWindow,
        ) -> Result<ParkSnapshot, ScanError> {
            self.calls.lock().unwrap().push(park_id);

            let mut responses = self.responses.lock().unwrap();
            let queue = responses
                .get_mut(&park_id)
                .ok_or_else(|| FetchError::NotFound(format!("campground {}", park_id)))?;
            let response = if queue.len() > 1 {
                queue.remove(0)
            } else {
                queue[0].clone()
            };
            let sites = response.map_err(|_| FetchError::Network("connection reset".into()))?;

            let campsites = sites
                .into_iter()
                .map(|(id, dates)| {
                    let availabilities = dates
                        .iter()
                        .map(|d| (format!("{}T00:00:00Z", d.format("%Y-%m-%d")), "Available".to_string()))
                        .collect();
                    let site = CampsiteMonth {
                        availabilities,
                        campsite_id: Some(id.to_string()),
                        ..Default::default()
                    };
                    (id.to_string(), site)
                })
                .collect();

            Ok(ParkSnapshot {
                display_name: format!("Park {}", park_id),
                payload: SourcePayload::Recreation(vec![RecGovMonth { campsites }]),
            })
        }
    }

    pub(crate) fn request(park_ids: Vec<u64>, start: NaiveDate, end: NaiveDate) -> SearchRequest {
        SearchRequest {
            park_ids,
            window: DateWindow::new(start, end).unwrap(),
            nights: None,
            filter: CampsiteFilter::default(),
            weekends_only: false,
            source: SourceKind::Recreation,
        }
    }
}
