use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use notification_services::{DEFAULT_TITLE, NotificationSink};
use tracing::{debug, error, info, warn};

use crate::executor::ScanExecutor;
use crate::output::notification_message;
use crate::scan_types::*;

/// Progress of one park while polling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParkState {
    /// No qualifying availability seen yet
    Pending,
    /// Availability found and reported
    Done,
}

/// Per-park states, in query order
#[derive(Debug, Clone)]
pub struct PollState {
    parks: Vec<(u64, ParkState)>,
}

impl PollState {
    /// Every park starts pending
    pub fn new(park_ids: &[u64]) -> Self {
        Self {
            parks: park_ids.iter().map(|id| (*id, ParkState::Pending)).collect(),
        }
    }

    /// Parks still pending, in query order
    pub fn pending(&self) -> Vec<u64> {
        self.parks
            .iter()
            .filter(|(_, state)| *state == ParkState::Pending)
            .map(|(id, _)| *id)
            .collect()
    }

    /// Record that a park has been found
    pub fn mark_done(&mut self, park_id: u64) {
        for (id, state) in &mut self.parks {
            if *id == park_id {
                *state = ParkState::Done;
            }
        }
    }

    /// No park left pending
    pub fn is_finished(&self) -> bool {
        self.parks.iter().all(|(_, state)| *state == ParkState::Done)
    }
}

/// Waits between poll cycles
#[async_trait]
pub trait Sleeper: Send + Sync {
    /// Suspend for `duration`
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Polling configuration
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Wait between cycles (default: 60 seconds)
    pub retry_interval: Duration,

    /// Stop after this many cycles (default: unbounded)
    pub max_cycles: Option<u32>,

    /// Title of push notifications
    pub notification_title: String,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            retry_interval: Duration::from_secs(60),
            max_cycles: None,
            notification_title: DEFAULT_TITLE.to_string(),
        }
    }
}

/// How a polling run ended
#[derive(Debug, Clone)]
pub struct PollSummary {
    /// Reports of the parks found, in the order they were found
    pub found: Vec<ParkReport>,
    /// Cycles run
    pub cycles: u32,
    /// A notification went out
    pub notified: bool,
    /// Parks still pending when the run ended
    pub pending: Vec<u64>,
}

/// Re-checks parks until they open up
pub struct Poller {
    executor: Arc<ScanExecutor>,
    sleeper: Arc<dyn Sleeper>,
    notifier: Option<Arc<dyn NotificationSink>>,
    config: PollerConfig,
}

impl Poller {
    /// Create a poller; `config` falls back to [`PollerConfig::default`]
    pub fn new(
        executor: Arc<ScanExecutor>,
        sleeper: Arc<dyn Sleeper>,
        notifier: Option<Arc<dyn NotificationSink>>,
        config: Option<PollerConfig>,
    ) -> Self {
        Self {
            executor,
            sleeper,
            notifier,
            config: config.unwrap_or_default(),
        }
    }

    /// Poll until every park is found, a notification is delivered, or
    /// `max_cycles` runs out. `on_found` sees each park once, when it opens up.
    pub async fn run<F>(&self, request: &SearchRequest, mut on_found: F) -> PollSummary
    where
        F: FnMut(&ParkReport),
    {
        self.log_quota().await;

        let mut state = PollState::new(&request.park_ids);
        let mut found = Vec::new();
        let mut cycles = 0;

        loop {
            cycles += 1;
            let pending = state.pending();
            info!(
                "Poll cycle {} at {}: {} park(s) pending",
                cycles,
                self.executor.clock().now().format("%Y-%m-%d %H:%M:%S"),
                pending.len()
            );

            for park_id in pending {
                let report = match self.executor.check_park(park_id, request).await {
                    Ok(report) => report,
                    Err(e) => {
                        warn!("Failed to check park {}, will retry: {}", park_id, e);
                        continue;
                    }
                };

                if report.result.available_count == 0 {
                    debug!("Park {} still has no availability", park_id);
                    continue;
                }

                state.mark_done(park_id);
                on_found(&report);
                let notified = self.notify(&report, request).await;
                found.push(report);

                if notified {
                    return PollSummary {
                        found,
                        cycles,
                        notified: true,
                        pending: state.pending(),
                    };
                }
            }

            if state.is_finished() {
                info!("All parks have availability");
                break;
            }
            if self.config.max_cycles.is_some_and(|max| cycles >= max) {
                info!("Stopping after {} poll cycle(s)", cycles);
                break;
            }

            debug!("Sleeping {:?} before the next cycle", self.config.retry_interval);
            self.sleeper.sleep(self.config.retry_interval).await;
        }

        PollSummary {
            found,
            cycles,
            notified: false,
            pending: state.pending(),
        }
    }

    async fn notify(&self, report: &ParkReport, request: &SearchRequest) -> bool {
        let Some(notifier) = &self.notifier else {
            return false;
        };

        let message = notification_message(report, &request.window);
        match notifier.send(&message, &self.config.notification_title).await {
            Ok(status) => {
                info!(
                    "Notification for park {} delivered: {} {}",
                    report.park_id, status.status, status.reason
                );
                true
            }
            Err(e) => {
                error!("Notification for park {} failed: {}", report.park_id, e);
                false
            }
        }
    }

    async fn log_quota(&self) {
        let Some(notifier) = &self.notifier else {
            return;
        };

        match notifier.check_quota().await {
            Ok(Some(quota)) => info!(
                "Notification quota: {} of {} remaining",
                quota.remaining.unwrap_or_default(),
                quota.limit.unwrap_or_default()
            ),
            Ok(None) => debug!("Notification quota unavailable"),
            Err(e) => warn!("Could not check notification quota: {}", e),
        }
    }
}
