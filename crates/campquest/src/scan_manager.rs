use std::sync::Arc;

use campground_scan::{
    ParkReport, Poller, PollerConfig, ScanError, ScanExecutor, SearchRequest, TokioSleeper,
    format_facilities, generate_human_output, generate_json_output, notification_message,
    search_facilities, source_for,
};
use notification_services::{DEFAULT_TITLE, NotificationSink, PushoverService};
use rec_gov::ReserveCaliforniaClient;

/// How results are printed
#[derive(Debug, Clone, Copy)]
pub struct OutputOptions {
    /// JSON instead of text
    pub json: bool,
    /// Site-level detail in text output
    pub show_campsite_info: bool,
}

/// Wires the upstream client, executor and notifier for one invocation
pub struct ScanManager {
    executor: Arc<ScanExecutor>,
    notifier: Option<Arc<dyn NotificationSink>>,
    output: OutputOptions,
}

impl ScanManager {
    /// Build the clients for `request`. Pushover credentials are only read when `notify` is set.
    pub fn new(
        request: &SearchRequest,
        notify: bool,
        output: OutputOptions,
    ) -> Result<Self, ScanError> {
        let source = source_for(request.source)?;
        log::info!("🏕️ Using {} availability", source.kind());

        let notifier: Option<Arc<dyn NotificationSink>> = if notify {
            let service = PushoverService::from_env()?;
            log::info!("📨 Pushover notifications enabled");
            Some(Arc::new(service))
        } else {
            None
        };

        Ok(Self {
            executor: Arc::new(ScanExecutor::new(source)),
            notifier,
            output,
        })
    }

    /// Check every park once and print the report
    pub async fn run_once(&self, request: &SearchRequest) -> Result<bool, ScanError> {
        let reports = self.executor.run_campsite_check(request).await?;
        let (output, has_availabilities) = self.render(&reports, request)?;
        println!("{}", output);

        if has_availabilities {
            self.notify_available(&reports, request).await;
        }

        log::info!("Success! Output generated (availability: {})", has_availabilities);
        Ok(has_availabilities)
    }

    /// Poll until availability shows up, printing each park as it opens
    pub async fn run_polling(
        &self,
        request: &SearchRequest,
        config: PollerConfig,
    ) -> Result<bool, ScanError> {
        let poller = Poller::new(
            self.executor.clone(),
            Arc::new(TokioSleeper),
            self.notifier.clone(),
            Some(config),
        );

        let mut render_error = None;
        let summary = poller
            .run(request, |report| {
                match self.render(std::slice::from_ref(report), request) {
                    Ok((output, _)) => println!("{}", output),
                    Err(e) => render_error = Some(e),
                }
            })
            .await;

        if let Some(e) = render_error {
            return Err(e);
        }

        log::info!(
            "Polling finished after {} cycle(s): {} park(s) found, {} pending",
            summary.cycles,
            summary.found.len(),
            summary.pending.len()
        );
        Ok(!summary.found.is_empty())
    }

    fn render(
        &self,
        reports: &[ParkReport],
        request: &SearchRequest,
    ) -> Result<(String, bool), ScanError> {
        if self.output.json {
            generate_json_output(reports)
        } else {
            Ok(generate_human_output(
                reports,
                &request.window,
                self.output.show_campsite_info,
            ))
        }
    }

    async fn notify_available(&self, reports: &[ParkReport], request: &SearchRequest) {
        let Some(notifier) = &self.notifier else {
            return;
        };

        match notifier.check_quota().await {
            Ok(Some(quota)) => log::info!(
                "Pushover quota: {} of {} remaining",
                quota.remaining.unwrap_or_default(),
                quota.limit.unwrap_or_default()
            ),
            Ok(None) => log::debug!("Pushover quota unavailable"),
            Err(e) => log::warn!("Could not check Pushover quota: {}", e),
        }

        for report in reports.iter().filter(|r| r.result.available_count > 0) {
            let message = notification_message(report, &request.window);
            if let Err(e) = notifier.send(&message, DEFAULT_TITLE).await {
                log::error!("❌ Failed to notify about park {}: {}", report.park_id, e);
            }
        }
    }
}

/// Print the ReserveCalifornia facilities matching a campground name
pub async fn list_facilities(query: &str) -> Result<(), ScanError> {
    let client = ReserveCaliforniaClient::new()?;
    let facilities = search_facilities(&client, query).await?;
    println!("{}", format_facilities(query, &facilities));
    Ok(())
}
