use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::types::*;

const PUSHOVER_BASE_URL: &str = "https://api.pushover.net";

/// Default title of availability notifications.
pub const DEFAULT_TITLE: &str = "CampQuest Notification";

/// Destination for availability notifications.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Deliver `message` with `title`.
    async fn send(&self, message: &str, title: &str) -> Result<SendStatus, NotificationError>;

    /// Remaining message quota, when the sink tracks one. Advisory only.
    async fn check_quota(&self) -> Result<Option<QuotaStatus>, NotificationError> {
        Ok(None)
    }
}

/// Pushover notification service.
#[derive(Debug, Clone)]
pub struct PushoverService {
    client: Client,
    base_url: String,
    config: PushoverConfig,
}

impl PushoverService {
    /// Creates a service from `PUSHOVER_USER_KEY` / `PUSHOVER_API_TOKEN`.
    pub fn from_env() -> Result<Self, NotificationError> {
        Self::new(PushoverConfig::from_env()?)
    }

    /// Creates a service with explicit credentials.
    pub fn new(config: PushoverConfig) -> Result<Self, NotificationError> {
        Self::with_base_url(config, PUSHOVER_BASE_URL)
    }

    /// Creates a service against a different host (used by tests).
    pub fn with_base_url(
        config: PushoverConfig,
        base_url: impl Into<String>,
    ) -> Result<Self, NotificationError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| NotificationError::Http(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            config,
        })
    }

    /// Sends a message through the Pushover messages endpoint.
    pub async fn send_notification(
        &self,
        message: &str,
        title: &str,
    ) -> Result<SendStatus, NotificationError> {
        log::info!("📨 Sending Pushover notification: {}", title);

        let params = [
            ("token", self.config.api_token.as_str()),
            ("user", self.config.user_key.as_str()),
            ("message", message),
            ("title", title),
        ];

        let response = self
            .client
            .post(format!("{}/1/messages.json", self.base_url))
            .form(&params)
            .send()
            .await
            .map_err(|e| NotificationError::Http(e.to_string()))?;

        let status = response.status();
        let reason = status.canonical_reason().unwrap_or("").to_string();

        if !status.is_success() {
            log::error!("❌ Pushover returned {} {}", status.as_u16(), reason);
            return Err(NotificationError::Rejected {
                status: status.as_u16(),
                reason,
            });
        }

        Ok(SendStatus {
            status: status.as_u16(),
            reason,
        })
    }

    /// Fetches the application's message quota. `None` when Pushover does not answer 200.
    pub async fn check_limit(&self) -> Result<Option<QuotaStatus>, NotificationError> {
        let response = self
            .client
            .get(format!("{}/1/apps/limits.json", self.base_url))
            .query(&[("token", self.config.api_token.as_str())])
            .send()
            .await
            .map_err(|e| NotificationError::Http(e.to_string()))?;

        if response.status().as_u16() != 200 {
            log::warn!("Pushover quota check returned {}", response.status());
            return Ok(None);
        }

        let quota: QuotaStatus = response
            .json()
            .await
            .map_err(|e| NotificationError::DataFormat(e.to_string()))?;

        Ok(Some(quota))
    }
}

#[async_trait]
impl NotificationSink for PushoverService {
    async fn send(&self, message: &str, title: &str) -> Result<SendStatus, NotificationError> {
        self.send_notification(message, title).await
    }

    async fn check_quota(&self) -> Result<Option<QuotaStatus>, NotificationError> {
        self.check_limit().await
    }
}
