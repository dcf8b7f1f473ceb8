use serde::{Deserialize, Serialize};

/// Environment variable holding the Pushover user key.
pub const PUSHOVER_USER_KEY: &str = "PUSHOVER_USER_KEY";
/// Environment variable holding the Pushover application token.
pub const PUSHOVER_API_TOKEN: &str = "PUSHOVER_API_TOKEN";

/// Errors raised while sending notifications.
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    /// Credentials are not configured.
    #[error("PUSHOVER_USER_KEY and PUSHOVER_API_TOKEN environment variables must be set.")]
    MissingCredentials,

    /// The request never reached Pushover.
    #[error("Pushover request failed: {0}")]
    Http(String),

    /// Pushover answered with a non-success status.
    #[error("Pushover rejected the message: {status} {reason}")]
    Rejected {
        /// HTTP status code
        status: u16,
        /// HTTP reason phrase
        reason: String,
    },

    /// The response body could not be decoded.
    #[error("Invalid Pushover response: {0}")]
    DataFormat(String),
}

/// Credentials for the Pushover API.
#[derive(Debug, Clone)]
pub struct PushoverConfig {
    /// Application API token
    pub api_token: String,
    /// Recipient user key
    pub user_key: String,
}

impl PushoverConfig {
    /// Read the credentials from the environment.
    pub fn from_env() -> Result<Self, NotificationError> {
        let api_token = std::env::var(PUSHOVER_API_TOKEN).unwrap_or_default();
        let user_key = std::env::var(PUSHOVER_USER_KEY).unwrap_or_default();

        if api_token.is_empty() || user_key.is_empty() {
            log::error!("{}", NotificationError::MissingCredentials);
            return Err(NotificationError::MissingCredentials);
        }

        Ok(Self {
            api_token,
            user_key,
        })
    }
}

/// Outcome of a delivered notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SendStatus {
    /// HTTP status code returned by Pushover
    pub status: u16,
    /// HTTP reason phrase
    pub reason: String,
}

/// Monthly message quota of the Pushover application.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct QuotaStatus {
    /// Messages allowed per month
    pub limit: Option<u64>,
    /// Messages left this month
    pub remaining: Option<u64>,
    /// Unix timestamp of the next reset
    pub reset: Option<u64>,
}
