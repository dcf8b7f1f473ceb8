//! # Notification Services
//!
//! This crate provides the push notification sink used when a campsite becomes available.
//! Notifications are delivered through the Pushover API.

/// Pushover client and the notification sink trait.
pub mod service;
/// Types and errors used by notification services.
pub mod types;

pub use service::{DEFAULT_TITLE, NotificationSink, PushoverService};
pub use types::{NotificationError, PushoverConfig, QuotaStatus, SendStatus};
