//! Notification port
//!
//! Outbound messages to students. Delivery is best-effort: callers log failures
//! and never propagate them.

use async_trait::async_trait;

use crate::error::NotificationError;

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send a plain-text message
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotificationError>;
}
