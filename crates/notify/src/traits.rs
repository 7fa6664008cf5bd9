//! Notifier trait definition and shared error types.

use pedibus_core::OutboundMessage;

/// Errors that can occur during message delivery.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Gateway rejected message: {0}")]
    Rejected(String),
}

/// Trait for SMS transport implementations.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one message to its recipient.
    async fn send(&self, message: &OutboundMessage) -> Result<(), NotifyError>;

    /// Human-readable name for this channel (e.g., "sms-webhook").
    fn channel_name(&self) -> &str;
}

/// Result of sending to a single recipient.
#[derive(Debug)]
pub struct DispatchResult {
    pub guide_name: String,
    pub recipient: String,
    pub success: bool,
    pub error: Option<String>,
    pub duration_ms: u64,
}
