//! Notifier that logs instead of sending.

use std::sync::Mutex;

use pedibus_core::OutboundMessage;

use crate::traits::{Notifier, NotifyError};

/// Records every message it is asked to send. Used for `--dry-run` and
/// when no gateway is configured.
#[derive(Debug, Default)]
pub struct DryRunNotifier {
    sent: Mutex<Vec<OutboundMessage>>,
}

impl DryRunNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<OutboundMessage> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl Notifier for DryRunNotifier {
    async fn send(&self, message: &OutboundMessage) -> Result<(), NotifyError> {
        tracing::info!(
            recipient = %message.recipient,
            guide = %message.guide_name,
            "dry run: message not sent"
        );
        self.sent
            .lock()
            .map_err(|_| NotifyError::Config("dry-run log poisoned".to_string()))?
            .push(message.clone());
        Ok(())
    }

    fn channel_name(&self) -> &str {
        "dry-run"
    }
}
