//! Sends the announcement to every recipient through one channel.
//!
//! Individual recipient failures don't block the others; the report keeps
//! the attempted recipients for the "sent to ..." summary.

use pedibus_core::OutboundMessage;

use crate::traits::{DispatchResult, Notifier};

pub struct Dispatcher {
    channel: Box<dyn Notifier>,
}

/// Outcome of one dispatch run.
#[derive(Debug, Default)]
pub struct DispatchReport {
    pub results: Vec<DispatchResult>,
}

impl DispatchReport {
    /// Number of recipients a send was attempted for.
    pub fn attempted(&self) -> usize {
        self.results.len()
    }

    pub fn delivered(&self) -> usize {
        self.results.iter().filter(|r| r.success).count()
    }

    pub fn failed(&self) -> impl Iterator<Item = &DispatchResult> {
        self.results.iter().filter(|r| !r.success)
    }

    /// Guide names in send order.
    pub fn recipients(&self) -> Vec<&str> {
        self.results.iter().map(|r| r.guide_name.as_str()).collect()
    }

    /// One-line summary, e.g. `SMS sent to Alice Bob (2 recipient(s))`.
    pub fn summary(&self) -> String {
        let mut names = String::new();
        for name in self.recipients() {
            names.push_str(name);
            names.push(' ');
        }
        format!("SMS sent to {}({} recipient(s))", names, self.attempted())
    }
}

impl Dispatcher {
    pub fn new(channel: Box<dyn Notifier>) -> Self {
        Self { channel }
    }

    pub fn channel_name(&self) -> &str {
        self.channel.channel_name()
    }

    /// Send every message in order and collect per-recipient results.
    pub async fn dispatch(&self, messages: &[OutboundMessage]) -> DispatchReport {
        if messages.is_empty() {
            tracing::debug!(channel = self.channel.channel_name(), "No recipients");
            return DispatchReport::default();
        }

        let mut results = Vec::with_capacity(messages.len());

        for message in messages {
            let start = std::time::Instant::now();
            let result = self.channel.send(message).await;
            let duration_ms = start.elapsed().as_millis() as u64;

            let (success, error) = match result {
                Ok(()) => {
                    tracing::info!(
                        guide = %message.guide_name,
                        channel = self.channel.channel_name(),
                        duration_ms,
                        "Message delivered"
                    );
                    (true, None)
                }
                Err(e) => {
                    tracing::warn!(
                        guide = %message.guide_name,
                        channel = self.channel.channel_name(),
                        error = %e,
                        duration_ms,
                        "Message delivery failed"
                    );
                    (false, Some(e.to_string()))
                }
            };

            results.push(DispatchResult {
                guide_name: message.guide_name.clone(),
                recipient: message.recipient.clone(),
                success,
                error,
                duration_ms,
            });
        }

        DispatchReport { results }
    }
}
