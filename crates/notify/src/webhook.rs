//! HTTP SMS gateway notifier.
//!
//! Posts one JSON payload per recipient (`{"to": ..., "message": ...}`) to a
//! configured gateway URL with an optional bearer token.

use pedibus_core::OutboundMessage;

use crate::traits::{Notifier, NotifyError};

/// Delivers messages to an SMS gateway over HTTP.
///
/// Environment variable references (`${VAR_NAME}`) in the URL and token are
/// resolved at construction time.
#[derive(Debug)]
pub struct SmsWebhookNotifier {
    /// Target URL (env vars already resolved).
    url: String,
    token: Option<String>,
    /// Shared HTTP client (connection pooling).
    client: reqwest::Client,
}

#[derive(serde::Serialize)]
struct SmsPayload<'a> {
    to: &'a str,
    message: &'a str,
}

impl SmsWebhookNotifier {
    /// Create a new gateway notifier. Missing env vars produce
    /// [`NotifyError::Config`].
    pub fn new(url: String, token: Option<String>) -> Result<Self, NotifyError> {
        let resolved_url = resolve_env_vars(&url)?;
        if resolved_url.is_empty() {
            return Err(NotifyError::Config(
                "SMS gateway URL must not be empty".to_string(),
            ));
        }

        let token = token.as_deref().map(resolve_env_vars).transpose()?;

        Ok(Self {
            url: resolved_url,
            token,
            client: reqwest::Client::new(),
        })
    }
}

#[async_trait::async_trait]
impl Notifier for SmsWebhookNotifier {
    async fn send(&self, message: &OutboundMessage) -> Result<(), NotifyError> {
        let payload = SmsPayload {
            to: &message.recipient,
            message: &message.text,
        };

        let mut request = self.client.post(&self.url).json(&payload);
        if let Some(ref token) = self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            tracing::warn!(
                url = %self.url,
                %status,
                body = %body_text,
                "SMS gateway returned non-2xx status"
            );
            return Err(NotifyError::Rejected(format!(
                "gateway returned {status}: {body_text}"
            )));
        }

        tracing::debug!(
            recipient = %message.recipient,
            status = %status,
            "SMS handed to gateway"
        );

        Ok(())
    }

    fn channel_name(&self) -> &str {
        "sms-webhook"
    }
}

/// Resolve `${VAR_NAME}` patterns in a string using `std::env::var`.
///
/// Returns an error if a referenced variable is not set.
fn resolve_env_vars(input: &str) -> Result<String, NotifyError> {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && chars.peek() == Some(&'{') {
            chars.next();
            let mut var_name = String::new();
            let mut closed = false;
            for c in chars.by_ref() {
                if c == '}' {
                    closed = true;
                    break;
                }
                var_name.push(c);
            }
            if !closed {
                return Err(NotifyError::Config(format!(
                    "unclosed env var reference in: {input}"
                )));
            }
            let value = std::env::var(&var_name).map_err(|_| {
                NotifyError::Config(format!("env var not found: {var_name}"))
            })?;
            result.push_str(&value);
        } else {
            result.push(ch);
        }
    }

    Ok(result)
}
