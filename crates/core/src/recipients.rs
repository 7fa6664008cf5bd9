//! Which guides receive the announcement, and the messages handed to the
//! transport.

use regex::Regex;

use crate::error::{PedibusError, Result};
use crate::roster::Roster;

const PHONE_DIGITS: usize = 10;

/// Accepts 10-digit mobile numbers starting with a fixed prefix.
#[derive(Debug, Clone)]
pub struct PhonePolicy {
    pattern: Regex,
}

impl PhonePolicy {
    pub fn new(prefix: &str) -> Result<Self> {
        if prefix.is_empty()
            || prefix.len() >= PHONE_DIGITS
            || !prefix.chars().all(|c| c.is_ascii_digit())
        {
            return Err(PedibusError::InvalidConfig(format!(
                "phone prefix must be 1 to {} digits, got '{prefix}'",
                PHONE_DIGITS - 1
            )));
        }
        let pattern = Regex::new(&format!(
            r"^{prefix}\d{{{}}}$",
            PHONE_DIGITS - prefix.len()
        ))
        .map_err(|e| PedibusError::InvalidConfig(e.to_string()))?;
        Ok(Self { pattern })
    }

    pub fn accepts(&self, phone_number: &str) -> bool {
        self.pattern.is_match(phone_number)
    }
}

/// One message for the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub recipient: String,
    pub guide_name: String,
    pub text: String,
}

/// One message per roster guide whose phone number passes `policy`.
///
/// Guides failing the policy are left out silently.
pub fn outbound_messages(
    roster: &Roster,
    policy: &PhonePolicy,
    text: &str,
) -> Vec<OutboundMessage> {
    roster
        .guides()
        .iter()
        .filter(|g| policy.accepts(g.phone_number()))
        .map(|g| OutboundMessage {
            recipient: g.phone_number().to_string(),
            guide_name: g.name().to_string(),
            text: text.to_string(),
        })
        .collect()
}
