//! Outbound delivery of the weekly announcement.
//!
//! This crate provides:
//! - `Notifier` trait for pluggable SMS transports
//! - An HTTP SMS-gateway notifier and a dry-run notifier
//! - Dispatcher that fans one announcement out to every recipient

pub mod dispatcher;
pub mod dry_run;
pub mod traits;
pub mod webhook;

pub use dispatcher::{DispatchReport, Dispatcher};
pub use dry_run::DryRunNotifier;
pub use traits::{DispatchResult, Notifier, NotifyError};
pub use webhook::SmsWebhookNotifier;
