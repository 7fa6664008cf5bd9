//! Walking-bus guide rotation: roster, assignment history, week navigation
//! and duty counts.

pub mod calendar;
pub mod config;
pub mod engine;
pub mod error;
pub mod guide;
pub mod history;
pub mod recipients;
pub mod report;
pub mod roster;
pub mod schedule;

pub use config::Config;
pub use engine::SchedulingEngine;
pub use error::*;
pub use guide::Guide;
pub use history::HistoryStore;
pub use recipients::{OutboundMessage, PhonePolicy};
pub use report::{Reporter, TracingReporter};
pub use roster::Roster;
pub use schedule::{DutyDay, MessageTemplate, ScheduleWeek};
