//! The single channel through which non-fatal failures reach the user.

/// Receives user-facing notices (load/save failures, confirmations).
pub trait Reporter {
    fn report(&self, message: &str);
}

/// Reporter that only logs.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn report(&self, message: &str) {
        tracing::info!(%message, "notice");
    }
}

/// Send `message` through `reporter` and the debug log.
pub(crate) fn notify(reporter: &dyn Reporter, message: &str) {
    tracing::debug!(%message, "reporting to user");
    reporter.report(message);
}
