//! Metrics collection module
//!
//! Side channel for the typeahead pipeline: query failures are counted here
//! instead of being surfaced as stream errors.

use crate::error::SearchError;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Why an input event did not (re)arm the debounce timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Suppression {
    /// Not typed by the user
    NotUserInput,
    /// Trimmed text shorter than the minimum length
    TooShort,
    /// Same text as the previous qualifying input
    Duplicate,
}

/// Per-session pipeline counters
#[derive(Debug, Default)]
pub struct PipelineMetrics {
    issued: AtomicU64,
    delivered: AtomicU64,
    superseded: AtomicU64,
    transport_errors: AtomicU64,
    decode_errors: AtomicU64,
    invalid_arguments: AtomicU64,
    suppressed_not_user_input: AtomicU64,
    suppressed_too_short: AtomicU64,
    suppressed_duplicate: AtomicU64,
    /// Completed queries with a measured response time
    timed: AtomicU64,
    response_time_ms: AtomicU64,
}

impl PipelineMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_issued(&self) {
        self.issued.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_delivered(&self) {
        self.delivered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_superseded(&self) {
        self.superseded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_suppressed(&self, reason: Suppression) {
        let counter = match reason {
            Suppression::NotUserInput => &self.suppressed_not_user_input,
            Suppression::TooShort => &self.suppressed_too_short,
            Suppression::Duplicate => &self.suppressed_duplicate,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_error(&self, error: &SearchError) {
        let counter = match error {
            SearchError::Transport { .. } => &self.transport_errors,
            SearchError::Decode { .. } => &self.decode_errors,
            SearchError::InvalidArgument { .. } => &self.invalid_arguments,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Record the response time of a completed query
    pub fn record_response_time(&self, elapsed: Duration) {
        self.timed.fetch_add(1, Ordering::Relaxed);
        self.response_time_ms
            .fetch_add(elapsed.as_millis() as u64, Ordering::Relaxed);
    }

    pub fn issued(&self) -> u64 {
        self.issued.load(Ordering::Relaxed)
    }

    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    pub fn superseded(&self) -> u64 {
        self.superseded.load(Ordering::Relaxed)
    }

    /// Average response time in milliseconds
    pub fn avg_response_time(&self) -> Option<u64> {
        let timed = self.timed.load(Ordering::Relaxed);
        if timed == 0 {
            None
        } else {
            Some(self.response_time_ms.load(Ordering::Relaxed) / timed)
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            issued: self.issued(),
            delivered: self.delivered(),
            superseded: self.superseded(),
            transport_errors: self.transport_errors.load(Ordering::Relaxed),
            decode_errors: self.decode_errors.load(Ordering::Relaxed),
            invalid_arguments: self.invalid_arguments.load(Ordering::Relaxed),
            suppressed_not_user_input: self.suppressed_not_user_input.load(Ordering::Relaxed),
            suppressed_too_short: self.suppressed_too_short.load(Ordering::Relaxed),
            suppressed_duplicate: self.suppressed_duplicate.load(Ordering::Relaxed),
            avg_response_time_ms: self.avg_response_time(),
        }
    }
}

/// Point-in-time copy of [`PipelineMetrics`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub issued: u64,
    pub delivered: u64,
    pub superseded: u64,
    pub transport_errors: u64,
    pub decode_errors: u64,
    pub invalid_arguments: u64,
    pub suppressed_not_user_input: u64,
    pub suppressed_too_short: u64,
    pub suppressed_duplicate: u64,
    pub avg_response_time_ms: Option<u64>,
}

impl MetricsSnapshot {
    pub fn errors(&self) -> u64 {
        self.transport_errors + self.decode_errors + self.invalid_arguments
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics() {
        let metrics = PipelineMetrics::new();

        metrics.record_issued();
        metrics.record_issued();
        metrics.record_delivered();
        metrics.record_superseded();
        metrics.record_response_time(Duration::from_millis(100));
        metrics.record_response_time(Duration::from_millis(300));
        metrics.record_error(&SearchError::transport("http://x", Some(502), "bad gateway"));
        metrics.record_suppressed(Suppression::Duplicate);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.issued, 2);
        assert_eq!(snapshot.delivered, 1);
        assert_eq!(snapshot.superseded, 1);
        assert_eq!(snapshot.transport_errors, 1);
        assert_eq!(snapshot.suppressed_duplicate, 1);
        assert_eq!(snapshot.errors(), 1);
        assert_eq!(snapshot.avg_response_time_ms, Some(200));
    }

    #[test]
    fn test_no_response_time_yet() {
        assert_eq!(PipelineMetrics::new().avg_response_time(), None);
    }
}
