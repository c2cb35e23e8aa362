//! Logger metrics for observability
//!
//! Provides counters for monitoring delivery health: records emitted past the
//! level gate, successful and failed sink deliveries, and sink panics.

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for logger observability
///
/// One instance is shared by every logger of a registry.
///
/// # Example
///
/// ```
/// use rust_diagnostic_logger::LoggerMetrics;
///
/// let metrics = LoggerMetrics::new();
///
/// metrics.record_emitted();
/// metrics.record_delivered();
///
/// assert_eq!(metrics.records_emitted(), 1);
/// assert_eq!(metrics.deliveries(), 1);
/// ```
#[derive(Debug)]
pub struct LoggerMetrics {
    /// Records that passed the level gate and were built
    records_emitted: AtomicU64,

    /// Successful sink deliveries (one per record per sink)
    deliveries: AtomicU64,

    /// Sink deliveries that returned an error
    delivery_failures: AtomicU64,

    /// Sink deliveries that panicked
    sink_panics: AtomicU64,
}

impl LoggerMetrics {
    /// Create a new metrics instance with all counters at zero
    pub const fn new() -> Self {
        Self {
            records_emitted: AtomicU64::new(0),
            deliveries: AtomicU64::new(0),
            delivery_failures: AtomicU64::new(0),
            sink_panics: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn records_emitted(&self) -> u64 {
        self.records_emitted.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn deliveries(&self) -> u64 {
        self.deliveries.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn delivery_failures(&self) -> u64 {
        self.delivery_failures.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn sink_panics(&self) -> u64 {
        self.sink_panics.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn record_emitted(&self) -> u64 {
        self.records_emitted.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_delivered(&self) -> u64 {
        self.deliveries.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_delivery_failure(&self) -> u64 {
        self.delivery_failures.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_sink_panic(&self) -> u64 {
        self.sink_panics.fetch_add(1, Ordering::Relaxed)
    }

    /// Share of deliveries that failed or panicked, as a percentage (0.0 - 100.0)
    ///
    /// Returns 0.0 if nothing has been delivered yet.
    pub fn failure_rate(&self) -> f64 {
        let failed = self.delivery_failures() + self.sink_panics();
        let total = self.deliveries() + failed;

        if total == 0 {
            0.0
        } else {
            (failed as f64 / total as f64) * 100.0
        }
    }

    /// Reset all counters to zero
    pub fn reset(&self) {
        self.records_emitted.store(0, Ordering::Relaxed);
        self.deliveries.store(0, Ordering::Relaxed);
        self.delivery_failures.store(0, Ordering::Relaxed);
        self.sink_panics.store(0, Ordering::Relaxed);
    }
}

impl Default for LoggerMetrics {
    fn default() -> Self {
        Self::new()
    }
}
