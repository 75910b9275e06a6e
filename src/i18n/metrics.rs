//! Engine metrics and observability.
//!
//! Each engine owns one `EngineMetrics`; counters are shared by the
//! translator and the fetch tasks it spawns.

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Lookup and fetch counters for one engine.
#[derive(Debug, Default)]
pub struct EngineMetrics {
    /// Lookups that produced non-empty text (or a nested dictionary)
    hits: AtomicUsize,

    /// Lookups that produced empty text
    misses: AtomicUsize,

    /// Fetches that reached the transport
    fetches: AtomicUsize,

    /// Fetches dropped because another one was in flight
    fetches_skipped: AtomicUsize,

    /// Fetches whose transport call failed
    fetch_failures: AtomicUsize,
}

impl EngineMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fetch(&self) {
        self.fetches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fetch_skipped(&self) {
        self.fetches_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fetch_failure(&self) {
        self.fetch_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> usize {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::Relaxed)
    }

    pub fn fetches_skipped(&self) -> usize {
        self.fetches_skipped.load(Ordering::Relaxed)
    }

    pub fn fetch_failures(&self) -> usize {
        self.fetch_failures.load(Ordering::Relaxed)
    }

    /// Generate a metrics report.
    pub fn report(&self) -> MetricsReport {
        let hits = self.hits();
        let misses = self.misses();
        let lookups = hits + misses;
        let hit_rate = if lookups > 0 {
            (hits as f64 / lookups as f64) * 100.0
        } else {
            0.0
        };

        let fetches = self.fetches();
        let failures = self.fetch_failures();
        let fetch_success_rate = if fetches > 0 {
            (fetches.saturating_sub(failures) as f64 / fetches as f64) * 100.0
        } else {
            0.0
        };

        MetricsReport {
            hits,
            misses,
            hit_rate,
            fetches,
            fetches_skipped: self.fetches_skipped(),
            fetch_failures: failures,
            fetch_success_rate,
        }
    }
}

/// Snapshot of engine statistics.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    pub hits: usize,
    pub misses: usize,

    /// Hit rate as a percentage (0-100)
    pub hit_rate: f64,

    pub fetches: usize,
    pub fetches_skipped: usize,
    pub fetch_failures: usize,

    /// Fetch success rate as a percentage (0-100)
    pub fetch_success_rate: f64,
}
