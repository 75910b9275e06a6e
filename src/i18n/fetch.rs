//! Single-flight dictionary fetching.
//!
//! At most one fetch runs per engine at any instant. A request that arrives
//! while another is in flight is dropped, not queued, whatever locale it is
//! for. The guard is held by a [`FetchPermit`] and released on drop, so it is
//! cleared on success, on transport failure, and if the fetch task is
//! cancelled.

use crate::i18n::dictionary::Dictionary;
use crate::i18n::metrics::EngineMetrics;
use crate::transport::LocaleTransport;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Locale fetched when no preference is configured.
pub const BASELINE_LOCALE: &str = "en";

/// Result of a [`FetchCoordinator::fetch_into`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Another fetch was in flight.
    Skipped,
    /// The dictionary was fetched and merged.
    Loaded { locale: String },
    /// The transport failed; nothing was merged.
    Failed { locale: String },
}

/// Exclusive right to run the one in-flight fetch.
#[derive(Debug)]
pub struct FetchPermit {
    guard: Arc<AtomicBool>,
}

impl Drop for FetchPermit {
    fn drop(&mut self) {
        self.guard.store(false, Ordering::Release);
    }
}

pub struct FetchCoordinator {
    transport: Arc<dyn LocaleTransport>,
    in_flight: Arc<AtomicBool>,
    baseline: String,
    metrics: Arc<EngineMetrics>,
}

impl FetchCoordinator {
    pub fn new(transport: Arc<dyn LocaleTransport>, metrics: Arc<EngineMetrics>) -> Self {
        Self {
            transport,
            in_flight: Arc::new(AtomicBool::new(false)),
            baseline: BASELINE_LOCALE.to_string(),
            metrics,
        }
    }

    /// Override the locale fetched when no preference is configured.
    pub fn with_baseline(mut self, baseline: impl Into<String>) -> Self {
        self.baseline = baseline.into();
        self
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Take the guard if no fetch is in flight.
    pub fn try_acquire(&self) -> Option<FetchPermit> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| FetchPermit {
                guard: Arc::clone(&self.in_flight),
            })
    }

    /// Fetch the preferred locale's dictionary and hand it to `add`.
    ///
    /// Returns [`FetchOutcome::Skipped`] immediately when a fetch is already
    /// in flight.
    pub async fn fetch_into<A, P>(&self, add: A, preferred_locale: P) -> FetchOutcome
    where
        A: FnOnce(&str, Dictionary),
        P: FnOnce() -> Option<String>,
    {
        match self.try_acquire() {
            Some(permit) => self.run(permit, add, preferred_locale).await,
            None => {
                self.metrics.record_fetch_skipped();
                debug!("Dictionary fetch already in flight, dropping request");
                FetchOutcome::Skipped
            }
        }
    }

    /// Perform the fetch for which `permit` was acquired.
    pub async fn run<A, P>(&self, permit: FetchPermit, add: A, preferred_locale: P) -> FetchOutcome
    where
        A: FnOnce(&str, Dictionary),
        P: FnOnce() -> Option<String>,
    {
        let _permit = permit;
        let locale = preferred_locale()
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| self.baseline.clone());

        self.metrics.record_fetch();
        info!("Fetching dictionary for locale '{}'", locale);

        match self.transport.fetch_locale_data(&locale).await {
            Ok(table) => {
                info!("Loaded {} top-level keys for locale '{}'", table.len(), locale);
                add(&locale, table);
                FetchOutcome::Loaded { locale }
            }
            Err(e) => {
                self.metrics.record_fetch_failure();
                warn!("Dictionary fetch for locale '{}' failed: {}", locale, e);
                FetchOutcome::Failed { locale }
            }
        }
    }
}
