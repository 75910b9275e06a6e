//! Key resolution: lookup, interpolation, and lazy fetch on a miss.

use crate::config::{ConfigSource, LANGUAGE_OPTION};
use crate::i18n::dictionary::{Dictionary, Entry};
use crate::i18n::fetch::FetchCoordinator;
use crate::i18n::metrics::EngineMetrics;
use crate::i18n::path::resolve_or;
use crate::i18n::store::LocaleStore;
use crate::i18n::template::{render, Params};
use std::fmt;
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::debug;

/// The value produced for a key.
#[derive(Debug, Clone, PartialEq)]
pub enum Translation {
    /// Final text.
    Text(String),
    /// The key named a sub-dictionary; returned as-is.
    Nested(Dictionary),
}

impl Translation {
    /// The text, or `""` for a nested dictionary.
    pub fn as_str(&self) -> &str {
        match self {
            Translation::Text(text) => text,
            Translation::Nested(_) => "",
        }
    }

    pub fn into_text(self) -> Option<String> {
        match self {
            Translation::Text(text) => Some(text),
            Translation::Nested(_) => None,
        }
    }

    pub fn as_dictionary(&self) -> Option<&Dictionary> {
        match self {
            Translation::Nested(dict) => Some(dict),
            Translation::Text(_) => None,
        }
    }

    /// Empty text counts as a miss.
    pub fn is_empty(&self) -> bool {
        matches!(self, Translation::Text(text) if text.is_empty())
    }
}

impl fmt::Display for Translation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PartialEq<&str> for Translation {
    fn eq(&self, other: &&str) -> bool {
        matches!(self, Translation::Text(text) if text == other)
    }
}

impl PartialEq<str> for Translation {
    fn eq(&self, other: &str) -> bool {
        matches!(self, Translation::Text(text) if text == other)
    }
}

/// Resolves keys against the active locale.
///
/// Cheap to clone; clones share the same store and fetch guard.
#[derive(Clone)]
pub struct Translator {
    store: Arc<LocaleStore>,
    fetcher: Arc<FetchCoordinator>,
    config: Arc<dyn ConfigSource>,
    metrics: Arc<EngineMetrics>,
}

impl Translator {
    pub fn new(
        store: Arc<LocaleStore>,
        fetcher: Arc<FetchCoordinator>,
        config: Arc<dyn ConfigSource>,
        metrics: Arc<EngineMetrics>,
    ) -> Self {
        Self {
            store,
            fetcher,
            config,
            metrics,
        }
    }

    /// Resolve `key` in the active locale.
    ///
    /// Formatter entries are called with `params`, templates are rendered with
    /// them, nested dictionaries are returned unchanged. When the result is
    /// empty text (absent key, or a key mapped to `""`) a background fetch is
    /// started and the empty value is returned immediately; the corrected text
    /// is available on a later call once the store has been updated.
    ///
    /// Scheduling the fetch needs a Tokio runtime; outside one the miss is
    /// only logged.
    pub fn t(&self, key: &str, params: Option<&Params>, default: Option<&str>) -> Translation {
        let fallback = Entry::Text(default.unwrap_or_default().to_string());
        let (locale, entry) = self.store.with_active(|locale, dict| {
            (locale.to_string(), resolve_or(dict, key, &fallback).clone())
        });

        let empty = Params::new();
        let params = params.unwrap_or(&empty);
        let translation = match entry {
            Entry::Func(formatter) => Translation::Text(formatter.call(params)),
            Entry::Text(template) => Translation::Text(render(&template, params)),
            Entry::Nested(dict) => Translation::Nested(dict),
        };

        if translation.is_empty() {
            self.metrics.record_miss();
            debug!("No text for '{}' in locale '{}'", key, locale);
            self.request_fetch();
        } else {
            self.metrics.record_hit();
        }

        translation
    }

    /// Shorthand for text-only callers.
    pub fn text(&self, key: &str, params: &Params) -> String {
        self.t(key, Some(params), None).to_string()
    }

    pub fn store(&self) -> &Arc<LocaleStore> {
        &self.store
    }

    pub fn metrics(&self) -> &Arc<EngineMetrics> {
        &self.metrics
    }

    pub fn is_fetching(&self) -> bool {
        self.fetcher.is_in_flight()
    }

    fn request_fetch(&self) {
        let Ok(handle) = Handle::try_current() else {
            debug!("No async runtime available, skipping dictionary fetch");
            return;
        };
        let Some(permit) = self.fetcher.try_acquire() else {
            self.metrics.record_fetch_skipped();
            debug!("Dictionary fetch already in flight");
            return;
        };

        let store = Arc::clone(&self.store);
        let fetcher = Arc::clone(&self.fetcher);
        let config = Arc::clone(&self.config);
        handle.spawn(async move {
            fetcher
                .run(
                    permit,
                    |locale, table| store.add(locale, table),
                    || config.get_config_option(LANGUAGE_OPTION),
                )
                .await;
        });
    }
}

impl fmt::Debug for Translator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Translator")
            .field("locale", &self.store.current_locale())
            .field("fetching", &self.is_fetching())
            .finish()
    }
}
