//! Reactive locale state.
//!
//! The active locale and the table of loaded dictionaries each live in a
//! `tokio::sync::watch` cell. Reads are synchronous snapshots; writes go
//! through `send_modify`/`send_replace`, so a reader never sees a partially
//! merged dictionary, and every subscriber is woken after each write.

use crate::i18n::dictionary::Dictionary;
use std::collections::HashMap;
use tokio::sync::watch;
use tracing::debug;

/// Loaded dictionaries keyed by locale id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocaleTable {
    dictionaries: HashMap<String, Dictionary>,
    revision: u64,
}

impl LocaleTable {
    pub fn get(&self, locale: &str) -> Option<&Dictionary> {
        self.dictionaries.get(locale)
    }

    pub fn contains(&self, locale: &str) -> bool {
        self.dictionaries.contains_key(locale)
    }

    pub fn locales(&self) -> impl Iterator<Item = &str> {
        self.dictionaries.keys().map(String::as_str)
    }

    /// Number of completed `add` calls.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn merge(&mut self, locale: &str, table: Dictionary) {
        self.dictionaries
            .entry(locale.to_string())
            .or_default()
            .merge(table);
        self.revision += 1;
    }
}

/// Owner of the active locale and the locale table.
#[derive(Debug)]
pub struct LocaleStore {
    locale: watch::Sender<String>,
    tables: watch::Sender<LocaleTable>,
}

impl LocaleStore {
    pub fn new(locale: impl Into<String>) -> Self {
        let (locale, _) = watch::channel(locale.into());
        let (tables, _) = watch::channel(LocaleTable::default());
        Self { locale, tables }
    }

    /// Merge `table` into the dictionary for `locale`, creating it if absent.
    pub fn add(&self, locale: &str, table: Dictionary) {
        let keys = table.len();
        self.tables.send_modify(|tables| tables.merge(locale, table));
        debug!("Merged {} top-level keys into locale '{}'", keys, locale);
    }

    /// Read the active locale, or switch it when `locale` is given.
    ///
    /// Returns the active locale after the call.
    pub fn locale(&self, locale: Option<&str>) -> String {
        if let Some(next) = locale {
            self.set_locale(next);
        }
        self.current_locale()
    }

    pub fn current_locale(&self) -> String {
        self.locale.borrow().clone()
    }

    pub fn set_locale(&self, locale: &str) {
        let previous = self.locale.send_replace(locale.to_string());
        if previous != locale {
            debug!("Switched locale from '{}' to '{}'", previous, locale);
        }
    }

    /// Snapshot of the dictionary for `locale`; empty if not loaded.
    pub fn dict(&self, locale: &str) -> Dictionary {
        self.tables.borrow().get(locale).cloned().unwrap_or_default()
    }

    pub fn has_locale(&self, locale: &str) -> bool {
        self.tables.borrow().contains(locale)
    }

    pub fn revision(&self) -> u64 {
        self.tables.borrow().revision()
    }

    /// Run `f` against the active locale and its dictionary (if loaded)
    /// under a single consistent read.
    pub fn with_active<T>(&self, f: impl FnOnce(&str, Option<&Dictionary>) -> T) -> T {
        let locale = self.locale.borrow();
        let tables = self.tables.borrow();
        f(locale.as_str(), tables.get(locale.as_str()))
    }

    /// Observe locale switches.
    pub fn subscribe_locale(&self) -> watch::Receiver<String> {
        self.locale.subscribe()
    }

    /// Observe dictionary updates.
    pub fn subscribe_tables(&self) -> watch::Receiver<LocaleTable> {
        self.tables.subscribe()
    }
}
