//! Translation resolution engine.
//!
//! Resolves a key in the active locale, interpolates parameters, and lazily
//! fetches missing dictionaries.
//!
//! # Architecture
//!
//! - `path`: dot-path lookup over nested mappings
//! - `template`: `{{ name }}` interpolation
//! - `dictionary`: per-locale translation data
//! - `store`: reactive active locale and loaded dictionaries
//! - `fetch`: single-flight dictionary fetching
//! - `translator`: the public `t` function
//! - `engine`: construction and locale actions
//! - `language`: ambient language and initial locale selection
//! - `metrics`: per-engine counters
//! - `validator`: dictionary completeness checks
//!
//! # Example
//!
//! ```rust,ignore
//! use locale_engine::i18n::{create_translation_engine, Dictionary, Params};
//!
//! let (t, actions) = create_translation_engine(
//!     vec![("en", Dictionary::new().with("hello", "Hello {{ name }}"))],
//!     None,
//!     transport,
//!     config,
//! );
//! let text = t.t("hello", Some(&Params::new().with("name", "Tom")), None);
//! actions.locale(Some("fr"));
//! ```

mod dictionary;
mod engine;
mod fetch;
mod language;
mod metrics;
mod path;
mod store;
mod template;
mod translator;
mod validator;

pub use dictionary::{Dictionary, DictionaryError, Entry, Formatter};
pub use engine::{create_translation_engine, EngineBuilder, LocaleActions};
pub use fetch::{FetchCoordinator, FetchOutcome, FetchPermit, BASELINE_LOCALE};
pub use language::{ambient_language, primary_subtag, select_initial_locale};
pub use metrics::{EngineMetrics, MetricsReport};
pub use path::{resolve, resolve_or, segments, Traverse};
pub use store::{LocaleStore, LocaleTable};
pub use template::{placeholder_regex, render, render_with, Params};
pub use translator::{Translation, Translator};
pub use validator::{DictionaryValidator, ValidationReport};
