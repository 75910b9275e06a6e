//! Engine construction and the locale actions handed to callers.

use crate::config::{Config, ConfigSource};
use crate::i18n::dictionary::Dictionary;
use crate::i18n::fetch::{FetchCoordinator, BASELINE_LOCALE};
use crate::i18n::language::{ambient_language, select_initial_locale};
use crate::i18n::metrics::EngineMetrics;
use crate::i18n::store::{LocaleStore, LocaleTable};
use crate::i18n::translator::Translator;
use crate::transport::LocaleTransport;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

/// Mutating and snapshot operations on an engine's locale state.
#[derive(Debug, Clone)]
pub struct LocaleActions {
    store: Arc<LocaleStore>,
}

impl LocaleActions {
    /// Merge `table` into `locale`'s dictionary.
    pub fn add(&self, locale: &str, table: Dictionary) {
        self.store.add(locale, table);
    }

    /// Read the active locale, or switch to `locale` when given.
    pub fn locale(&self, locale: Option<&str>) -> String {
        self.store.locale(locale)
    }

    /// Snapshot of `locale`'s dictionary.
    pub fn dict(&self, locale: &str) -> Dictionary {
        self.store.dict(locale)
    }

    pub fn subscribe(&self) -> watch::Receiver<LocaleTable> {
        self.store.subscribe_tables()
    }
}

/// Builds a [`Translator`] and its [`LocaleActions`].
pub struct EngineBuilder {
    seed: Vec<(String, Dictionary)>,
    default_locale: Option<String>,
    ambient_language: Option<Option<String>>,
    baseline: String,
    transport: Arc<dyn LocaleTransport>,
    config: Arc<dyn ConfigSource>,
}

impl EngineBuilder {
    pub fn new(transport: Arc<dyn LocaleTransport>, config: Arc<dyn ConfigSource>) -> Self {
        Self {
            seed: Vec::new(),
            default_locale: None,
            ambient_language: None,
            baseline: BASELINE_LOCALE.to_string(),
            transport,
            config,
        }
    }

    /// Builder for an unseeded engine whose active locale is the locale it
    /// fetches on a miss.
    ///
    /// The locale is `default_locale`, else `language`, else the baseline.
    /// It is written back as the `language` option so the first lookup
    /// loads the dictionary it reads from.
    pub fn from_config(transport: Arc<dyn LocaleTransport>, config: &Config) -> Self {
        let locale = config
            .default_locale
            .clone()
            .or_else(|| config.language.clone())
            .unwrap_or_else(|| BASELINE_LOCALE.to_string());

        if let Some(language) = config.language.as_deref() {
            if language != locale {
                warn!(
                    "Default locale '{}' differs from language '{}', fetching '{}'",
                    locale, language, locale
                );
            }
        }

        let config = Config {
            language: Some(locale.clone()),
            ..config.clone()
        };
        Self::new(transport, Arc::new(config)).default_locale(Some(locale))
    }

    /// Seed a locale. The first seeded locale is the default-locale fallback.
    pub fn with_locale(mut self, locale: impl Into<String>, dict: Dictionary) -> Self {
        self.seed.push((locale.into(), dict));
        self
    }

    pub fn default_locale(mut self, locale: Option<impl Into<String>>) -> Self {
        self.default_locale = locale.map(Into::into);
        self
    }

    /// Use `language` instead of the operating system's language.
    pub fn ambient_language(mut self, language: Option<impl Into<String>>) -> Self {
        self.ambient_language = Some(language.map(Into::into));
        self
    }

    /// Locale fetched when the configuration names none.
    pub fn baseline_locale(mut self, locale: impl Into<String>) -> Self {
        self.baseline = locale.into();
        self
    }

    pub fn build(self) -> (Translator, LocaleActions) {
        let ambient = self.ambient_language.unwrap_or_else(ambient_language);
        let locale = select_initial_locale(
            self.default_locale.as_deref(),
            self.seed.iter().map(|(locale, _)| locale.as_str()),
            ambient.as_deref(),
            &self.baseline,
        );
        info!(
            "Translation engine starting in locale '{}' with {} seeded locales",
            locale,
            self.seed.len()
        );

        let store = Arc::new(LocaleStore::new(locale));
        for (locale, dict) in self.seed {
            store.add(&locale, dict);
        }

        let metrics = Arc::new(EngineMetrics::new());
        let fetcher = FetchCoordinator::new(self.transport, Arc::clone(&metrics))
            .with_baseline(self.baseline);
        let translator = Translator::new(
            Arc::clone(&store),
            Arc::new(fetcher),
            self.config,
            metrics,
        );

        (translator, LocaleActions { store })
    }
}

/// Create an engine seeded with `initial`.
///
/// `default_locale` selects the starting locale; without it the engine starts
/// in the ambient language if seeded, else the first seeded locale.
pub fn create_translation_engine<I, L>(
    initial: I,
    default_locale: Option<&str>,
    transport: Arc<dyn LocaleTransport>,
    config: Arc<dyn ConfigSource>,
) -> (Translator, LocaleActions)
where
    I: IntoIterator<Item = (L, Dictionary)>,
    L: Into<String>,
{
    initial
        .into_iter()
        .fold(EngineBuilder::new(transport, config), |builder, (locale, dict)| {
            builder.with_locale(locale, dict)
        })
        .default_locale(default_locale)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::template::Params;
    use crate::transport::StaticTransport;
    use std::time::Duration;

    fn builder() -> EngineBuilder {
        EngineBuilder::new(Arc::new(StaticTransport::new()), Arc::new(Config::default()))
    }

    #[test]
    fn test_default_locale_is_first_seeded_when_ambient_unknown() {
        let (_, actions) = builder()
            .with_locale("en", Dictionary::new().with("hello", "Hello"))
            .ambient_language(Some("xx"))
            .build();
        assert_eq!(actions.locale(None), "en");
    }

    #[test]
    fn test_ambient_language_selected_when_seeded() {
        let (_, actions) = builder()
            .with_locale("en", Dictionary::new())
            .with_locale("de", Dictionary::new())
            .ambient_language(Some("de"))
            .build();
        assert_eq!(actions.locale(None), "de");
    }

    #[test]
    fn test_explicit_default_locale() {
        let (_, actions) = builder()
            .with_locale("en", Dictionary::new())
            .default_locale(Some("fr"))
            .ambient_language(None::<String>)
            .build();
        assert_eq!(actions.locale(None), "fr");
    }

    #[test]
    fn test_actions_round_trip() {
        let (t, actions) = builder().ambient_language(Some("en")).build();

        assert_eq!(actions.locale(Some("fr")), "fr");
        assert_eq!(actions.locale(None), "fr");

        actions.add("sw", Dictionary::new().with("hello", "Hej {{ name }}"));
        actions.locale(Some("sw"));
        let params = Params::new().with("name", "Lisa");
        assert_eq!(t.t("hello", Some(&params), None), "Hej Lisa");

        assert_eq!(actions.dict("sw").len(), 1);
        assert!(actions.dict("fr").is_empty());
    }

    #[test]
    fn test_add_same_table_twice_keeps_resolution() {
        let (t, actions) = builder().with_locale("en", Dictionary::new()).build();
        let table = Dictionary::new().with("a", "A {{ x }}");
        actions.add("en", table.clone());
        let params = Params::new().with("x", "1");
        let before = t.t("a", Some(&params), None);
        actions.add("en", table);
        assert_eq!(t.t("a", Some(&params), None), before);
    }

    fn greeting_transport() -> Arc<dyn LocaleTransport> {
        Arc::new(
            StaticTransport::new()
                .with_locale("en", Dictionary::new().with("greeting", "Hello"))
                .with_locale("de", Dictionary::new().with("greeting", "Hallo"))
                .with_locale("fr", Dictionary::new().with("greeting", "Bonjour")),
        )
    }

    async fn read_after_fetch(t: &Translator, actions: &LocaleActions) -> (String, String) {
        let mut changes = actions.subscribe();
        let first = t.t("greeting", None, None).to_string();
        tokio::time::timeout(Duration::from_secs(5), changes.changed())
            .await
            .expect("dictionary update")
            .expect("store alive");
        (first, t.t("greeting", None, None).to_string())
    }

    #[tokio::test]
    async fn test_from_config_without_locales_reads_what_it_fetches() {
        let (t, actions) = EngineBuilder::from_config(greeting_transport(), &Config::default())
            .ambient_language(Some("de"))
            .build();

        assert_eq!(actions.locale(None), "en");
        let (first, second) = read_after_fetch(&t, &actions).await;
        assert_eq!(first, "");
        assert_eq!(second, "Hello");
        assert!(actions.dict("de").is_empty());
    }

    #[tokio::test]
    async fn test_from_config_active_locale_follows_language() {
        let config = Config {
            language: Some("de".to_string()),
            ..Config::default()
        };
        let (t, actions) = EngineBuilder::from_config(greeting_transport(), &config)
            .ambient_language(Some("fr"))
            .build();

        assert_eq!(actions.locale(None), "de");
        let (_, second) = read_after_fetch(&t, &actions).await;
        assert_eq!(second, "Hallo");
        assert!(actions.dict("en").is_empty());
    }

    #[tokio::test]
    async fn test_from_config_default_locale_is_fetched() {
        let config = Config {
            language: Some("de".to_string()),
            default_locale: Some("fr".to_string()),
            ..Config::default()
        };
        let (t, actions) = EngineBuilder::from_config(greeting_transport(), &config).build();

        assert_eq!(actions.locale(None), "fr");
        let (_, second) = read_after_fetch(&t, &actions).await;
        assert_eq!(second, "Bonjour");
    }

    #[test]
    fn test_create_translation_engine() {
        let (t, actions) = create_translation_engine(
            vec![("en", Dictionary::new().with("hi", "Hi"))],
            None,
            Arc::new(StaticTransport::new()),
            Arc::new(Config::default()),
        );
        assert_eq!(actions.dict("en").len(), 1);
        assert_eq!(actions.locale(None), "en");
        assert_eq!(t.t("hi", None, None), "Hi");
    }
}
