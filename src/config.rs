use anyhow::{Context, Result};

/// Option name queried to pick which locale to fetch.
pub const LANGUAGE_OPTION: &str = "language";

/// The configuration collaborator consulted by the engine.
pub trait ConfigSource: Send + Sync {
    fn get_config_option(&self, name: &str) -> Option<String>;
}

impl<F> ConfigSource for F
where
    F: Fn(&str) -> Option<String> + Send + Sync,
{
    fn get_config_option(&self, name: &str) -> Option<String> {
        self(name)
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    // Preferred language for lazy fetches
    pub language: Option<String>,

    // Locale selected at startup
    pub default_locale: Option<String>,

    // Remote dictionaries
    pub locale_data_url: String,
    pub fetch_timeout_secs: u64,
    pub fetch_max_attempts: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            language: None,
            default_locale: None,
            locale_data_url: "http://localhost:8080/locales".to_string(),
            fetch_timeout_secs: 10,
            fetch_max_attempts: 3,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            language: non_empty_var("I18N_LANGUAGE"),
            default_locale: non_empty_var("I18N_DEFAULT_LOCALE"),

            locale_data_url: std::env::var("I18N_LOCALE_DATA_URL")
                .unwrap_or(defaults.locale_data_url),
            fetch_timeout_secs: parse_var("I18N_FETCH_TIMEOUT_SECS")?
                .unwrap_or(defaults.fetch_timeout_secs),
            fetch_max_attempts: parse_var("I18N_FETCH_MAX_ATTEMPTS")?
                .unwrap_or(defaults.fetch_max_attempts),
        })
    }
}

impl ConfigSource for Config {
    fn get_config_option(&self, name: &str) -> Option<String> {
        match name {
            LANGUAGE_OPTION => self.language.clone(),
            _ => None,
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_var<T>(name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match non_empty_var(name) {
        Some(raw) => raw
            .parse()
            .map(Some)
            .with_context(|| format!("{} must be a number, got '{}'", name, raw)),
        None => Ok(None),
    }
}
