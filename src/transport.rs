//! Transports that supply locale dictionaries on demand.
//!
//! The engine only needs [`LocaleTransport`]; [`HttpTransport`] downloads
//! `{base_url}/{locale}.json` and [`StaticTransport`] serves dictionaries
//! held in memory.

use crate::config::Config;
use crate::i18n::{Dictionary, DictionaryError};
use crate::retry::FetchBackoff;
use futures::future::BoxFuture;
use futures::FutureExt;
use reqwest::StatusCode;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Failure of a single dictionary fetch.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request for locale '{locale}' failed: {source}")]
    Request {
        locale: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("locale '{locale}' returned HTTP {status}")]
    Status { locale: String, status: StatusCode },

    #[error("locale '{locale}' returned malformed data: {source}")]
    Decode {
        locale: String,
        #[source]
        source: DictionaryError,
    },

    #[error("locale '{0}' is not available")]
    NotFound(String),

    #[error("'{0}' is not a valid locale id")]
    InvalidLocale(String),
}

impl TransportError {
    /// Network failures, 5xx and 429 are worth another attempt.
    pub fn is_transient(&self) -> bool {
        match self {
            TransportError::Request { source, .. } => !source.is_decode(),
            TransportError::Status { status, .. } => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            TransportError::Decode { .. }
            | TransportError::NotFound(_)
            | TransportError::InvalidLocale(_) => false,
        }
    }
}

/// Locale ids are restricted to ASCII letters, digits, `-` and `_`, so
/// they can be used as a single URL path segment.
pub fn is_valid_locale_id(locale: &str) -> bool {
    !locale.is_empty()
        && locale
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

/// Source of dictionary data for a locale.
pub trait LocaleTransport: Send + Sync {
    fn fetch_locale_data<'a>(
        &'a self,
        locale: &'a str,
    ) -> BoxFuture<'a, Result<Dictionary, TransportError>>;
}

/// Fetches `{base_url}/{locale}.json` over HTTP.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    backoff: FetchBackoff,
}

impl HttpTransport {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            backoff: FetchBackoff::default(),
        }
    }

    /// Build a transport with the timeout and attempt budget from `config`.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.fetch_timeout_secs))
            .build()?;
        Ok(Self::new(client, &config.locale_data_url)
            .with_backoff(FetchBackoff::default().with_attempts(config.fetch_max_attempts)))
    }

    pub fn with_backoff(mut self, backoff: FetchBackoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// URL of `locale`'s dictionary; `InvalidLocale` for ids that are not a
    /// plain path segment (e.g. `"../x"`).
    pub fn url_for(&self, locale: &str) -> Result<String, TransportError> {
        if !is_valid_locale_id(locale) {
            return Err(TransportError::InvalidLocale(locale.to_string()));
        }
        Ok(format!("{}/{}.json", self.base_url, locale))
    }

    async fn fetch_once(&self, url: &str, locale: &str) -> Result<Dictionary, TransportError> {
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| TransportError::Request {
                locale: locale.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                locale: locale.to_string(),
                status,
            });
        }

        let body: serde_json::Value =
            response
                .json()
                .await
                .map_err(|source| TransportError::Request {
                    locale: locale.to_string(),
                    source,
                })?;

        Dictionary::from_json(body).map_err(|source| TransportError::Decode {
            locale: locale.to_string(),
            source,
        })
    }
}

impl LocaleTransport for HttpTransport {
    fn fetch_locale_data<'a>(
        &'a self,
        locale: &'a str,
    ) -> BoxFuture<'a, Result<Dictionary, TransportError>> {
        async move {
            let url = self.url_for(locale)?;
            self.backoff
                .run(locale, || self.fetch_once(&url, locale))
                .await
        }
        .boxed()
    }
}

/// Serves dictionaries from memory.
#[derive(Debug, Clone, Default)]
pub struct StaticTransport {
    dictionaries: HashMap<String, Dictionary>,
}

impl StaticTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_locale(mut self, locale: impl Into<String>, dict: Dictionary) -> Self {
        self.dictionaries.insert(locale.into(), dict);
        self
    }
}

impl LocaleTransport for StaticTransport {
    fn fetch_locale_data<'a>(
        &'a self,
        locale: &'a str,
    ) -> BoxFuture<'a, Result<Dictionary, TransportError>> {
        let result = self
            .dictionaries
            .get(locale)
            .cloned()
            .ok_or_else(|| TransportError::NotFound(locale.to_string()));
        futures::future::ready(result).boxed()
    }
}
