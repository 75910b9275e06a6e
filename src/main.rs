//! Resolve one translation key from the command line.
//!
//! Usage:
//!   locale-engine <key> [name=value ...]
//!
//! Optional environment variables:
//! - I18N_DEFAULT_LOCALE (active locale, defaults to I18N_LANGUAGE)
//! - I18N_LANGUAGE (defaults to I18N_DEFAULT_LOCALE, then "en")
//! - I18N_LOCALE_DATA_URL (defaults to http://localhost:8080/locales)
//! - I18N_FETCH_TIMEOUT_SECS (defaults to 10)
//! - I18N_FETCH_MAX_ATTEMPTS (defaults to 3)
//!
//! The active locale is also the locale fetched on a miss. If both
//! variables are set they must agree; otherwise I18N_DEFAULT_LOCALE wins.

use anyhow::{bail, Context, Result};
use locale_engine::config::Config;
use locale_engine::i18n::{EngineBuilder, Params};
use locale_engine::transport::HttpTransport;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("locale_engine=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let Some(key) = args.next() else {
        bail!("usage: locale-engine <key> [name=value ...]");
    };
    let params = parse_params(args)?;

    let config = Config::from_env()?;
    let transport = HttpTransport::from_config(&config).context("Failed to build HTTP client")?;
    let wait = Duration::from_secs(config.fetch_timeout_secs);

    let (t, actions) = EngineBuilder::from_config(Arc::new(transport), &config).build();
    info!("Active locale: {}", actions.locale(None));

    let mut changes = actions.subscribe();
    let mut text = t.t(&key, Some(&params), None);
    if text.is_empty() {
        info!("'{}' not loaded yet, waiting for dictionary fetch", key);
        let settled = tokio::time::timeout(wait, async {
            while t.is_fetching() {
                tokio::select! {
                    _ = changes.changed() => break,
                    _ = tokio::time::sleep(Duration::from_millis(50)) => {}
                }
            }
        })
        .await;
        if settled.is_err() {
            warn!("No dictionary update within {:?}", wait);
        }
        text = t.t(&key, Some(&params), None);
    }

    if text.is_empty() {
        bail!("No translation for '{}' in locale '{}'", key, actions.locale(None));
    }
    println!("{}", text);

    info!("{}", serde_json::to_string(&t.metrics().report())?);
    Ok(())
}

/// Parse `name=value` arguments into template parameters.
fn parse_params(args: impl Iterator<Item = String>) -> Result<Params> {
    let mut params = Params::new();
    for arg in args {
        let Some((name, value)) = arg.split_once('=') else {
            bail!("Invalid parameter '{}'. Expected name=value", arg);
        };
        params.insert(name.trim(), value);
    }
    Ok(params)
}
