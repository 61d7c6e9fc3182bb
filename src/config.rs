//! Configuration for broadcasters, receivers and event buses.
//!
//! Values can be loaded from a TOML document and overridden with environment
//! variables prefixed with `TORRUST_RELAY_`:
//!
//! ```toml
//! dispatch = "live"
//! enabled = false
//! ```
//!
//! ```text
//! TORRUST_RELAY_DISPATCH=snapshot
//! ```
use derive_more::Display;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Prefix for the environment variables that override the configuration.
pub const ENV_VAR_PREFIX: &str = "TORRUST_RELAY_";

/// How a broadcaster walks its subscribers while dispatching.
#[derive(Serialize, Deserialize, Display, PartialEq, Eq, Debug, Clone, Copy, Default)]
#[serde(rename_all = "snake_case")]
pub enum DispatchPolicy {
    /// The subscriber list is copied when `send` starts. Subscribers unbound
    /// during the dispatch are skipped, subscribers bound during the dispatch
    /// are reached by the next `send`.
    #[default]
    #[display("snapshot")]
    Snapshot,

    /// The subscriber list is walked by position while it changes.
    /// Subscribers bound during the dispatch are reached by the same `send`.
    /// Removing a subscriber ahead of the cursor shifts the rest, so the next
    /// one can be skipped.
    #[display("live")]
    Live,
}

#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone, Copy)]
pub struct Config {
    /// Dispatch policy for broadcasters built from this configuration. It's
    /// inherited by the adapters they create.
    #[serde(default = "Config::default_dispatch")]
    pub dispatch: DispatchPolicy,

    /// Whether event buses built from this configuration send events.
    #[serde(default = "Config::default_enabled")]
    pub enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dispatch: Self::default_dispatch(),
            enabled: Self::default_enabled(),
        }
    }
}

impl Config {
    fn default_dispatch() -> DispatchPolicy {
        DispatchPolicy::default()
    }

    fn default_enabled() -> bool {
        true
    }

    /// Loads the configuration from a TOML document. Environment variables
    /// take precedence over the document, and the document over the
    /// defaults.
    ///
    /// # Errors
    ///
    /// Will return an error if the document or the environment variables
    /// contain invalid values.
    pub fn load_from_toml(toml: &str) -> Result<Self, Error> {
        let figment = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::string(toml))
            .merge(Env::prefixed(ENV_VAR_PREFIX).split("__"));

        let config: Config = figment.extract()?;

        tracing::debug!(target: crate::RELAY_LOG_TARGET, dispatch = %config.dispatch, enabled = config.enabled, "configuration loaded");

        Ok(config)
    }
}

/// Errors that can occur when loading the configuration.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed processing the configuration: {source}")]
    ConfigError { source: Box<figment::Error> },
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigError { source: Box::new(err) }
    }
}
