//!
//! Client configuration, loaded from TOML and validated before any context
//! is built from it.
//!

use crate::{
    log,
    log::Topic,
    types::Principal,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error as ThisError;

///
/// Defaults
///

pub(crate) mod defaults {
    pub const fn call_timeout_secs() -> u64 {
        60
    }

    pub const fn max_results() -> u32 {
        100
    }
}

pub const MAX_CALL_TIMEOUT_SECS: u64 = 300;
pub const MAX_RESULTS_LIMIT: u32 = 1_000;

/// Errors related to configuration parsing and validation.
#[derive(Debug, Eq, PartialEq, ThisError)]
pub enum ConfigError {
    /// TOML could not be parsed into the expected structure.
    #[error("toml error: {0}")]
    CannotParseToml(String),

    #[error("validation error: {0}")]
    ValidationError(String),
}

///
/// Validate
///

pub trait Validate {
    fn validate(&self) -> Result<(), ConfigError>;
}

///
/// ClientConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    pub ledger_canister: Principal,

    #[serde(default)]
    pub index_canister: Option<Principal>,

    #[serde(default = "defaults::call_timeout_secs")]
    pub call_timeout_secs: u64,

    /// Default page size for account transaction queries.
    #[serde(default = "defaults::max_results")]
    pub max_results: u32,
}

impl ClientConfig {
    #[must_use]
    pub const fn new(ledger_canister: Principal) -> Self {
        Self {
            ledger_canister,
            index_canister: None,
            call_timeout_secs: defaults::call_timeout_secs(),
            max_results: defaults::max_results(),
        }
    }

    #[must_use]
    pub const fn with_index(mut self, index_canister: Principal) -> Self {
        self.index_canister = Some(index_canister);
        self
    }

    /// Parse and validate a TOML document.
    pub fn from_toml(config_str: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(config_str).map_err(|e| ConfigError::CannotParseToml(e.to_string()))?;

        config.validate()?;
        log!(
            Topic::Config,
            Info,
            "ledger {} index {}",
            config.ledger_canister,
            config
                .index_canister
                .map_or_else(|| "-".to_string(), |p| p.to_string())
        );

        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::CannotParseToml(e.to_string()))
    }

    #[must_use]
    pub const fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }
}

impl Validate for ClientConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.ledger_canister == Principal::anonymous() {
            return Err(ConfigError::ValidationError(
                "ledger_canister cannot be the anonymous principal".to_string(),
            ));
        }

        if self.index_canister == Some(self.ledger_canister) {
            return Err(ConfigError::ValidationError(format!(
                "index_canister {} is the ledger itself",
                self.ledger_canister
            )));
        }

        if !(1..=MAX_CALL_TIMEOUT_SECS).contains(&self.call_timeout_secs) {
            return Err(ConfigError::ValidationError(format!(
                "call_timeout_secs {} must be within 1..={MAX_CALL_TIMEOUT_SECS}",
                self.call_timeout_secs
            )));
        }

        if !(1..=MAX_RESULTS_LIMIT).contains(&self.max_results) {
            return Err(ConfigError::ValidationError(format!(
                "max_results {} must be within 1..={MAX_RESULTS_LIMIT}",
                self.max_results
            )));
        }

        Ok(())
    }
}

///
/// TESTS
///
