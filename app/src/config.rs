//! Configuration management for taskdeck.
//!
//! Loads the record store location and credentials from environment
//! variables. The binary reads a `.env` file first when one exists.

use crate::reducer::DEFAULT_SEARCH_DEBOUNCE;
use std::env;
use std::time::Duration;
use taskdeck_airtable::{AirtableClient, AirtableError};
use thiserror::Error;

/// Base id of the record store
pub const BASE_ID_VAR: &str = "TASKDECK_BASE_ID";
/// Table holding the todos
pub const TABLE_NAME_VAR: &str = "TASKDECK_TABLE_NAME";
/// Personal access token
pub const TOKEN_VAR: &str = "TASKDECK_PAT";
/// API root, optional
pub const API_URL_VAR: &str = "TASKDECK_API_URL";
/// Search debounce in milliseconds, optional
pub const SEARCH_DEBOUNCE_VAR: &str = "TASKDECK_SEARCH_DEBOUNCE_MS";

/// Default API root
pub const DEFAULT_API_URL: &str = "https://api.airtable.com/v0";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required variable is unset or empty
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),

    /// The variables do not form a usable endpoint
    #[error("Invalid record store endpoint: {0}")]
    Endpoint(#[from] AirtableError),
}

/// Application configuration loaded from environment variables.
#[derive(Clone)]
pub struct Config {
    /// API root, e.g. `https://api.airtable.com/v0`
    pub api_url: String,
    /// Base id
    pub base_id: String,
    /// Table name
    pub table_name: String,
    /// Access token
    pub token: String,
    /// Quiet period before typed search text is applied
    pub search_debounce: Duration,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_url", &self.api_url)
            .field("base_id", &self.base_id)
            .field("table_name", &self.table_name)
            .field("token", &"<redacted>")
            .field("search_debounce", &self.search_debounce)
            .finish()
    }
}

impl Config {
    /// Load configuration from the process environment
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] if a required variable is unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Load configuration through `lookup`
    ///
    /// Empty values count as unset. An unparsable debounce falls back to the
    /// default.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] if a required variable is unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|value| !value.trim().is_empty());
        let require = |var: &'static str| get(var).ok_or(ConfigError::Missing(var));

        Ok(Self {
            api_url: get(API_URL_VAR).unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            base_id: require(BASE_ID_VAR)?,
            table_name: require(TABLE_NAME_VAR)?,
            token: require(TOKEN_VAR)?,
            search_debounce: get(SEARCH_DEBOUNCE_VAR)
                .and_then(|s| s.trim().parse().ok())
                .map_or(DEFAULT_SEARCH_DEBOUNCE, Duration::from_millis),
        })
    }

    /// Client for `{api_url}/{base_id}/{table_name}`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Endpoint`] if the API root is not a URL.
    pub fn client(&self) -> Result<AirtableClient, ConfigError> {
        Ok(AirtableClient::from_parts(
            &self.api_url,
            &self.base_id,
            &self.table_name,
            &self.token,
        )?)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |var| vars.get(var).cloned()
    }

    const REQUIRED: [(&str, &str); 3] = [
        (BASE_ID_VAR, "appBase"),
        (TABLE_NAME_VAR, "Todo List"),
        (TOKEN_VAR, "pat-secret"),
    ];

    #[test]
    fn defaults_apply() {
        let config = Config::from_lookup(lookup(&REQUIRED)).unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.search_debounce, Duration::from_millis(500));
        assert_eq!(
            config.client().unwrap().endpoint().as_str(),
            "https://api.airtable.com/v0/appBase/Todo%20List"
        );
    }

    #[test]
    fn missing_and_empty_values_are_reported() {
        let err = Config::from_lookup(lookup(&REQUIRED[..2])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(TOKEN_VAR)));

        let mut vars = REQUIRED.to_vec();
        vars[0] = (BASE_ID_VAR, "  ");
        let err = Config::from_lookup(lookup(&vars)).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(BASE_ID_VAR)));
        assert_eq!(
            err.to_string(),
            "Missing required environment variable TASKDECK_BASE_ID"
        );
    }

    #[test]
    fn overrides_apply() {
        let mut vars = REQUIRED.to_vec();
        vars.push((API_URL_VAR, "http://localhost:9000/v0"));
        vars.push((SEARCH_DEBOUNCE_VAR, "120"));
        let config = Config::from_lookup(lookup(&vars)).unwrap();

        assert_eq!(config.search_debounce, Duration::from_millis(120));
        assert_eq!(
            config.client().unwrap().endpoint().as_str(),
            "http://localhost:9000/v0/appBase/Todo%20List"
        );
    }

    #[test]
    fn token_is_redacted() {
        let config = Config::from_lookup(lookup(&REQUIRED)).unwrap();
        assert!(!format!("{config:?}").contains("pat-secret"));
    }

    #[test]
    fn bad_api_url_is_an_endpoint_error() {
        let mut vars = REQUIRED.to_vec();
        vars.push((API_URL_VAR, "not a url"));
        let config = Config::from_lookup(lookup(&vars)).unwrap();
        assert!(matches!(config.client(), Err(ConfigError::Endpoint(_))));
    }
}
