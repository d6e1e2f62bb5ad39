//! Remote backend configuration.

use std::env;

use serde::{Deserialize, Serialize};

use crate::util::{is_http_url, normalize_text_option};
use crate::{Error, Result};

/// Environment variable naming the remote table endpoint.
pub const REMOTE_URL_ENV: &str = "MOREL_REMOTE_URL";
/// Environment variable holding the remote API key.
pub const REMOTE_KEY_ENV: &str = "MOREL_REMOTE_KEY";

/// Connection settings for the remote observation table.
///
/// These are safe-to-ship public endpoint/key values; absence simply means
/// the device runs local-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Base URL of the remote API (`https://...`)
    pub endpoint: String,
    /// API key sent with every request
    pub api_key: String,
}

impl RemoteConfig {
    /// Build a validated configuration.
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let endpoint = normalize_text_option(Some(endpoint.into()))
            .ok_or_else(|| Error::InvalidInput("Remote endpoint must not be empty".to_string()))?;
        if !is_http_url(&endpoint) {
            return Err(Error::InvalidInput(
                "Remote endpoint must include http:// or https://".to_string(),
            ));
        }

        let api_key = normalize_text_option(Some(api_key.into()))
            .ok_or_else(|| Error::InvalidInput("Remote API key must not be empty".to_string()))?;

        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// Read configuration from the environment.
    ///
    /// Returns `Ok(None)` when either variable is absent or blank; invalid
    /// values are errors.
    pub fn from_env() -> Result<Option<Self>> {
        let endpoint = normalize_text_option(env::var(REMOTE_URL_ENV).ok());
        let api_key = normalize_text_option(env::var(REMOTE_KEY_ENV).ok());

        match (endpoint, api_key) {
            (Some(endpoint), Some(api_key)) => Ok(Some(Self::new(endpoint, api_key)?)),
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_invalid_values() {
        assert!(RemoteConfig::new("", "key").is_err());
        assert!(RemoteConfig::new("api.example.com", "key").is_err());
        assert!(RemoteConfig::new("https://api.example.com", "  ").is_err());
    }

    #[test]
    fn new_trims_trailing_slash() {
        let config = RemoteConfig::new("https://api.example.com/", "key").unwrap();
        assert_eq!(config.endpoint, "https://api.example.com");
        assert_eq!(config.api_key, "key");
    }
}
