//! Client configuration.
//!
//! A `ClientConfig` is built once at startup and handed to `ApiClient::new`.
//! It is never mutated afterwards, so concurrent calls share it without
//! locking.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::request::QueryValue;

pub const ENV_VAR: &str = "TICKETDESK_ENV";
pub const API_URL_VAR: &str = "TICKETDESK_API_URL";
pub const TIMEOUT_VAR: &str = "TICKETDESK_TIMEOUT_SECS";

pub const DEVELOPMENT_BASE_URL: &str = "http://localhost:3000/api";
pub const PRODUCTION_BASE_URL: &str = "https://api.ticketdesk.app/api";

/// Deployment environment the base address is resolved from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    /// Reads `TICKETDESK_ENV`. Unset or unrecognized values mean development.
    pub fn from_env() -> Self {
        Self::parse(std::env::var(ENV_VAR).ok().as_deref())
    }

    fn parse(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            _ => Environment::Development,
        }
    }

    pub fn base_url(&self) -> &'static str {
        match self {
            Environment::Development => DEVELOPMENT_BASE_URL,
            Environment::Production => PRODUCTION_BASE_URL,
        }
    }
}

/// Immutable configuration shared by every call of an `ApiClient`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Applied to every request before per-call headers.
    #[serde(default = "default_headers")]
    pub default_headers: Vec<(String, String)>,

    #[serde(default = "default_timeout")]
    pub timeout: Duration,

    /// Endpoint hit by `ApiClient::test_connection`.
    #[serde(default = "default_probe_endpoint")]
    pub probe_endpoint: String,

    #[serde(default = "default_probe_query")]
    pub probe_query: Vec<(String, QueryValue)>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            default_headers: default_headers(),
            timeout: default_timeout(),
            probe_endpoint: default_probe_endpoint(),
            probe_query: default_probe_query(),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self::default().with_base_url(base_url)
    }

    /// Resolve configuration from the process environment.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve configuration through `lookup`, which maps a variable name to
    /// its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ApiError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = Environment::parse(lookup(ENV_VAR).as_deref());
        let mut config = Self::new(environment.base_url());

        if let Some(url) = lookup(API_URL_VAR).filter(|v| !v.trim().is_empty()) {
            url::Url::parse(url.trim())
                .map_err(|e| ApiError::Config(format!("{API_URL_VAR}={url}: {e}")))?;
            config = config.with_base_url(url.trim());
        }

        if let Some(secs) = lookup(TIMEOUT_VAR) {
            let secs: u64 = secs
                .trim()
                .parse()
                .map_err(|e| ApiError::Config(format!("{TIMEOUT_VAR}={secs}: {e}")))?;
            if secs == 0 {
                return Err(ApiError::Config(format!("{TIMEOUT_VAR} must be at least 1")));
            }
            config = config.with_timeout(Duration::from_secs(secs));
        }

        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Add or replace a default header.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        crate::http::set_header(&mut self.default_headers, name, value);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_probe(mut self, endpoint: &str, query: Vec<(String, QueryValue)>) -> Self {
        self.probe_endpoint = endpoint.to_string();
        self.probe_query = query;
        self
    }
}

fn default_base_url() -> String {
    DEVELOPMENT_BASE_URL.to_string()
}

fn default_headers() -> Vec<(String, String)> {
    vec![
        ("Content-Type".to_string(), "application/json".to_string()),
        ("Accept".to_string(), "application/json".to_string()),
    ]
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_probe_endpoint() -> String {
    "/information".to_string()
}

fn default_probe_query() -> Vec<(String, QueryValue)> {
    vec![
        ("action".to_string(), QueryValue::from("suppliers")),
        ("limit".to_string(), QueryValue::from(1)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, DEVELOPMENT_BASE_URL);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.default_headers.len(), 2);
        assert_eq!(config.probe_endpoint, "/information");
    }

    #[test]
    fn environment_selects_base_url() {
        let config = ClientConfig::from_lookup(lookup(&[(ENV_VAR, "production")])).unwrap();
        assert_eq!(config.base_url, PRODUCTION_BASE_URL);

        let config = ClientConfig::from_lookup(lookup(&[(ENV_VAR, "PROD")])).unwrap();
        assert_eq!(config.base_url, PRODUCTION_BASE_URL);

        let config = ClientConfig::from_lookup(lookup(&[(ENV_VAR, "staging")])).unwrap();
        assert_eq!(config.base_url, DEVELOPMENT_BASE_URL);

        let config = ClientConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.base_url, DEVELOPMENT_BASE_URL);
    }

    #[test]
    fn overrides_from_environment() {
        let config = ClientConfig::from_lookup(lookup(&[
            (ENV_VAR, "production"),
            (API_URL_VAR, "http://10.0.0.5:8080/api/"),
            (TIMEOUT_VAR, "5"),
        ]))
        .unwrap();
        assert_eq!(config.base_url, "http://10.0.0.5:8080/api");
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn bad_overrides_are_config_errors() {
        let err = ClientConfig::from_lookup(lookup(&[(TIMEOUT_VAR, "soon")])).unwrap_err();
        assert!(matches!(err, ApiError::Config(_)));

        let err = ClientConfig::from_lookup(lookup(&[(TIMEOUT_VAR, "0")])).unwrap_err();
        assert!(matches!(err, ApiError::Config(_)));

        let err = ClientConfig::from_lookup(lookup(&[(API_URL_VAR, "not a url")])).unwrap_err();
        assert!(matches!(err, ApiError::Config(_)));
    }

    #[test]
    fn with_header_replaces_existing_default() {
        let config = ClientConfig::default().with_header("accept", "text/csv");
        assert_eq!(config.default_headers.len(), 2);
        assert_eq!(crate::http::find_header(&config.default_headers, "Accept"), Some("text/csv"));
    }

    #[test]
    fn deserializes_with_field_defaults() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"base_url":"https://example.test/api"}"#).unwrap();
        assert_eq!(config.base_url, "https://example.test/api");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.probe_query, default_probe_query());
    }
}
