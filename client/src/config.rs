use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.dashamail.com";
pub const RESPONSE_FORMAT: &str = "json";
pub const DEFAULT_TIMEOUT_SECS: f64 = 10.0;

/// Settings applied to the underlying HTTP client on every request.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TransportOptions {
    /// Proxy URL used for all requests, e.g. `http://127.0.0.1:3128`
    pub proxy: Option<String>,
    /// Skip TLS certificate verification
    pub accept_invalid_certs: bool,
    pub user_agent: Option<String>,
    /// Extra headers sent with every request
    pub headers: HashMap<String, String>,
}

/// Client configuration. Can be built in code or deserialized with serde.
#[derive(Clone, PartialEq, Deserialize)]
pub struct ClientConfig {
    pub api_key: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: f64,
    /// Turn API-reported failures (`err_code != 0`) into `ClientError::Api`
    #[serde(default)]
    pub raise_for_error: bool,
    #[serde(default)]
    pub transport: TransportOptions,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout() -> f64 {
    DEFAULT_TIMEOUT_SECS
}

impl ClientConfig {
    pub fn new<S: Into<String>>(api_key: S) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: default_base_url(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            raise_for_error: false,
            transport: TransportOptions::default(),
        }
    }

    pub fn with_base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout_secs: f64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn with_raise_for_error(mut self, raise_for_error: bool) -> Self {
        self.raise_for_error = raise_for_error;
        self
    }

    pub fn with_transport_options(mut self, transport: TransportOptions) -> Self {
        self.transport = transport;
        self
    }

    /// Request timeout. Negative or non-finite values fall back to the default.
    pub fn timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.timeout_secs)
            .unwrap_or_else(|_| Duration::from_secs_f64(DEFAULT_TIMEOUT_SECS))
    }
}

// Keeps the API key out of logs.
impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("raise_for_error", &self.raise_for_error)
            .field("transport", &self.transport)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_uses_defaults() {
        let config = ClientConfig::new("key");
        assert_eq!(config.base_url, "https://api.dashamail.com");
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert!(!config.raise_for_error);
        assert_eq!(config.transport, TransportOptions::default());
    }

    #[test]
    fn deserialize_fills_missing_fields() {
        let config: ClientConfig = serde_json::from_str(r#"{"api_key":"abc"}"#).unwrap();
        assert_eq!(config, ClientConfig::new("abc"));
    }

    #[test]
    fn deserialize_transport_options() {
        let config: ClientConfig = serde_json::from_str(
            r#"{
                "api_key": "abc",
                "timeout_secs": 2.5,
                "raise_for_error": true,
                "transport": {"proxy": "http://proxy:3128", "headers": {"X-Trace": "1"}}
            }"#,
        )
        .unwrap();
        assert_eq!(config.timeout(), Duration::from_millis(2500));
        assert!(config.raise_for_error);
        assert_eq!(config.transport.proxy.as_deref(), Some("http://proxy:3128"));
        assert!(!config.transport.accept_invalid_certs);
        assert_eq!(config.transport.headers.get("X-Trace").map(String::as_str), Some("1"));
    }

    #[test]
    fn deserialize_requires_api_key() {
        let result: Result<ClientConfig, _> = serde_json::from_str(r#"{"timeout_secs":1.0}"#);
        assert!(result.is_err());
    }

    #[test]
    fn invalid_timeout_falls_back_to_default() {
        let config = ClientConfig::new("key").with_timeout(-1.0);
        assert_eq!(config.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn debug_output_hides_api_key() {
        let rendered = format!("{:?}", ClientConfig::new("super-secret"));
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
