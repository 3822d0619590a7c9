//! Sign-server configuration.
//!
//! Values are supplied by the composition root (CLI flags, environment, or a
//! config file) and passed into the routes explicitly. Nothing in this crate
//! reads process state.

use serde::{Deserialize, Serialize};

use crate::{ClientName, ConfigError};

/// Default sign server base URL.
pub const DEFAULT_SIGN_URL: &str = "https://tiktok.eulerstream.com";

/// Default value of the `client` query parameter.
pub const DEFAULT_CLIENT_NAME: &str = "ttlive-rust";

/// Path of the handshake endpoint, relative to the sign server base URL.
pub const SIGN_FETCH_PATH: &str = "/webcast/fetch/";

/// Settings for talking to the sign server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignConfig {
    /// Base URL of the sign server, without a trailing path.
    pub sign_url: String,
    /// Name sent as the `client` query parameter.
    pub client_name: String,
    /// Drop the server-provided message from `RATE_LIMIT` errors.
    pub suppress_server_message: bool,
}

impl Default for SignConfig {
    fn default() -> Self {
        Self {
            sign_url: DEFAULT_SIGN_URL.to_owned(),
            client_name: DEFAULT_CLIENT_NAME.to_owned(),
            suppress_server_message: false,
        }
    }
}

impl SignConfig {
    /// Checks the configuration, returning the validated client name.
    pub fn validate(&self) -> Result<ClientName, ConfigError> {
        let url = self.sign_url.trim();
        if url.is_empty() {
            return Err(ConfigError::new("sign_url must not be empty"));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::new(format!(
                "sign_url must be an http(s) URL, got '{url}'"
            )));
        }
        ClientName::new(self.client_name.trim())
            .ok_or_else(|| ConfigError::new("client_name must not be empty"))
    }

    /// Full URL of the handshake endpoint.
    pub fn fetch_url(&self) -> String {
        format!("{}{}", self.sign_url.trim().trim_end_matches('/'), SIGN_FETCH_PATH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = SignConfig::default();
        assert_eq!(config.validate().unwrap().as_str(), DEFAULT_CLIENT_NAME);
        assert!(!config.suppress_server_message);
    }

    #[test]
    fn fetch_url_joins_without_double_slash() {
        let config = SignConfig {
            sign_url: "http://127.0.0.1:8080/".to_owned(),
            ..SignConfig::default()
        };
        assert_eq!(config.fetch_url(), "http://127.0.0.1:8080/webcast/fetch/");
    }

    #[test]
    fn rejects_bad_values() {
        let no_scheme = SignConfig {
            sign_url: "sign.example".to_owned(),
            ..SignConfig::default()
        };
        assert!(no_scheme.validate().is_err());

        let no_client = SignConfig {
            client_name: "  ".to_owned(),
            ..SignConfig::default()
        };
        assert_eq!(
            no_client.validate(),
            Err(ConfigError::new("client_name must not be empty"))
        );
    }

    #[test]
    fn partial_config_fills_defaults() {
        let config: SignConfig =
            serde_json::from_str(r#"{"suppress_server_message": true}"#).unwrap();
        assert!(config.suppress_server_message);
        assert_eq!(config.sign_url, DEFAULT_SIGN_URL);
    }
}
