//! Client facade: one transport, one codec, one session, every route.

use std::sync::Arc;
use std::time::Duration;

use proto::{ProtoCodec, WebcastResponse};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use webcast::{
    ApiKey, ConfigError, ImageFetchError, ImageFetchRoute, ImageSource, Session, SignApiError,
    SignConfig, SignFetchRoute,
};

use crate::ReqwestTransport;

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// `User-Agent` sent on every request.
pub const DEFAULT_USER_AGENT: &str = concat!("webcast-sign/", env!("CARGO_PKG_VERSION"));

/// Settings for [`WebClient`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebClientConfig {
    /// Sign server settings.
    #[serde(flatten)]
    pub sign: SignConfig,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for WebClientConfig {
    fn default() -> Self {
        Self {
            sign: SignConfig::default(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

/// Why a [`WebClient`] could not be built.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

/// Webcast HTTP client sharing one session between its routes.
pub struct WebClient {
    session: Arc<Session>,
    api_key: Option<ApiKey>,
    sign: SignFetchRoute<Arc<ReqwestTransport>, ProtoCodec>,
    image: ImageFetchRoute<Arc<ReqwestTransport>>,
}

impl WebClient {
    /// Builds a client with a fresh, empty session.
    pub fn new(config: WebClientConfig, api_key: Option<ApiKey>) -> Result<Self, BuildError> {
        Self::with_session(config, api_key, Arc::new(Session::new()))
    }

    /// Builds a client around an existing session.
    pub fn with_session(
        config: WebClientConfig,
        api_key: Option<ApiKey>,
        session: Arc<Session>,
    ) -> Result<Self, BuildError> {
        if config.timeout_secs == 0 {
            return Err(ConfigError::new("timeout_secs must be greater than zero").into());
        }
        let transport = Arc::new(ReqwestTransport::new(
            Duration::from_secs(config.timeout_secs),
            &config.user_agent,
        )?);

        Ok(Self {
            session,
            api_key,
            sign: SignFetchRoute::new(Arc::clone(&transport), ProtoCodec, config.sign)?,
            image: ImageFetchRoute::new(transport),
        })
    }

    /// The session every route of this client reads and updates.
    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn sign_config(&self) -> &SignConfig {
        self.sign.config()
    }

    /// Performs one sign-server handshake. See [`SignFetchRoute::fetch`].
    pub async fn fetch_sign(
        &self,
        extra_params: &[(String, String)],
    ) -> Result<WebcastResponse, SignApiError> {
        self.sign
            .fetch(&self.session, self.api_key.as_ref(), extra_params)
            .await
    }

    /// Downloads an image from the CDN.
    pub async fn fetch_image(
        &self,
        image: impl Into<ImageSource>,
    ) -> Result<Vec<u8>, ImageFetchError> {
        self.image.fetch(image).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_flatten_sign_settings() {
        let config: WebClientConfig = serde_json::from_str(
            r#"{"sign_url": "http://localhost:9000", "timeout_secs": 3}"#,
        )
        .unwrap();
        assert_eq!(config.sign.sign_url, "http://localhost:9000");
        assert_eq!(config.sign.client_name, webcast::DEFAULT_CLIENT_NAME);
        assert_eq!(config.timeout_secs, 3);
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let config = WebClientConfig {
            timeout_secs: 0,
            ..WebClientConfig::default()
        };
        assert!(matches!(
            WebClient::new(config, None),
            Err(BuildError::Config(_))
        ));
    }

    #[test]
    fn invalid_sign_url_is_rejected() {
        let mut config = WebClientConfig::default();
        config.sign.sign_url = "ftp://sign.example".to_owned();
        assert!(matches!(
            WebClient::new(config, None),
            Err(BuildError::Config(_))
        ));
    }
}
