//! Error and retry-policy types for the sign-fetch routes.
//!
//! [`SignApiError`] is the closed set of outcomes a handshake can fail with.
//! Each variant maps to one [`ErrorReason`] discriminant whose name prefixes
//! the error text (`[RATE_LIMIT] ...`).
//!
//! [`TransportError`] and [`DecodeError`] are the errors the port traits in
//! [`crate::ports`] return; the routes classify them into [`SignApiError`].
//!
//! [`RetryPolicy`] is advisory only. Nothing in this crate retries.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::RateLimitInfo;

/// Boxed cause carried by port errors.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

// ---------------------------------------------------------------------------
// Retry semantics
// ---------------------------------------------------------------------------

/// Whether an error condition is worth retrying and, if so, after what delay.
///
/// Derived from a [`SignApiError`] so callers can implement back-off without
/// matching on every variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RetryPolicy {
    /// The operation may be retried.
    Retryable {
        /// Minimum back-off before the next attempt. `None` means apply the
        /// caller's own back-off schedule.
        after: Option<Duration>,
    },
    /// Retrying the same request will fail the same way.
    NonRetryable,
}

// ---------------------------------------------------------------------------
// Port errors
// ---------------------------------------------------------------------------

/// Failure reported by an [`crate::HttpTransport`].
#[derive(Debug, Error)]
pub enum TransportError {
    /// No connection could be established (DNS, refused, TLS handshake).
    #[error("connection failed: {source}")]
    Connect {
        #[source]
        source: BoxError,
    },

    /// The connection was made but the exchange failed (timeout, reset, body read).
    #[error("request failed: {source}")]
    Request {
        #[source]
        source: BoxError,
    },
}

impl TransportError {
    /// Wraps a connection-level cause.
    pub fn connect(source: impl Into<BoxError>) -> Self {
        Self::Connect {
            source: source.into(),
        }
    }

    /// Wraps any other transport cause.
    pub fn request(source: impl Into<BoxError>) -> Self {
        Self::Request {
            source: source.into(),
        }
    }
}

/// Failure reported by an [`crate::EnvelopeCodec`].
#[derive(Debug, Error)]
#[error("envelope decode failed: {source}")]
pub struct DecodeError {
    #[source]
    source: BoxError,
}

impl DecodeError {
    /// Wraps the codec's own error.
    pub fn new(source: impl Into<BoxError>) -> Self {
        Self {
            source: source.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Sign API errors
// ---------------------------------------------------------------------------

/// Discriminant of a [`SignApiError`].
///
/// Numeric values are stable across releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ErrorReason {
    /// HTTP 429 from the sign server.
    RateLimit = 1,
    /// No connection to the sign server.
    ConnectError = 2,
    /// Empty response body.
    EmptyPayload = 3,
    /// Status other than 200 or 429.
    SignNot200 = 4,
    /// 200 without the cookie header.
    EmptyCookies = 5,
    /// Body is not a valid envelope.
    DecodeError = 6,
    /// Failure after the connection was made.
    TransportError = 7,
}

impl ErrorReason {
    /// Upper-snake name used as the error text prefix.
    pub fn name(self) -> &'static str {
        match self {
            Self::RateLimit => "RATE_LIMIT",
            Self::ConnectError => "CONNECT_ERROR",
            Self::EmptyPayload => "EMPTY_PAYLOAD",
            Self::SignNot200 => "SIGN_NOT_200",
            Self::EmptyCookies => "EMPTY_COOKIES",
            Self::DecodeError => "DECODE_ERROR",
            Self::TransportError => "TRANSPORT_ERROR",
        }
    }
}

impl std::fmt::Display for ErrorReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Why a sign-fetch handshake failed.
///
/// Exactly one variant is produced per failed attempt. The session is never
/// modified when any of these is returned.
#[derive(Debug, Error)]
pub enum SignApiError {
    /// The sign server rejected the attempt with HTTP 429.
    #[error("[RATE_LIMIT] {}", .0.describe())]
    RateLimit(RateLimitInfo),

    /// The sign server could not be reached.
    #[error("[CONNECT_ERROR] Failed to connect to the sign server: {source}")]
    Connect {
        #[source]
        source: TransportError,
    },

    /// The sign server answered with an empty body, whatever the status.
    #[error("[EMPTY_PAYLOAD] Sign API returned an empty payload (status {status}). Are you being detected by TikTok?")]
    EmptyPayload {
        /// HTTP status of the empty response.
        status: u16,
    },

    /// The sign server answered with a status other than 200 or 429.
    #[error("[SIGN_NOT_200] Failed request to Sign API with status code {status} and payload \"{body_snippet}\".")]
    SignNot200 {
        /// HTTP status code received.
        status: u16,
        /// Leading part of the body, lossily decoded, for diagnostics.
        body_snippet: String,
    },

    /// A 200 envelope arrived without the `X-Set-TT-Cookie` header.
    #[error("[EMPTY_COOKIES] Sign server did not return cookies!")]
    EmptyCookies,

    /// A 200, non-empty body could not be decoded as an envelope.
    #[error("[DECODE_ERROR] Sign server returned a payload that is not a valid envelope: {source}")]
    Decode {
        #[source]
        source: DecodeError,
    },

    /// The transport failed after the connection was established.
    #[error("[TRANSPORT_ERROR] Request to the sign server failed: {source}")]
    Transport {
        #[source]
        source: TransportError,
    },
}

impl SignApiError {
    /// The discriminant of this error.
    pub fn reason(&self) -> ErrorReason {
        match self {
            Self::RateLimit(_) => ErrorReason::RateLimit,
            Self::Connect { .. } => ErrorReason::ConnectError,
            Self::EmptyPayload { .. } => ErrorReason::EmptyPayload,
            Self::SignNot200 { .. } => ErrorReason::SignNot200,
            Self::EmptyCookies => ErrorReason::EmptyCookies,
            Self::Decode { .. } => ErrorReason::DecodeError,
            Self::Transport { .. } => ErrorReason::TransportError,
        }
    }

    /// Rate-limit details, when this is a `RATE_LIMIT` error.
    pub fn rate_limit(&self) -> Option<&RateLimitInfo> {
        match self {
            Self::RateLimit(info) => Some(info),
            _ => None,
        }
    }

    /// Seconds the server asked us to wait, for `RATE_LIMIT` errors.
    pub fn retry_after(&self) -> Option<u64> {
        self.rate_limit().map(RateLimitInfo::retry_after)
    }

    /// Reset timestamp the server reported, for `RATE_LIMIT` errors.
    pub fn reset_time(&self) -> Option<u64> {
        self.rate_limit().and_then(RateLimitInfo::reset_time)
    }

    /// Advisory retry policy for this failure.
    pub fn retry_policy(&self) -> RetryPolicy {
        match self {
            Self::RateLimit(info) => RetryPolicy::Retryable {
                after: Some(Duration::from_secs(info.retry_after())),
            },
            Self::Connect { .. } | Self::Transport { .. } => RetryPolicy::Retryable { after: None },
            Self::SignNot200 { status, .. } if *status >= 500 => {
                RetryPolicy::Retryable { after: None }
            }
            Self::EmptyPayload { .. }
            | Self::SignNot200 { .. }
            | Self::EmptyCookies
            | Self::Decode { .. } => RetryPolicy::NonRetryable,
        }
    }
}

// ---------------------------------------------------------------------------
// Other route / configuration errors
// ---------------------------------------------------------------------------

/// Why an image could not be fetched.
#[derive(Debug, Error)]
pub enum ImageFetchError {
    /// The image source carried no URL.
    #[error("image has no URL to fetch")]
    NoUrl,

    /// The CDN request failed.
    #[error("image fetch failed: {0}")]
    Transport(#[from] TransportError),
}

/// Invalid client configuration. Produced at load time.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Configuration error: {message}")]
pub struct ConfigError {
    /// Description of the configuration problem.
    pub message: String,
}

impl ConfigError {
    /// Builds an error from a description of the problem.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
