//! Sign-fetch domain for the webcast client.
//!
//! This crate owns the handshake protocol with the sign server: the request it
//! sends, the classification of every response shape into a typed error, the
//! cookie-header parser, and the session state a successful handshake updates.
//! Infrastructure crates implement the port traits defined here; they never
//! add protocol rules.
//!
//! ## Architectural Layer
//!
//! **Protocol logic + port definitions.** No I/O dependencies. The HTTP
//! transport and the envelope codec are reached through [`HttpTransport`] and
//! [`EnvelopeCodec`].
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtypes (`ClientName`, `ApiKey`, `AttemptId`, `CookieName`) |
//! | [`types`] | Transport values, `RateLimitInfo`, `CookieRecord`, `ImageSource` |
//! | [`errors`] | `SignApiError` taxonomy, port errors, `RetryPolicy` |
//! | [`config`] | `SignConfig` |
//! | [`cookies`] | `X-Set-TT-Cookie` parser |
//! | [`session`] | Shared, mutex-guarded session state |
//! | [`ports`] | `HttpTransport`, `EnvelopeCodec`, `Envelope` |
//! | [`routes`] | `SignFetchRoute`, `ImageFetchRoute` |

pub mod config;
pub mod cookies;
pub mod errors;
pub mod identifiers;
pub mod ports;
pub mod routes;
pub mod session;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use config::{SignConfig, DEFAULT_CLIENT_NAME, DEFAULT_SIGN_URL, SIGN_FETCH_PATH};
pub use cookies::parse_cookie_header;
pub use errors::{
    BoxError, ConfigError, DecodeError, ErrorReason, ImageFetchError, RetryPolicy, SignApiError,
    TransportError,
};
pub use identifiers::{ApiKey, AttemptId, ClientName, CookieName};
pub use ports::{Envelope, EnvelopeCodec, HttpTransport};
pub use routes::{ImageFetchRoute, SignFetchRoute};
pub use session::{CookieJar, HandshakeUpdate, Session, SessionState};
pub use types::{
    format_sign_server_message, CookieRecord, HandshakeRequest, ImageSource, RateLimitInfo,
    RawResponse, ResponseHeaders, TransportRequest, COOKIE_DOMAIN, SIGN_SERVER_MESSAGE_LABEL,
};
