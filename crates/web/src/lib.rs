//! Webcast HTTP infrastructure.
//!
//! Implements [`webcast::HttpTransport`] over `reqwest` and wires it, the
//! protobuf codec from [`proto`], and a shared [`webcast::Session`] into
//! [`WebClient`].
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** TLS, connection pooling, timeouts, and response
//! buffering live here. Protocol rules stay in [`webcast`].

pub mod client;
pub mod transport;

pub use client::{BuildError, WebClient, WebClientConfig, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT};
pub use transport::ReqwestTransport;
