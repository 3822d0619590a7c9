//! Port traits implemented by infrastructure crates.
//!
//! The routes in [`crate::routes`] depend only on these traits:
//!
//! | Trait | Implemented by |
//! |-------|----------------|
//! | [`HttpTransport`] | `web::ReqwestTransport` |
//! | [`EnvelopeCodec`] | `proto::ProtoCodec` |

use std::sync::Arc;

use async_trait::async_trait;

use crate::{DecodeError, RawResponse, TransportError, TransportRequest};

/// Performs a single HTTP GET and buffers the whole response.
///
/// Implementations must report connection-establishment failures as
/// [`TransportError::Connect`] and everything else as
/// [`TransportError::Request`]. Connection pooling, TLS, and redirects are the
/// implementation's business.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, request: &TransportRequest) -> Result<RawResponse, TransportError>;
}

#[async_trait]
impl<T: HttpTransport + ?Sized> HttpTransport for Arc<T> {
    async fn get(&self, request: &TransportRequest) -> Result<RawResponse, TransportError> {
        (**self).get(request).await
    }
}

/// The fields of a decoded handshake envelope the sign-fetch route consumes.
pub trait Envelope {
    /// Pagination cursor to forward on the next request.
    fn cursor(&self) -> &str;

    /// Extension token (`internal_ext`) to forward on the next request.
    fn extension_token(&self) -> &str;
}

/// Decodes a handshake envelope from the raw response body.
pub trait EnvelopeCodec: Send + Sync {
    type Envelope: Envelope + Send;

    fn decode(&self, body: &[u8]) -> Result<Self::Envelope, DecodeError>;
}
