//! The sign-fetch handshake.
//!
//! One call to [`SignFetchRoute::fetch`] is one attempt: a single GET to
//! `<sign_url>/webcast/fetch/`, classified into exactly one outcome. The
//! response is checked in this order:
//!
//! 1. status 429 → [`SignApiError::RateLimit`]
//! 2. empty body → [`SignApiError::EmptyPayload`]
//! 3. status other than 200 → [`SignApiError::SignNot200`]
//! 4. undecodable body → [`SignApiError::Decode`]
//! 5. no `X-Set-TT-Cookie` header → [`SignApiError::EmptyCookies`]
//!
//! Only when all five pass is the session updated, in one critical section.
//! Dropping the returned future cancels the attempt and leaves the session
//! as it was.

use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use crate::cookies::parse_cookie_header;
use crate::session::HandshakeUpdate;
use crate::{
    ApiKey, AttemptId, ClientName, ConfigError, Envelope, EnvelopeCodec, HandshakeRequest,
    HttpTransport, RateLimitInfo, RawResponse, ResponseHeaders, Session, SignApiError, SignConfig,
    TransportError,
};

/// Header carrying the platform cookies on a successful handshake.
pub const COOKIE_HEADER: &str = "X-Set-TT-Cookie";

/// Header carrying the seconds to wait after a 429.
pub const RETRY_AFTER_HEADER: &str = "RateLimit-Reset";

/// Header carrying the reset timestamp after a 429.
pub const RESET_TIME_HEADER: &str = "X-RateLimit-Reset";

/// Maximum number of body bytes quoted in a `SIGN_NOT_200` error.
const BODY_SNIPPET_LEN: usize = 256;

/// JSON body of a 429 response. Every field is optional.
#[derive(Debug, Default, Deserialize)]
struct RateLimitBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    limit_label: Option<String>,
}

/// Calls the sign server for the envelope used to open the webcast stream.
pub struct SignFetchRoute<T, C> {
    transport: T,
    codec: C,
    config: SignConfig,
    client: ClientName,
}

impl<T, C> SignFetchRoute<T, C>
where
    T: HttpTransport,
    C: EnvelopeCodec,
{
    /// Creates the route, validating `config` up front.
    pub fn new(transport: T, codec: C, config: SignConfig) -> Result<Self, ConfigError> {
        let client = config.validate()?;
        Ok(Self {
            transport,
            codec,
            config,
            client,
        })
    }

    /// The configuration this route was built with.
    pub fn config(&self) -> &SignConfig {
        &self.config
    }

    /// Performs one handshake attempt.
    ///
    /// On success the session's cursor, extension token, and cookies have
    /// been replaced by the envelope's; on any error the session is untouched.
    /// No retries happen here; see [`SignApiError::retry_policy`].
    #[instrument(
        name = "sign_fetch",
        skip_all,
        fields(attempt = tracing::field::Empty, status = tracing::field::Empty)
    )]
    pub async fn fetch(
        &self,
        session: &Session,
        api_key: Option<&ApiKey>,
        extra_params: &[(String, String)],
    ) -> Result<C::Envelope, SignApiError> {
        let handshake = HandshakeRequest {
            attempt: AttemptId::new_random(),
            url: self.config.fetch_url(),
            client: self.client.clone(),
            api_key: api_key.cloned(),
            extra_params: extra_params.to_vec(),
        };
        let span = tracing::Span::current();
        span.record("attempt", tracing::field::display(handshake.attempt));

        let request = handshake.to_transport_request(&session.query_params());
        debug!(url = %request.url, has_api_key = api_key.is_some(), "requesting sign server");

        let response = self.transport.get(&request).await.map_err(|e| match e {
            TransportError::Connect { .. } => {
                warn!(error = %e, "could not connect to sign server");
                SignApiError::Connect { source: e }
            }
            TransportError::Request { .. } => {
                warn!(error = %e, "sign server request failed");
                SignApiError::Transport { source: e }
            }
        })?;
        span.record("status", response.status);

        let envelope = self.classify(&response)?;

        let Some(header) = response.headers.get(COOKIE_HEADER).filter(|h| !h.is_empty()) else {
            warn!("sign server returned no cookies");
            return Err(SignApiError::EmptyCookies);
        };
        let cookies = parse_cookie_header(header);

        session.apply_handshake(HandshakeUpdate {
            cursor: envelope.cursor().to_owned(),
            extension_token: envelope.extension_token().to_owned(),
            cookies,
        });
        info!(
            cursor = envelope.cursor(),
            "sign server handshake complete"
        );

        Ok(envelope)
    }

    fn classify(&self, response: &RawResponse) -> Result<C::Envelope, SignApiError> {
        if response.status == 429 {
            let info = self.rate_limit_info(response);
            warn!(
                retry_after = info.retry_after(),
                reset_time = info.reset_time(),
                limit_label = info.limit_label(),
                "sign server rate limit hit"
            );
            return Err(SignApiError::RateLimit(info));
        }

        if response.body.is_empty() {
            warn!(status = response.status, "sign server returned an empty payload");
            return Err(SignApiError::EmptyPayload {
                status: response.status,
            });
        }

        if response.status != 200 {
            warn!(status = response.status, "sign server returned non-200 status");
            return Err(SignApiError::SignNot200 {
                status: response.status,
                body_snippet: body_snippet(&response.body),
            });
        }

        self.codec.decode(&response.body).map_err(|source| {
            warn!(error = %source, bytes = response.body.len(), "undecodable sign payload");
            SignApiError::Decode { source }
        })
    }

    fn rate_limit_info(&self, response: &RawResponse) -> RateLimitInfo {
        let body: RateLimitBody = serde_json::from_slice(&response.body).unwrap_or_else(|e| {
            debug!(error = %e, "429 body is not the expected JSON");
            RateLimitBody::default()
        });

        let message = if self.config.suppress_server_message {
            None
        } else {
            body.message
        };

        RateLimitInfo::new(
            header_u64(&response.headers, RETRY_AFTER_HEADER).unwrap_or(0),
            header_u64(&response.headers, RESET_TIME_HEADER),
            message,
            body.limit_label,
        )
    }
}

fn header_u64(headers: &ResponseHeaders, name: &str) -> Option<u64> {
    let raw = headers.get(name)?.trim();
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(header = name, value = raw, "ignoring non-integer rate-limit header");
            None
        }
    }
}

fn body_snippet(body: &[u8]) -> String {
    let end = body.len().min(BODY_SNIPPET_LEN);
    let mut snippet = String::from_utf8_lossy(&body[..end]).into_owned();
    if body.len() > end {
        snippet.push_str("...");
    }
    snippet
}
