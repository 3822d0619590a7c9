//! Shared value types for the sign-fetch exchange.
//!
//! These are the values that cross the port boundary ([`TransportRequest`],
//! [`RawResponse`]) and the structured data the routes produce from a response
//! ([`RateLimitInfo`], [`CookieRecord`]).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{ApiKey, AttemptId, ClientName, CookieName};

/// Platform root domain every sign-server cookie is stored under.
pub const COOKIE_DOMAIN: &str = ".tiktok.com";

// ---------------------------------------------------------------------------
// Transport values
// ---------------------------------------------------------------------------

/// A GET request as handed to an [`crate::HttpTransport`].
///
/// Query pairs are kept in order; the transport encodes them as given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportRequest {
    /// Absolute URL without a query string.
    pub url: String,
    /// Query parameters in the order they should be sent.
    pub query: Vec<(String, String)>,
}

impl TransportRequest {
    /// A request with no query parameters.
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            query: Vec::new(),
        }
    }

    /// Returns the value of the last query pair named `name`.
    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .rev()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Response headers with case-insensitive lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseHeaders(Vec<(String, String)>);

impl ResponseHeaders {
    /// Creates an empty header set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a header. Repeated names are kept; [`get`](Self::get) returns the first.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push((name.into(), value.into()));
    }

    /// Returns the first value for `name`, compared ASCII case-insensitively.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

impl<K, V> FromIterator<(K, V)> for ResponseHeaders
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// A fully buffered HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: ResponseHeaders,
    /// Complete response body.
    pub body: Vec<u8>,
}

// ---------------------------------------------------------------------------
// Handshake request
// ---------------------------------------------------------------------------

/// One sign-fetch attempt, fixed before the request is issued.
#[derive(Debug, Clone)]
pub struct HandshakeRequest {
    /// Correlation id recorded on the attempt's span.
    pub attempt: AttemptId,
    /// Full endpoint URL (`<sign_url>/webcast/fetch/`).
    pub url: String,
    /// Value of the `client` query parameter.
    pub client: ClientName,
    /// Value of the `apiKey` query parameter; sent empty when absent.
    pub api_key: Option<ApiKey>,
    /// Caller-supplied query parameters.
    pub extra_params: Vec<(String, String)>,
}

impl HandshakeRequest {
    /// Renders the attempt into a transport request.
    ///
    /// Session params, caller extras, then `client` and `apiKey` are merged
    /// into one key-unique list. A later value for a name replaces the earlier
    /// one in place, so each name is sent once and the protocol parameters
    /// always carry this client's values.
    pub fn to_transport_request(&self, session_params: &[(String, String)]) -> TransportRequest {
        let api_key = self
            .api_key
            .as_ref()
            .map(|k| k.expose().to_owned())
            .unwrap_or_default();
        let protocol = [
            ("client".to_owned(), self.client.as_str().to_owned()),
            ("apiKey".to_owned(), api_key),
        ];

        let mut query: Vec<(String, String)> =
            Vec::with_capacity(session_params.len() + self.extra_params.len() + protocol.len());
        for (name, value) in session_params
            .iter()
            .chain(self.extra_params.iter())
            .chain(protocol.iter())
        {
            match query.iter_mut().find(|(existing, _)| existing == name) {
                Some(slot) => slot.1 = value.clone(),
                None => query.push((name.clone(), value.clone())),
            }
        }

        TransportRequest {
            url: self.url.clone(),
            query,
        }
    }
}

// ---------------------------------------------------------------------------
// Rate limiting
// ---------------------------------------------------------------------------

/// Retry guidance extracted from a 429 sign-server response.
///
/// Header values are passed through as integers without interpreting their
/// units; `reset_at` is offered as a convenience for the common case of a
/// Unix timestamp in seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitInfo {
    retry_after: u64,
    reset_time: Option<u64>,
    server_message: Option<String>,
    limit_label: Option<String>,
}

impl RateLimitInfo {
    /// Creates rate-limit info. Empty message or label strings are treated as absent.
    pub fn new(
        retry_after: u64,
        reset_time: Option<u64>,
        server_message: Option<String>,
        limit_label: Option<String>,
    ) -> Self {
        Self {
            retry_after,
            reset_time,
            server_message: server_message.filter(|m| !m.trim().is_empty()),
            limit_label: limit_label.filter(|l| !l.is_empty()),
        }
    }

    /// Seconds to wait before the next attempt (`RateLimit-Reset`). Zero when
    /// the header was absent.
    pub fn retry_after(&self) -> u64 {
        self.retry_after
    }

    /// Raw `X-RateLimit-Reset` value, if the server sent one.
    pub fn reset_time(&self) -> Option<u64> {
        self.reset_time
    }

    /// `reset_time` read as Unix seconds.
    pub fn reset_at(&self) -> Option<DateTime<Utc>> {
        let secs = i64::try_from(self.reset_time?).ok()?;
        DateTime::from_timestamp(secs, 0)
    }

    /// Message forwarded by the sign server, if any.
    pub fn server_message(&self) -> Option<&str> {
        self.server_message.as_deref()
    }

    /// Which limit was hit (e.g. `"ip"`), if the server said.
    pub fn limit_label(&self) -> Option<&str> {
        self.limit_label.as_deref()
    }

    /// Human-readable description used in the `RATE_LIMIT` error text.
    pub fn describe(&self) -> String {
        let mut text = String::new();
        if let Some(label) = &self.limit_label {
            text.push_str(&format!("({label}) "));
        }
        text.push_str(&format!(
            "Too many connections started, try again in {} seconds.",
            self.retry_after
        ));
        if let Some(message) = &self.server_message {
            text.push(' ');
            text.push_str(&format_sign_server_message(message));
        }
        text
    }
}

/// Header label centred over the boxed server message.
pub const SIGN_SERVER_MESSAGE_LABEL: &str = "SIGN SERVER MESSAGE";

/// Draws a box around a sign-server message for terminal display.
///
/// The inner width is the longer of the trimmed message and the label, so the
/// header, message, and footer lines always have the same width. When the
/// spare width around the label is odd the extra dash goes on the right.
pub fn format_sign_server_message(message: &str) -> String {
    let message = message.trim();
    let msg_len = message.chars().count();
    let label_len = SIGN_SERVER_MESSAGE_LABEL.chars().count();
    let inner = msg_len.max(label_len);

    let spare = inner - label_len;
    let left = spare / 2;
    let right = left + spare % 2;

    let header = format!(
        "+{} {} {}+",
        "-".repeat(left),
        SIGN_SERVER_MESSAGE_LABEL,
        "-".repeat(right)
    );
    let body = format!("| {message}{} |", " ".repeat(inner - msg_len));
    let footer = format!("+{}+", "-".repeat(inner + 2));

    format!("\n\t|\n\t{header}\n\t{body}\n\t{footer}")
}

// ---------------------------------------------------------------------------
// Cookies
// ---------------------------------------------------------------------------

/// One cookie extracted from a sign-server response.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CookieRecord {
    /// Cookie name.
    pub name: CookieName,
    /// Cookie value, unquoted.
    pub value: String,
    /// Domain the cookie is stored under; always [`COOKIE_DOMAIN`] for sign cookies.
    pub domain: String,
}

// ---------------------------------------------------------------------------
// Images
// ---------------------------------------------------------------------------

/// Where to fetch an image from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// A direct CDN URL.
    Url(String),
    /// Candidate URLs from an image message; the first one is used.
    UrlList(Vec<String>),
}

impl ImageSource {
    /// The URL that will be requested, if there is one.
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Url(url) => Some(url.as_str()).filter(|u| !u.is_empty()),
            Self::UrlList(urls) => urls.first().map(String::as_str).filter(|u| !u.is_empty()),
        }
    }
}

impl From<&str> for ImageSource {
    fn from(url: &str) -> Self {
        Self::Url(url.to_owned())
    }
}

impl From<String> for ImageSource {
    fn from(url: String) -> Self {
        Self::Url(url)
    }
}
