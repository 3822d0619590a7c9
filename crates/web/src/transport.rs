//! `reqwest` implementation of [`webcast::HttpTransport`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use webcast::{HttpTransport, RawResponse, ResponseHeaders, TransportError, TransportRequest};

/// Buffers every response fully before returning it.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Builds a client with the given request timeout and `User-Agent`.
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client })
    }

    /// Wraps an existing client, sharing its connection pool.
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, request: &TransportRequest) -> Result<RawResponse, TransportError> {
        let response = self
            .client
            .get(&request.url)
            .query(&request.query)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status().as_u16();
        let headers = collect_headers(response.headers());

        let body = response.bytes().await.map_err(TransportError::request)?;

        tracing::trace!(url = %request.url, status, bytes = body.len(), "response buffered");
        Ok(RawResponse {
            status,
            headers,
            body: body.to_vec(),
        })
    }
}

/// Values that are not visible ASCII are decoded lossily rather than dropped.
fn collect_headers(headers: &HeaderMap) -> ResponseHeaders {
    headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_owned(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect()
}

fn classify(error: reqwest::Error) -> TransportError {
    if error.is_connect() {
        TransportError::connect(error)
    } else {
        TransportError::request(error)
    }
}

#[cfg(test)]
mod tests {
    use reqwest::header::{HeaderName, HeaderValue};

    use super::*;

    #[test]
    fn non_ascii_header_values_are_kept() {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("x-set-tt-cookie"),
            HeaderValue::from_bytes(b"ttwid=caf\xc3\xa9; tt=\xff").unwrap(),
        );
        headers.insert(HeaderName::from_static("ratelimit-reset"), HeaderValue::from_static("30"));

        let collected = collect_headers(&headers);

        assert_eq!(collected.get("X-Set-TT-Cookie"), Some("ttwid=caf\u{e9}; tt=\u{fffd}"));
        assert_eq!(collected.get("RateLimit-Reset"), Some("30"));
    }
}
