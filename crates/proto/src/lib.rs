//! Webcast envelope wire codec.
//!
//! Implements [`webcast::EnvelopeCodec`] for the protobuf `WebcastResponse`
//! the sign server forwards on a successful handshake. Only the fields this
//! client reads are declared; unknown fields are skipped by the decoder.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Message definitions and decoding live here. The
//! [`webcast`] crate sees only [`webcast::Envelope`] and
//! [`webcast::EnvelopeCodec`].

use std::collections::HashMap;

use prost::Message;
use webcast::{DecodeError, Envelope, EnvelopeCodec, ImageSource};

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// The envelope returned by the sign server and by each webcast fetch.
#[derive(Clone, PartialEq, Message)]
pub struct WebcastResponse {
    #[prost(message, repeated, tag = "1")]
    pub messages: Vec<WebcastMessage>,
    /// Pagination cursor for the next fetch.
    #[prost(string, tag = "2")]
    pub cursor: String,
    /// Suggested polling interval in milliseconds.
    #[prost(int64, tag = "3")]
    pub fetch_interval: i64,
    /// Server time in milliseconds.
    #[prost(int64, tag = "4")]
    pub now: i64,
    /// Extension token for the next fetch.
    #[prost(string, tag = "5")]
    pub internal_ext: String,
    #[prost(int32, tag = "6")]
    pub fetch_type: i32,
    /// Parameters the websocket upgrade must carry.
    #[prost(map = "string, string", tag = "7")]
    pub route_params_map: HashMap<String, String>,
    #[prost(int64, tag = "8")]
    pub heart_beat_duration: i64,
    #[prost(bool, tag = "9")]
    pub needs_ack: bool,
    /// Websocket push server URL.
    #[prost(string, tag = "10")]
    pub push_server: String,
    #[prost(bool, tag = "11")]
    pub is_first: bool,
    #[prost(string, tag = "12")]
    pub history_comment_cursor: String,
    #[prost(bool, tag = "13")]
    pub history_no_more: bool,
}

/// One event carried in a [`WebcastResponse`]. The payload is left encoded.
#[derive(Clone, PartialEq, Message)]
pub struct WebcastMessage {
    /// Event type name, e.g. `"WebcastChatMessage"`.
    #[prost(string, tag = "1")]
    pub method: String,
    #[prost(bytes = "vec", tag = "2")]
    pub payload: Vec<u8>,
    #[prost(int64, tag = "3")]
    pub msg_id: i64,
    #[prost(int32, tag = "4")]
    pub msg_type: i32,
    #[prost(int64, tag = "5")]
    pub offset: i64,
    #[prost(bool, tag = "6")]
    pub is_history: bool,
}

/// An image reference as carried inside event payloads.
#[derive(Clone, PartialEq, Message)]
pub struct Image {
    /// Candidate CDN URLs, preferred first.
    #[prost(string, repeated, tag = "1")]
    pub url_list: Vec<String>,
    #[prost(string, tag = "2")]
    pub uri: String,
    #[prost(int64, tag = "3")]
    pub height: i64,
    #[prost(int64, tag = "4")]
    pub width: i64,
}

impl From<&Image> for ImageSource {
    fn from(image: &Image) -> Self {
        ImageSource::UrlList(image.url_list.clone())
    }
}

impl From<Image> for ImageSource {
    fn from(image: Image) -> Self {
        ImageSource::UrlList(image.url_list)
    }
}

impl Envelope for WebcastResponse {
    fn cursor(&self) -> &str {
        &self.cursor
    }

    fn extension_token(&self) -> &str {
        &self.internal_ext
    }
}

// ---------------------------------------------------------------------------
// Codec
// ---------------------------------------------------------------------------

/// Protobuf codec for [`WebcastResponse`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ProtoCodec;

impl EnvelopeCodec for ProtoCodec {
    type Envelope = WebcastResponse;

    fn decode(&self, body: &[u8]) -> Result<WebcastResponse, DecodeError> {
        let response = WebcastResponse::decode(body).map_err(DecodeError::new)?;
        tracing::trace!(
            messages = response.messages.len(),
            fetch_type = response.fetch_type,
            "decoded webcast envelope"
        );
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> WebcastResponse {
        WebcastResponse {
            messages: vec![WebcastMessage {
                method: "WebcastRoomMessage".to_owned(),
                payload: vec![1, 2, 3],
                msg_id: 17,
                ..Default::default()
            }],
            cursor: "1700000000000_123".to_owned(),
            internal_ext: "internal_src:dim|wss_push_room_id:42".to_owned(),
            push_server: "wss://webcast.example/ws".to_owned(),
            route_params_map: HashMap::from([("room_id".to_owned(), "42".to_owned())]),
            ..Default::default()
        }
    }

    #[test]
    fn decodes_envelope_fields() {
        let bytes = sample().encode_to_vec();

        let envelope = ProtoCodec.decode(&bytes).unwrap();

        assert_eq!(envelope.cursor(), "1700000000000_123");
        assert_eq!(envelope.extension_token(), "internal_src:dim|wss_push_room_id:42");
        assert_eq!(envelope.messages.len(), 1);
        assert_eq!(envelope.messages[0].method, "WebcastRoomMessage");
        assert_eq!(envelope.route_params_map.get("room_id").map(String::as_str), Some("42"));
    }

    #[test]
    fn truncated_body_is_a_decode_error() {
        let bytes = sample().encode_to_vec();
        assert!(ProtoCodec.decode(&bytes[..bytes.len() - 3]).is_err());
    }

    #[test]
    fn image_converts_to_source() {
        let image = Image {
            url_list: vec!["https://p16.example/a.webp".to_owned()],
            ..Default::default()
        };
        assert_eq!(ImageSource::from(&image).url(), Some("https://p16.example/a.webp"));
    }
}
