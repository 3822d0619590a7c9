//! CDN image download through the client facade.

use web::{WebClient, WebClientConfig};
use webcast::ImageFetchError;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";

fn client() -> WebClient {
    WebClient::new(WebClientConfig::default(), None).unwrap()
}

#[tokio::test]
async fn downloads_image_bytes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/img/avatar.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(PNG_MAGIC))
        .expect(1)
        .mount(&server)
        .await;

    let bytes = client()
        .fetch_image(format!("{}/img/avatar.png", server.uri()))
        .await
        .unwrap();

    assert_eq!(bytes, PNG_MAGIC);
}

#[tokio::test]
async fn image_message_uses_first_url() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/primary.webp"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"RIFF".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let image = proto::Image {
        url_list: vec![
            format!("{}/primary.webp", server.uri()),
            format!("{}/fallback.webp", server.uri()),
        ],
        ..Default::default()
    };

    let bytes = client().fetch_image(&image).await.unwrap();

    assert_eq!(bytes, b"RIFF");
}

#[tokio::test]
async fn image_without_urls_is_rejected() {
    let error = client()
        .fetch_image(&proto::Image::default())
        .await
        .unwrap_err();

    assert!(matches!(error, ImageFetchError::NoUrl));
}
