//! Fetches an image from the platform CDN.

use tracing::{debug, instrument};

use crate::{HttpTransport, ImageFetchError, ImageSource, TransportRequest};

/// Downloads image bytes from a URL or an image message.
pub struct ImageFetchRoute<T> {
    transport: T,
}

impl<T: HttpTransport> ImageFetchRoute<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Returns the response body of a GET to the image URL.
    ///
    /// The body is returned whatever the status code.
    #[instrument(name = "image_fetch", skip_all)]
    pub async fn fetch(&self, image: impl Into<ImageSource>) -> Result<Vec<u8>, ImageFetchError> {
        let image = image.into();
        let url = image.url().ok_or(ImageFetchError::NoUrl)?;

        let response = self.transport.get(&TransportRequest::get(url)).await?;
        debug!(
            url,
            status = response.status,
            bytes = response.body.len(),
            "fetched image"
        );
        Ok(response.body)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::{RawResponse, ResponseHeaders, TransportError};

    struct RecordingTransport {
        urls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl HttpTransport for RecordingTransport {
        async fn get(&self, request: &TransportRequest) -> Result<RawResponse, TransportError> {
            self.urls.lock().unwrap().push(request.url.clone());
            if request.url.contains("down") {
                return Err(TransportError::connect("no route to host"));
            }
            Ok(RawResponse {
                status: 200,
                headers: ResponseHeaders::new(),
                body: b"\x89PNG".to_vec(),
            })
        }
    }

    fn route() -> ImageFetchRoute<RecordingTransport> {
        ImageFetchRoute::new(RecordingTransport {
            urls: Mutex::new(Vec::new()),
        })
    }

    #[tokio::test]
    async fn fetches_direct_url() {
        let route = route();
        let bytes = route.fetch("https://cdn.example/avatar.png").await.unwrap();
        assert_eq!(bytes, b"\x89PNG");
    }

    #[tokio::test]
    async fn uses_first_url_of_list() {
        let route = route();
        let source = ImageSource::UrlList(vec![
            "https://cdn-a.example/1.webp".to_owned(),
            "https://cdn-b.example/1.webp".to_owned(),
        ]);
        route.fetch(source).await.unwrap();
        assert_eq!(
            route.transport.urls.lock().unwrap().as_slice(),
            ["https://cdn-a.example/1.webp".to_owned()]
        );
    }

    #[tokio::test]
    async fn missing_url_is_an_error() {
        let error = route().fetch(ImageSource::UrlList(Vec::new())).await.unwrap_err();
        assert!(matches!(error, ImageFetchError::NoUrl));
    }

    #[tokio::test]
    async fn transport_errors_propagate() {
        let error = route().fetch("https://down.example/x.png").await.unwrap_err();
        assert!(matches!(
            error,
            ImageFetchError::Transport(TransportError::Connect { .. })
        ));
    }
}
