//! Plain HTTP image downloads

use crate::error::Result;
use crate::http::{Body, HttpClient};
use crate::service::ImageFetcher;

/// Fetches images anonymously by URL
#[derive(Clone, Default)]
pub struct HttpImageFetcher {
    http: HttpClient,
}

impl HttpImageFetcher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ImageFetcher for HttpImageFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.http.send(self.http.request("GET", url), Body::Empty)?;
        let bytes = HttpClient::bytes(response)?;
        tracing::debug!(url, size = bytes.len(), "Fetched image");
        Ok(bytes)
    }
}
