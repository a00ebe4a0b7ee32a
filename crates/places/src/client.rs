//! HTTP client for the places API.

use crate::error::{Error, Result};
use crate::types::PlaceBatch;

/// HTTP client for fetching place coordinates.
///
/// The client is runtime-agnostic: it returns futures that work with any
/// executor reqwest supports (Tokio natively, browser fetch on WASM).
///
/// # Example
///
/// ```ignore
/// let client = Client::new("http://localhost:3000/api/v1/places.json");
/// let batch = client.fetch_places().await?;
/// ```
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    url: String,
}

impl Client {
    /// Create a client for the places document at `url`.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_http(reqwest::Client::new(), url)
    }

    /// Create a client with a custom HTTP client.
    #[must_use]
    pub fn with_http(http: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }

    /// The URL this client fetches from.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch and parse the places document.
    ///
    /// Malformed entries do not fail the request; they end up in
    /// [`PlaceBatch::rejected`].
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request fails, the server answers with a
    /// non-success status, or the body is not a places document.
    pub async fn fetch_places(&self) -> Result<PlaceBatch> {
        let body = self.fetch_bytes().await?;
        let batch = PlaceBatch::from_json(&body)?;

        tracing::debug!(
            url = %self.url,
            accepted = batch.coordinates.len(),
            rejected = batch.rejected.len(),
            "parsed places response"
        );

        Ok(batch)
    }

    async fn fetch_bytes(&self) -> Result<Vec<u8>> {
        tracing::debug!(url = %self.url, "fetching");

        let response = self
            .http
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::Http {
                url: self.url.clone(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpStatus {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }

        let data = response.bytes().await.map_err(|e| Error::Http {
            url: self.url.clone(),
            message: e.to_string(),
        })?;

        Ok(data.to_vec())
    }
}
