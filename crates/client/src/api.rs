//! HTTP client for the TripMate REST API.
//!
//! [`TripMateApi`] owns a [`reqwest::Client`], the API base URL, and the
//! current auth token. Endpoint wrappers live in [`crate::trips`] and
//! [`crate::accounts`]; this module holds the shared request plumbing.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::RwLock;

use crate::error::ApiError;

/// Default base URL of a locally running backend.
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api/";

/// HTTP client for a single TripMate backend.
pub struct TripMateApi {
    client: reqwest::Client,
    base_url: String,
    token: RwLock<Option<String>>,
}

impl TripMateApi {
    /// Create a client for `base_url` with the given request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ApiError::Network)?;
        Ok(Self::with_client(client, base_url))
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        let mut base_url = base_url.trim().to_string();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Self {
            client,
            base_url,
            token: RwLock::new(None),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Install (or clear) the token sent as `Authorization: Token ...`.
    pub async fn set_token(&self, token: Option<String>) {
        *self.token.write().await = token;
    }

    pub async fn token(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    // ---- request plumbing shared by the endpoint modules ----

    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let request = self.request(reqwest::Method::GET, path).await.query(query);
        Self::parse_response(Self::send(request).await?).await
    }

    pub(crate) async fn send_json<B, T>(
        &self,
        method: reqwest::Method,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.request(method, path).await.json(body);
        Self::parse_response(Self::send(request).await?).await
    }

    /// POST/PUT/PATCH where the response body is not needed.
    pub(crate) async fn send_unit<B>(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<(), ApiError>
    where
        B: Serialize + ?Sized,
    {
        let mut request = self.request(method, path).await;
        if let Some(body) = body {
            request = request.json(body);
        }
        Self::check_status(Self::send(request).await?).await
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let request = self.request(reqwest::Method::DELETE, path).await;
        Self::check_status(Self::send(request).await?).await
    }

    pub(crate) async fn send_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<T, ApiError> {
        let request = self
            .request(reqwest::Method::POST, path)
            .await
            .multipart(form);
        Self::parse_response(Self::send(request).await?).await
    }

    // ---- private helpers ----

    async fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path.trim_start_matches('/'));
        tracing::debug!(%method, %url, "TripMate API request");
        let builder = self.client.request(method, url);
        match self.token.read().await.as_deref() {
            Some(token) => builder.header(reqwest::header::AUTHORIZATION, format!("Token {token}")),
            None => builder,
        }
    }

    async fn send(request: reqwest::RequestBuilder) -> Result<reqwest::Response, ApiError> {
        request.send().await.map_err(ApiError::Network)
    }

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or an [`ApiError::Status`]
    /// containing the status and body text on failure.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            tracing::debug!(status = status.as_u16(), body = %body, "TripMate API rejected request");
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let response = Self::ensure_success(response).await?;
        let bytes = response.bytes().await.map_err(ApiError::Network)?;
        serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Assert the response has a success status code, discarding the body.
    async fn check_status(response: reqwest::Response) -> Result<(), ApiError> {
        Self::ensure_success(response).await?;
        Ok(())
    }
}
