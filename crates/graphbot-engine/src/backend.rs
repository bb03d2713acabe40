//! Backend access: the response-generation service and graph images.
//!
//! [`ChatBackend`] is the seam between the conversation state machine and
//! the network. [`HttpBackend`] is the real implementation; tests substitute
//! their own.

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use url::Url;

use crate::config::{Config, ConfigError};
use crate::protocol::{image_path, image_url, GenerateRequest, GenerateResponse, GENERATE_PATH};

/// A fetched graph image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    /// Content type reported by the server (always `image/*`).
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImagePayload {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Source of conversation responses and graph images.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Send one query and return the parsed response body.
    ///
    /// Non-2xx statuses, connection failures and undecodable bodies are errors.
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, BackendError>;

    /// Fetch the image for a graph part.
    async fn fetch_image(&self, image_id: &str) -> Result<ImagePayload, BackendError>;
}

/// HTTP implementation of [`ChatBackend`].
#[derive(Debug, Clone)]
pub struct HttpBackend {
    config: Config,
    generate_url: Url,
    http: reqwest::Client,
}

impl HttpBackend {
    /// Create a backend for the configured service.
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        Self::with_client(config, reqwest::Client::new())
    }

    /// Create a backend with a custom reqwest client.
    pub fn with_client(config: &Config, http: reqwest::Client) -> Result<Self, ConfigError> {
        config.validate()?;
        let generate_url = config.endpoint_url(GENERATE_PATH)?;
        Ok(Self {
            config: config.clone(),
            generate_url,
            http,
        })
    }

    /// URL of the response-generation endpoint.
    pub fn generate_url(&self) -> &Url {
        &self.generate_url
    }

    /// Retrieval URL for a graph image.
    pub fn image_url(&self, image_id: &str) -> String {
        image_url(&self.config.api_base_url, image_id)
    }
}

#[async_trait]
impl ChatBackend for HttpBackend {
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, BackendError> {
        let response = self
            .http
            .post(self.generate_url.clone())
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .json(request)
            .send()
            .await
            .map_err(BackendError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Status(status.as_u16()));
        }

        let body = response.bytes().await.map_err(BackendError::Transport)?;
        serde_json::from_slice(&body).map_err(BackendError::Decode)
    }

    async fn fetch_image(&self, image_id: &str) -> Result<ImagePayload, BackendError> {
        let url = self
            .config
            .endpoint_url(&image_path(image_id))
            .map_err(|e| BackendError::InvalidUrl(e.to_string()))?;

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(BackendError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Status(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        if !content_type.starts_with("image/") {
            return Err(BackendError::NotAnImage(content_type));
        }

        let bytes = response.bytes().await.map_err(BackendError::Transport)?;
        Ok(ImagePayload {
            content_type,
            bytes: bytes.to_vec(),
        })
    }
}

/// Errors from backend calls.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// Connection or I/O failure.
    #[error("Request failed: {0}")]
    Transport(#[source] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("Server returned HTTP {0}")]
    Status(u16),

    /// The body was not the expected JSON shape.
    #[error("Unexpected response body: {0}")]
    Decode(#[source] serde_json::Error),

    /// An image URL answered with something other than an image.
    #[error("Not an image (content type '{0}')")]
    NotAnImage(String),

    /// The task running the request ended without a result.
    #[error("Request interrupted: {0}")]
    Interrupted(String),

    /// A URL could not be built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_invalid_base_url() {
        let config = Config::default().with_api_base_url(Some("not a url".into()));
        assert!(HttpBackend::new(&config).is_err());
    }

    #[test]
    fn test_generate_url() {
        let backend = HttpBackend::new(&Config::default()).unwrap();
        assert_eq!(
            backend.generate_url().as_str(),
            "http://localhost:5001/generate_response"
        );
    }

    #[test]
    fn test_image_url_template() {
        let config = Config::default().with_api_base_url(Some("http://graphs.test/".into()));
        let backend = HttpBackend::new(&config).unwrap();
        assert_eq!(
            backend.image_url("abc123"),
            "http://graphs.test/generated_graphs/abc123.png"
        );
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(BackendError::Status(500).to_string(), "Server returned HTTP 500");
        assert_eq!(
            BackendError::NotAnImage("text/html".into()).to_string(),
            "Not an image (content type 'text/html')"
        );
    }
}
