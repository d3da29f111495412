//! Unsigned image uploads to the image host.

use crate::APP_USER_AGENT;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;
use utoipa::ToSchema;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("Invalid image host URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("Upload failed: {0}")]
    Network(String),
    #[error("Upload rejected: {0}")]
    Rejected(String),
    #[error("Upload response could not be read: {0}")]
    Decode(String),
    #[error("Failed to initialize HTTP client: {0}")]
    Client(String),
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    pub secure_url: String,
    pub public_id: String,
}

#[derive(Deserialize)]
struct HostError {
    error: Option<HostErrorMessage>,
}

#[derive(Deserialize)]
struct HostErrorMessage {
    message: String,
}

#[derive(Clone, Debug)]
pub struct ImageUploader {
    http: Client,
    upload_url: Url,
    upload_preset: String,
}

impl ImageUploader {
    /// # Errors
    /// Returns an error if the URL is invalid or the HTTP client cannot be built.
    pub fn new(
        upload_url: &str,
        upload_preset: String,
        timeout: Duration,
    ) -> Result<Self, MediaError> {
        let upload_url = Url::parse(upload_url.trim())?;
        let http = Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|err| MediaError::Client(err.to_string()))?;
        Ok(Self {
            http,
            upload_url,
            upload_preset,
        })
    }

    /// Upload one image given as a data URI or a remote URL.
    ///
    /// # Errors
    /// `Network` for transport failures, `Rejected` with the host's message,
    /// `Decode` for an unreadable success body.
    #[instrument(skip_all)]
    pub async fn upload(&self, file: &str) -> Result<UploadedImage, MediaError> {
        let form = [("file", file), ("upload_preset", self.upload_preset.as_str())];
        let response = self
            .http
            .post(self.upload_url.clone())
            .form(&form)
            .send()
            .await
            .map_err(|err| MediaError::Network(err.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| MediaError::Network(err.to_string()))?;

        debug!(status = status.as_u16(), "image host responded");

        if status.is_success() {
            serde_json::from_slice(&body).map_err(|err| MediaError::Decode(err.to_string()))
        } else {
            let message = serde_json::from_slice::<HostError>(&body)
                .ok()
                .and_then(|host| host.error)
                .map_or_else(|| format!("status {status}"), |error| error.message);
            Err(MediaError::Rejected(message))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{body_string_contains, method, path},
    };

    fn can_bind_localhost() -> bool {
        std::net::TcpListener::bind("127.0.0.1:0").is_ok()
    }

    fn uploader(server: &MockServer) -> Result<ImageUploader, MediaError> {
        ImageUploader::new(
            &format!("{}/v1_1/demo/image/upload", server.uri()),
            "unsigned".to_string(),
            Duration::from_secs(5),
        )
    }

    #[tokio::test]
    async fn upload_returns_secure_url() -> anyhow::Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1_1/demo/image/upload"))
            .and(body_string_contains("upload_preset=unsigned"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "secure_url": "https://img.example/x.png",
                "public_id": "x",
                "width": 10
            })))
            .mount(&server)
            .await;

        let image = uploader(&server)?.upload("data:image/png;base64,AAAA").await?;
        assert_eq!(image.secure_url, "https://img.example/x.png");
        assert_eq!(image.public_id, "x");
        Ok(())
    }

    #[tokio::test]
    async fn upload_surfaces_host_message() -> anyhow::Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": { "message": "Upload preset not found" }
            })))
            .mount(&server)
            .await;

        let result = uploader(&server)?.upload("https://example.com/a.png").await;
        assert!(matches!(result, Err(MediaError::Rejected(ref message)) if message == "Upload preset not found"));
        Ok(())
    }
}
