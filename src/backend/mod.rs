//! Client for the vehicle-registry REST API.
//!
//! One `BackendClient` is built at startup and shared by the route guard and
//! the handlers. Each method issues exactly one HTTP call; nothing is retried
//! and the only timeout is the one configured on the underlying client.
//! Tokens are attached as bearer headers and never logged.

pub mod auth;
pub mod envelope;
pub mod errors;
pub mod resources;
pub mod types;

pub use envelope::{Call, Envelope};
pub use errors::BackendError;
pub use resources::Resource;

use crate::APP_USER_AGENT;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{Instrument, debug, info_span};
use url::Url;

/// Default request timeout applied to every backend call.
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;

#[derive(Clone, Debug)]
pub struct BackendClient {
    http: Client,
    base_url: Url,
}

impl BackendClient {
    /// # Errors
    /// Returns an error if the base URL is not an absolute http(s) URL or the
    /// HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, BackendError> {
        let base_url = Url::parse(base_url.trim())?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(BackendError::Client(format!(
                "unsupported scheme {}",
                base_url.scheme()
            )));
        }

        let http = Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|err| BackendError::Client(err.to_string()))?;

        Ok(Self { http, base_url })
    }

    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub(crate) const fn http(&self) -> &Client {
        &self.http
    }

    /// Build `<base>/<segments...>`, percent-encoding each segment and
    /// keeping any path prefix the base URL already has.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url, BackendError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|()| BackendError::Client("backend URL cannot be a base".to_string()))?;
            path.pop_if_empty();
            for segment in segments {
                path.push(segment);
            }
        }
        Ok(url)
    }

    /// Send a request and unwrap the response envelope.
    pub(crate) async fn execute<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        call: Call<'_>,
    ) -> Result<Envelope<T>, BackendError> {
        let request = request
            .build()
            .map_err(|err| BackendError::Client(err.to_string()))?;
        let span = info_span!(
            "backend.request",
            http.method = %request.method(),
            http.path = request.url().path(),
        );

        async move {
            let response = self
                .http
                .execute(request)
                .await
                .map_err(|err| BackendError::from_transport(&err))?;
            let status = response.status();
            let body = response
                .bytes()
                .await
                .map_err(|err| BackendError::from_transport(&err))?;

            debug!(status = status.as_u16(), "backend responded");

            envelope::interpret(status, &body, call)
        }
        .instrument(span)
        .await
    }

    /// Lightweight reachability probe used by the health endpoint: any HTTP
    /// answer counts as reachable.
    pub async fn ping(&self) -> bool {
        match self.http.get(self.base_url.clone()).send().await {
            Ok(_) => true,
            Err(err) => {
                debug!("Backend unreachable: {err}");
                false
            }
        }
    }
}
