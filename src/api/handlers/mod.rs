//! Gateway route handlers and the helpers they share.

pub mod auth;
pub mod dashboard;
pub mod health;
pub mod resources;
pub mod root;
pub mod uploads;

use axum::{
    Json,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use utoipa::ToSchema;

use super::{AppState, errors::ApiError};
use crate::{backend::BackendError, session::CookieJar};

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Access token from the request cookies.
///
/// The route guard refreshes a missing token before dashboard handlers run, so
/// a missing token here means the session is gone.
pub(crate) fn access_token(state: &AppState, headers: &HeaderMap) -> Result<SecretString, ApiError> {
    let jar = CookieJar::from_headers(headers);
    match state.store().get_tokens(&jar).access_token {
        Some(token) => Ok(token),
        None => {
            debug!("no access token on protected route");
            Err(expire_session(state))
        }
    }
}

/// Turn a backend error into a response error, ending the session on 401.
pub(crate) fn reject(state: &AppState, err: BackendError) -> ApiError {
    if err.is_unauthorized() {
        warn!("Backend rejected the access token: {err}");
        expire_session(state)
    } else {
        ApiError::Backend(err)
    }
}

fn expire_session(state: &AppState) -> ApiError {
    let mut jar = CookieJar::new();
    let cleared = state
        .store()
        .clear_tokens(&mut jar)
        .and_then(|()| state.store().clear_user_id(&mut jar));
    match cleared {
        Ok(()) => ApiError::SessionExpired(jar),
        Err(err) => ApiError::Session(err),
    }
}

/// Attach the jar's cookie writes to a response.
pub(crate) fn with_cookies(jar: &CookieJar, response: impl IntoResponse) -> Response {
    let mut response = response.into_response();
    jar.apply(response.headers_mut());
    response
}

pub(crate) async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(MessageResponse::new("Not found")))
}
