//! Error responses for the gateway handlers.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::{error, warn};
use utoipa::ToSchema;

use super::{navigation::Navigation, validation::FieldErrors};
use crate::{
    backend::BackendError,
    media::MediaError,
    session::{CookieJar, SessionError},
};

#[derive(ToSchema, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_to: Option<String>,
}

impl ErrorBody {
    fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            errors: None,
            redirect_to: None,
        }
    }
}

#[derive(Debug)]
pub enum ApiError {
    Validation(FieldErrors),
    Backend(BackendError),
    Session(SessionError),
    Upload(MediaError),
    UploadsDisabled,
    NotFound(String),
    /// The session is gone; the jar carries the cookie-clearing writes.
    SessionExpired(CookieJar),
}

impl From<FieldErrors> for ApiError {
    fn from(errors: FieldErrors) -> Self {
        Self::Validation(errors)
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        Self::Session(err)
    }
}

impl From<MediaError> for ApiError {
    fn from(err: MediaError) -> Self {
        Self::Upload(err)
    }
}

fn backend_status(err: &BackendError) -> StatusCode {
    match err {
        BackendError::Api { status, .. } => {
            if status.is_client_error() || status.is_server_error() {
                *status
            } else {
                StatusCode::BAD_REQUEST
            }
        }
        BackendError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        BackendError::Network(_) | BackendError::Decode(_) => StatusCode::BAD_GATEWAY,
        BackendError::Timeout => StatusCode::GATEWAY_TIMEOUT,
        BackendError::Url(_) | BackendError::Client(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Validation(errors) => {
                let body = ErrorBody {
                    message: "Validation failed".to_string(),
                    errors: Some(errors),
                    redirect_to: None,
                };
                (StatusCode::BAD_REQUEST, Json(body)).into_response()
            }
            Self::Backend(err) => {
                let status = backend_status(&err);
                if status.is_server_error() {
                    error!("Backend call failed: {err}");
                } else {
                    warn!("Backend refused call: {err}");
                }
                (status, Json(ErrorBody::message(err.to_string()))).into_response()
            }
            Self::Session(err) => {
                error!("Session cookie error: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorBody::message(err.to_string())),
                )
                    .into_response()
            }
            Self::Upload(err) => {
                error!("Image upload failed: {err}");
                (StatusCode::BAD_GATEWAY, Json(ErrorBody::message(err.to_string())))
                    .into_response()
            }
            Self::UploadsDisabled => (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorBody::message("Image uploads are not configured")),
            )
                .into_response(),
            Self::NotFound(what) => (
                StatusCode::NOT_FOUND,
                Json(ErrorBody::message(format!("{what} not found"))),
            )
                .into_response(),
            Self::SessionExpired(jar) => {
                let body = ErrorBody {
                    message: "Session expired".to_string(),
                    errors: None,
                    redirect_to: Some(Navigation::to_sign_in().path().to_string()),
                };
                let mut response = (StatusCode::UNAUTHORIZED, Json(body)).into_response();
                jar.apply(response.headers_mut());
                response
            }
        }
    }
}
