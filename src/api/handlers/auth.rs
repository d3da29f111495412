//! Sign-in, sign-up, logout and email verification.
//!
//! Form submissions answer JSON with a `redirectTo` hint and the session
//! cookies; the OAuth-style callback answers a real redirect.

use axum::{
    Json,
    extract::{Extension, Path, Query},
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use utoipa::{IntoParams, ToSchema};

use super::{MessageResponse, with_cookies};
use crate::{
    api::{
        AppState,
        errors::{ApiError, ErrorBody},
        navigation::{Navigation, NavigationIntent},
        validation,
    },
    backend::types::{AuthSession, LoginRequest, RegisterRequest, UserDetails},
    session::CookieJar,
};

#[derive(ToSchema, Serialize, Debug)]
pub struct SignInResponse {
    #[serde(flatten)]
    pub navigation: NavigationIntent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserDetails>,
}

#[derive(ToSchema, Deserialize, Debug)]
pub struct ResendVerificationRequest {
    pub email: String,
}

#[derive(IntoParams, Deserialize)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct CallbackParams {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

/// Store the session cookies and build the dashboard hint.
fn establish(state: &AppState, session: AuthSession) -> Result<Response, ApiError> {
    let mut jar = CookieJar::new();
    state.store().set_tokens(
        &mut jar,
        &session.tokens.access_token,
        &session.tokens.refresh_token,
        None,
    )?;

    if let Some(user) = &session.user {
        state.store().set_user_id(&mut jar, &user.id)?;
    }

    let body = SignInResponse {
        navigation: Navigation::to_dashboard().intent(),
        user: session.user,
    };
    Ok(with_cookies(&jar, Json(body)))
}

#[utoipa::path(
    post,
    path= "/auth/sign-in",
    request_body = LoginRequest,
    responses (
        (status = 200, description = "Signed in, session cookies set", body = SignInResponse),
        (status = 400, description = "Validation failed or credentials refused", body = ErrorBody),
        (status = 502, description = "Registry backend unreachable", body = ErrorBody)
    ),
    tag= "auth"
)]
#[instrument(skip_all)]
pub async fn sign_in(
    state: Extension<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    validation::sign_in(&request)?;

    let request = LoginRequest {
        email: request.email.trim().to_string(),
        password: request.password,
    };
    let session = state.backend().login(&request).await.map_err(ApiError::Backend)?;

    info!("User signed in");

    establish(&state, session)
}

#[utoipa::path(
    post,
    path= "/auth/sign-up",
    request_body = RegisterRequest,
    responses (
        (status = 200, description = "Registered, session cookies set", body = SignInResponse),
        (status = 400, description = "Validation failed or registration refused", body = ErrorBody),
        (status = 502, description = "Registry backend unreachable", body = ErrorBody)
    ),
    tag= "auth"
)]
#[instrument(skip_all)]
pub async fn sign_up(
    state: Extension<Arc<AppState>>,
    Json(mut request): Json<RegisterRequest>,
) -> Result<Response, ApiError> {
    validation::sign_up(&request)?;

    request.email = request.email.trim().to_string();
    let session = state
        .backend()
        .register(&request)
        .await
        .map_err(ApiError::Backend)?;

    info!("User registered");

    establish(&state, session)
}

#[utoipa::path(
    get,
    path= "/auth/callback",
    params(CallbackParams),
    responses (
        (status = 307, description = "Tokens stored, redirect to /dashboard; missing tokens redirect to /auth/sign-in")
    ),
    tag= "auth"
)]
pub async fn callback(
    state: Extension<Arc<AppState>>,
    Query(params): Query<CallbackParams>,
) -> Response {
    let (Some(access_token), Some(refresh_token)) = (params.access_token, params.refresh_token)
    else {
        debug!("callback without tokens");
        return Navigation::to_sign_in().into_response();
    };

    let mut jar = CookieJar::new();
    match state
        .store()
        .set_tokens(&mut jar, &access_token, &refresh_token, None)
    {
        Ok(()) => with_cookies(&jar, Navigation::to_dashboard()),
        Err(err) => {
            debug!("callback tokens rejected: {err}");
            Navigation::to_sign_in().into_response()
        }
    }
}

#[utoipa::path(
    post,
    path= "/auth/logout",
    responses (
        (status = 200, description = "Session cookies cleared", body = NavigationIntent),
        (status = 500, description = "Session cookies could not be cleared", body = ErrorBody)
    ),
    tag= "auth"
)]
#[instrument(skip_all)]
pub async fn logout(
    state: Extension<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let mut jar = CookieJar::from_headers(&headers);
    let tokens = state.store().get_tokens(&jar);

    if (tokens.access_token.is_some() || tokens.refresh_token.is_some())
        && let Err(err) = state
            .backend()
            .logout(tokens.access_token.as_ref(), tokens.refresh_token.as_ref())
            .await
    {
        warn!("Backend logout failed, clearing session anyway: {err}");
    }

    state.store().clear_tokens(&mut jar)?;
    state.store().clear_user_id(&mut jar)?;

    info!("User signed out");

    Ok(with_cookies(&jar, Json(Navigation::to_sign_in().intent())))
}

#[utoipa::path(
    post,
    path= "/auth/resend-verification",
    request_body = ResendVerificationRequest,
    responses (
        (status = 200, description = "Verification email queued", body = MessageResponse),
        (status = 400, description = "Invalid email or request refused", body = ErrorBody)
    ),
    tag= "auth"
)]
#[instrument(skip_all)]
pub async fn resend_verification(
    state: Extension<Arc<AppState>>,
    Json(request): Json<ResendVerificationRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    validation::resend_verification(&request.email)?;

    let message = state
        .backend()
        .resend_verification(request.email.trim())
        .await
        .map_err(ApiError::Backend)?;

    Ok(Json(MessageResponse::new(message)))
}

#[utoipa::path(
    get,
    path= "/auth/verify-email/{token}",
    params(("token" = String, Path, description = "Verification token from the email link")),
    responses (
        (status = 200, description = "Email verified", body = MessageResponse),
        (status = 400, description = "Token refused", body = ErrorBody)
    ),
    tag= "auth"
)]
#[instrument(skip_all)]
pub async fn verify_email(
    state: Extension<Arc<AppState>>,
    Path(token): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let message = state
        .backend()
        .verify_email(&token)
        .await
        .map_err(ApiError::Backend)?;

    Ok(Json(MessageResponse::new(message)))
}
