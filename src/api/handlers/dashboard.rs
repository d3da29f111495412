use axum::{Json, extract::Extension, http::HeaderMap};
use std::sync::Arc;
use tracing::instrument;

use super::{access_token, reject};
use crate::{
    api::{
        AppState,
        errors::{ApiError, ErrorBody},
    },
    backend::types::UserDetails,
};

#[utoipa::path(
    get,
    path= "/dashboard",
    responses (
        (status = 200, description = "Signed-in user", body = UserDetails),
        (status = 401, description = "Session expired, cookies cleared", body = ErrorBody)
    ),
    tag= "dashboard"
)]
#[instrument(skip_all)]
pub async fn user_details(
    state: Extension<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<UserDetails>, ApiError> {
    let token = access_token(&state, &headers)?;
    let user = state
        .backend()
        .get_user_details(&token)
        .await
        .map_err(|err| reject(&state, err))?;
    Ok(Json(user))
}
