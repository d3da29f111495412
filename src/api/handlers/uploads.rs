use axum::{Json, extract::Extension, http::StatusCode};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;

use crate::{
    api::{
        AppState,
        errors::{ApiError, ErrorBody},
        validation,
    },
    media::UploadedImage,
};

#[derive(ToSchema, Deserialize)]
pub struct UploadRequest {
    /// Data URI or remote URL of the image.
    pub file: String,
}

#[utoipa::path(
    post,
    path= "/dashboard/uploads",
    request_body = UploadRequest,
    responses (
        (status = 201, description = "Image stored on the image host", body = UploadedImage),
        (status = 400, description = "No file given", body = ErrorBody),
        (status = 502, description = "Image host refused the upload", body = ErrorBody),
        (status = 503, description = "Image uploads are not configured", body = ErrorBody)
    ),
    tag= "dashboard"
)]
#[instrument(skip_all)]
pub async fn upload(
    state: Extension<Arc<AppState>>,
    Json(request): Json<UploadRequest>,
) -> Result<(StatusCode, Json<UploadedImage>), ApiError> {
    validation::upload(&request.file)?;

    let uploader = state.uploader().ok_or(ApiError::UploadsDisabled)?;
    let image = uploader.upload(request.file.trim()).await?;

    info!(public_id = %image.public_id, "Image uploaded");

    Ok((StatusCode::CREATED, Json(image)))
}

/// `/dashboard/uploads` only takes `POST`; other methods answer like an unknown
/// resource collection.
pub(crate) async fn not_a_resource() -> ApiError {
    ApiError::NotFound("Resource 'uploads'".to_string())
}
