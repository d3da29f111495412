//! Dashboard CRUD relayed to the backend, one route pair for every resource.

use axum::{
    Json,
    extract::{Extension, Path},
    http::{HeaderMap, StatusCode},
};
use serde_json::Value;
use std::sync::Arc;
use tracing::instrument;

use super::{access_token, reject};
use crate::{
    api::{
        AppState,
        errors::{ApiError, ErrorBody},
    },
    backend::Resource,
};

fn resource(slug: &str) -> Result<Resource, ApiError> {
    slug.parse()
        .map_err(|_| ApiError::NotFound(format!("Resource '{slug}'")))
}

#[utoipa::path(
    get,
    path= "/dashboard/{resource}",
    params(("resource" = Resource, Path, description = "Resource collection")),
    responses (
        (status = 200, description = "Records from the registry", body = Value),
        (status = 401, description = "Session expired, cookies cleared", body = ErrorBody),
        (status = 404, description = "Unknown resource", body = ErrorBody)
    ),
    tag= "dashboard"
)]
#[instrument(skip_all, fields(resource = %slug))]
pub async fn list(
    state: Extension<Arc<AppState>>,
    headers: HeaderMap,
    Path(slug): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let resource = resource(&slug)?;
    let token = access_token(&state, &headers)?;
    let records = state
        .backend()
        .list(resource, &token)
        .await
        .map_err(|err| reject(&state, err))?;
    Ok(Json(records))
}

#[utoipa::path(
    post,
    path= "/dashboard/{resource}",
    params(("resource" = Resource, Path, description = "Resource collection")),
    request_body = Value,
    responses (
        (status = 201, description = "Record created", body = Value),
        (status = 401, description = "Session expired, cookies cleared", body = ErrorBody),
        (status = 404, description = "Unknown resource", body = ErrorBody)
    ),
    tag= "dashboard"
)]
#[instrument(skip_all, fields(resource = %slug))]
pub async fn create(
    state: Extension<Arc<AppState>>,
    headers: HeaderMap,
    Path(slug): Path<String>,
    Json(record): Json<Value>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let resource = resource(&slug)?;
    let token = access_token(&state, &headers)?;
    let created = state
        .backend()
        .create(resource, &record, &token)
        .await
        .map_err(|err| reject(&state, err))?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get,
    path= "/dashboard/{resource}/{id}",
    params(
        ("resource" = Resource, Path, description = "Resource collection"),
        ("id" = String, Path, description = "Record id")
    ),
    responses (
        (status = 200, description = "Record", body = Value),
        (status = 401, description = "Session expired, cookies cleared", body = ErrorBody),
        (status = 404, description = "Unknown resource or record", body = ErrorBody)
    ),
    tag= "dashboard"
)]
#[instrument(skip_all, fields(resource = %slug, id = %id))]
pub async fn get(
    state: Extension<Arc<AppState>>,
    headers: HeaderMap,
    Path((slug, id)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    let resource = resource(&slug)?;
    let token = access_token(&state, &headers)?;
    let record = state
        .backend()
        .get(resource, &id, &token)
        .await
        .map_err(|err| reject(&state, err))?;
    Ok(Json(record))
}

#[utoipa::path(
    put,
    path= "/dashboard/{resource}/{id}",
    params(
        ("resource" = Resource, Path, description = "Resource collection"),
        ("id" = String, Path, description = "Record id")
    ),
    request_body = Value,
    responses (
        (status = 200, description = "Record updated", body = Value),
        (status = 401, description = "Session expired, cookies cleared", body = ErrorBody),
        (status = 404, description = "Unknown resource or record", body = ErrorBody)
    ),
    tag= "dashboard"
)]
#[instrument(skip_all, fields(resource = %slug, id = %id))]
pub async fn update(
    state: Extension<Arc<AppState>>,
    headers: HeaderMap,
    Path((slug, id)): Path<(String, String)>,
    Json(record): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let resource = resource(&slug)?;
    let token = access_token(&state, &headers)?;
    let updated = state
        .backend()
        .update(resource, &id, &record, &token)
        .await
        .map_err(|err| reject(&state, err))?;
    Ok(Json(updated))
}

#[utoipa::path(
    delete,
    path= "/dashboard/{resource}/{id}",
    params(
        ("resource" = Resource, Path, description = "Resource collection"),
        ("id" = String, Path, description = "Record id")
    ),
    responses (
        (status = 200, description = "Record deleted", body = Value),
        (status = 401, description = "Session expired, cookies cleared", body = ErrorBody),
        (status = 404, description = "Unknown resource or record", body = ErrorBody)
    ),
    tag= "dashboard"
)]
#[instrument(skip_all, fields(resource = %slug, id = %id))]
pub async fn delete(
    state: Extension<Arc<AppState>>,
    headers: HeaderMap,
    Path((slug, id)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    let resource = resource(&slug)?;
    let token = access_token(&state, &headers)?;
    let deleted = state
        .backend()
        .delete(resource, &id, &token)
        .await
        .map_err(|err| reject(&state, err))?;
    Ok(Json(deleted))
}
