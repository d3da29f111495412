use crate::GIT_COMMIT_HASH;
use axum::{Json, response::IntoResponse};
use serde::Serialize;

#[derive(Serialize, Debug)]
pub struct App {
    name: &'static str,
    version: &'static str,
    commit: &'static str,
}

// axum handler for the landing page
pub async fn root() -> impl IntoResponse {
    Json(App {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        commit: GIT_COMMIT_HASH,
    })
}
