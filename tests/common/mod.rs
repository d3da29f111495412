#![allow(dead_code)]

use anyhow::Result;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{HeaderMap, Request, header::SET_COOKIE},
    response::Response,
};
use std::{net::TcpListener, sync::Arc, time::Duration};
use vehireg::{
    api::{self, AppState},
    backend::BackendClient,
    media::ImageUploader,
    session::{Environment, SessionPolicy, TokenStore},
};

pub fn can_bind_localhost() -> bool {
    TcpListener::bind("127.0.0.1:0").is_ok()
}

pub fn state(backend_url: &str) -> Result<AppState> {
    let policy = SessionPolicy::new(Environment::Development);
    let store = TokenStore::new(Arc::new(policy));
    let backend = BackendClient::new(backend_url, Duration::from_secs(2))?;
    Ok(AppState::new(backend, store))
}

pub fn app(backend_url: &str) -> Result<Router> {
    Ok(api::app(Arc::new(state(backend_url)?)))
}

pub fn app_with_uploads(backend_url: &str, upload_url: &str) -> Result<Router> {
    let uploader = ImageUploader::new(upload_url, "unsigned".to_string(), Duration::from_secs(2))?;
    Ok(api::app(Arc::new(state(backend_url)?.with_uploader(uploader))))
}

pub fn get(uri: &str, cookie: Option<&str>) -> Result<Request<Body>> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header("cookie", cookie);
    }
    Ok(builder.body(Body::empty())?)
}

pub fn post_json(uri: &str, cookie: Option<&str>, body: &serde_json::Value) -> Result<Request<Body>> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header("cookie", cookie);
    }
    Ok(builder.body(Body::from(serde_json::to_vec(body)?))?)
}

pub async fn body_json(response: Response) -> Result<serde_json::Value> {
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

pub fn set_cookies(headers: &HeaderMap) -> Vec<String> {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok().map(str::to_string))
        .collect()
}

/// The `Set-Cookie` line for `name`, if any.
pub fn set_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    let prefix = format!("{name}=");
    set_cookies(headers)
        .into_iter()
        .find(|cookie| cookie.starts_with(&prefix))
}

/// The last `Set-Cookie` line for `name`; the one a browser keeps.
pub fn last_set_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    let prefix = format!("{name}=");
    set_cookies(headers)
        .into_iter()
        .rev()
        .find(|cookie| cookie.starts_with(&prefix))
}

pub fn location(response: &Response) -> Option<&str> {
    response
        .headers()
        .get("location")
        .and_then(|value| value.to_str().ok())
}
