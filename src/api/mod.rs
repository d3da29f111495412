use crate::{backend::BackendClient, media::ImageUploader, session::TokenStore};
use anyhow::Result;
use axum::{
    Extension, Router,
    body::Body,
    extract::MatchedPath,
    http::{HeaderName, HeaderValue, Request},
    middleware,
    routing::{get, options},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::PropagateRequestIdLayer, set_header::SetRequestHeaderLayer, trace::TraceLayer,
};
use tracing::{Span, error, info, info_span};
use ulid::Ulid;

pub mod errors;
pub mod guard;
pub(crate) mod handlers;
pub mod navigation;
// OpenAPI router wiring and route registration live in openapi.rs.
mod openapi;
pub mod validation;

pub use errors::ApiError;
pub use openapi::openapi;

/// Everything a handler needs, shared behind an `Arc`.
#[derive(Debug)]
pub struct AppState {
    backend: BackendClient,
    store: TokenStore,
    uploader: Option<ImageUploader>,
}

impl AppState {
    #[must_use]
    pub const fn new(backend: BackendClient, store: TokenStore) -> Self {
        Self {
            backend,
            store,
            uploader: None,
        }
    }

    #[must_use]
    pub fn with_uploader(mut self, uploader: ImageUploader) -> Self {
        self.uploader = Some(uploader);
        self
    }

    #[must_use]
    pub const fn backend(&self) -> &BackendClient {
        &self.backend
    }

    #[must_use]
    pub const fn store(&self) -> &TokenStore {
        &self.store
    }

    #[must_use]
    pub const fn uploader(&self) -> Option<&ImageUploader> {
        self.uploader.as_ref()
    }
}

/// Build the gateway router: documented routes, `/`, preflight `OPTIONS /health`,
/// the non-`POST` methods of `/dashboard/uploads` and a JSON 404 fallback, all
/// behind the route guard.
pub fn app(state: Arc<AppState>) -> Router {
    let (router, _openapi) = openapi::api_router().split_for_parts();
    router
        .route("/", get(handlers::root::root))
        .route("/health", options(handlers::health::health))
        .route(
            "/dashboard/uploads",
            get(handlers::uploads::not_a_resource)
                .put(handlers::uploads::not_a_resource)
                .delete(handlers::uploads::not_a_resource),
        )
        .fallback(handlers::not_found)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            guard::route_guard,
        ))
        .layer(Extension(state))
}

/// Start the server
/// # Errors
/// Return error if failed to start the server
pub async fn new(port: u16, state: Arc<AppState>) -> Result<()> {
    let app = app(state).layer(
        ServiceBuilder::new()
            .layer(SetRequestHeaderLayer::if_not_present(
                HeaderName::from_static("x-request-id"),
                |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
            ))
            .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                "x-request-id",
            )))
            .layer(TraceLayer::new_for_http().make_span_with(make_span)),
    );

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Gracefully shutdown"),
        Err(err) => {
            error!("Failed to listen for shutdown signal: {err}");
            std::future::pending::<()>().await;
        }
    }
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}
