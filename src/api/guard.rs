//! Route guard run ahead of every routed request.
//!
//! Flow Overview:
//! - Dashboard paths without a refresh cookie go to sign-in.
//! - Dashboard paths with a refresh cookie but no access cookie trigger one
//!   refresh call. Success writes both new cookies on the response and forwards
//!   the request with the new access token; any failure goes to sign-in.
//!   Cookie writes made by the handler itself are emitted after the refreshed
//!   ones, so a handler that ends the session has the last word.
//! - Auth pages visited (GET/HEAD) with an access cookie go to the dashboard.
//!   Form posts to those paths pass through.
//! - Everything else passes through untouched.
//!
//! There is no retry and no coordination between concurrent requests: two
//! navigations that both miss the access cookie each call refresh.

use axum::{
    extract::{Request, State},
    http::{Method, header::COOKIE},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::{
    AppState,
    navigation::{DASHBOARD_PATH, LANDING_PATH, Navigation, SIGN_IN_PATH, SIGN_UP_PATH},
};
use crate::session::{CookieJar, Tokens};

/// Paths that need a session.
pub const PROTECTED_PREFIX: &str = DASHBOARD_PATH;

/// Pages that make no sense once signed in.
pub const PUBLIC_AUTH_PATHS: [&str; 3] = [LANDING_PATH, SIGN_IN_PATH, SIGN_UP_PATH];

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum GuardDecision {
    Allow,
    Refresh,
    Navigate(Navigation),
}

#[must_use]
pub fn is_protected(path: &str) -> bool {
    path.strip_prefix(PROTECTED_PREFIX)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

#[must_use]
pub fn is_public_auth_path(path: &str) -> bool {
    let trimmed = if path.len() > 1 {
        path.trim_end_matches('/')
    } else {
        path
    };
    PUBLIC_AUTH_PATHS.contains(&trimmed)
}

/// Decide what to do with a request from its method, path and cookies alone.
#[must_use]
pub fn decide(method: &Method, path: &str, tokens: &Tokens) -> GuardDecision {
    if is_protected(path) {
        if tokens.refresh_token.is_none() {
            return GuardDecision::Navigate(Navigation::to_sign_in());
        }
        if tokens.access_token.is_none() {
            return GuardDecision::Refresh;
        }
        return GuardDecision::Allow;
    }

    let navigating = method == Method::GET || method == Method::HEAD;
    if navigating && is_public_auth_path(path) && tokens.access_token.is_some() {
        return GuardDecision::Navigate(Navigation::to_dashboard());
    }

    GuardDecision::Allow
}

pub async fn route_guard(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    let mut jar = CookieJar::from_headers(request.headers());
    let tokens = state.store().get_tokens(&jar);

    let decision = decide(request.method(), &path, &tokens);
    debug!(path = %path, ?decision, "route guard");

    match decision {
        GuardDecision::Allow => next.run(request).await,
        GuardDecision::Navigate(navigation) => navigation.into_response(),
        GuardDecision::Refresh => {
            let Some(refresh_token) = tokens.refresh_token.as_ref() else {
                return Navigation::to_sign_in().into_response();
            };

            let pair = match state.backend().refresh_token(refresh_token).await {
                Ok(pair) => pair,
                Err(err) => {
                    info!(path = %path, "Token refresh failed: {err}");
                    return Navigation::to_sign_in().into_response();
                }
            };

            if let Err(err) =
                state
                    .store()
                    .set_tokens(&mut jar, &pair.access_token, &pair.refresh_token, None)
            {
                warn!(path = %path, "Refreshed tokens could not be stored: {err}");
                return Navigation::to_sign_in().into_response();
            }

            debug!(path = %path, "access token refreshed");

            if let Some(cookie) = jar.cookie_header() {
                request.headers_mut().insert(COOKIE, cookie);
            }

            let mut response = next.run(request).await;
            jar.apply_before(response.headers_mut());
            response
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    fn tokens(access: Option<&str>, refresh: Option<&str>) -> Tokens {
        Tokens {
            access_token: access.map(|token| SecretString::from(token.to_string())),
            refresh_token: refresh.map(|token| SecretString::from(token.to_string())),
        }
    }

    #[test]
    fn protected_prefix_matches_whole_segments() {
        assert!(is_protected("/dashboard"));
        assert!(is_protected("/dashboard/"));
        assert!(is_protected("/dashboard/vehicles/1"));
        assert!(!is_protected("/dashboards"));
        assert!(!is_protected("/auth/sign-in"));
    }

    #[test]
    fn public_auth_paths_ignore_trailing_slash() {
        assert!(is_public_auth_path("/"));
        assert!(is_public_auth_path("/auth/sign-in/"));
        assert!(is_public_auth_path("/auth/sign-up"));
        assert!(!is_public_auth_path("/auth/callback"));
    }

    #[test]
    fn protected_without_refresh_goes_to_sign_in() {
        assert_eq!(
            decide(&Method::GET, "/dashboard", &tokens(Some("a"), None)),
            GuardDecision::Navigate(Navigation::to_sign_in())
        );
        assert_eq!(
            decide(&Method::GET, "/dashboard", &tokens(None, None)),
            GuardDecision::Navigate(Navigation::to_sign_in())
        );
    }

    #[test]
    fn protected_without_access_refreshes() {
        assert_eq!(
            decide(&Method::GET, "/dashboard/vehicles", &tokens(None, Some("r"))),
            GuardDecision::Refresh
        );
    }

    #[test]
    fn protected_with_both_tokens_is_allowed() {
        assert_eq!(
            decide(&Method::GET, "/dashboard", &tokens(Some("a"), Some("r"))),
            GuardDecision::Allow
        );
    }

    #[test]
    fn auth_pages_with_access_go_to_dashboard() {
        for path in PUBLIC_AUTH_PATHS {
            assert_eq!(
                decide(&Method::GET, path, &tokens(Some("a"), None)),
                GuardDecision::Navigate(Navigation::to_dashboard())
            );
        }
        assert_eq!(
            decide(&Method::GET, "/auth/sign-in", &tokens(None, Some("r"))),
            GuardDecision::Allow
        );
    }

    #[test]
    fn auth_form_posts_pass_through() {
        assert_eq!(
            decide(&Method::POST, "/auth/sign-in", &tokens(Some("a"), Some("r"))),
            GuardDecision::Allow
        );
        assert_eq!(
            decide(&Method::POST, "/dashboard/vehicles", &tokens(None, None)),
            GuardDecision::Navigate(Navigation::to_sign_in())
        );
    }

    #[test]
    fn other_paths_pass_through() {
        assert_eq!(decide(&Method::GET, "/health", &tokens(None, None)), GuardDecision::Allow);
        assert_eq!(
            decide(&Method::GET, "/auth/callback", &tokens(Some("a"), Some("r"))),
            GuardDecision::Allow
        );
    }
}
