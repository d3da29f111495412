//! Page changes requested by guard and handler flows.
//!
//! Session code never redirects by itself. It returns a `Navigation`, and the
//! caller renders it as an HTTP redirect (route guard, callback) or as a
//! `{ "redirectTo": ... }` body for form submissions made with `fetch`.

use axum::response::{IntoResponse, Redirect, Response};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const LANDING_PATH: &str = "/";
pub const SIGN_IN_PATH: &str = "/auth/sign-in";
pub const SIGN_UP_PATH: &str = "/auth/sign-up";
pub const DASHBOARD_PATH: &str = "/dashboard";

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Navigation {
    path: &'static str,
}

impl Navigation {
    #[must_use]
    pub const fn to_sign_in() -> Self {
        Self { path: SIGN_IN_PATH }
    }

    #[must_use]
    pub const fn to_dashboard() -> Self {
        Self {
            path: DASHBOARD_PATH,
        }
    }

    #[must_use]
    pub const fn path(self) -> &'static str {
        self.path
    }

    /// Body form of the navigation.
    #[must_use]
    pub fn intent(self) -> NavigationIntent {
        NavigationIntent {
            redirect_to: self.path.to_string(),
        }
    }
}

impl IntoResponse for Navigation {
    fn into_response(self) -> Response {
        Redirect::temporary(self.path).into_response()
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NavigationIntent {
    pub redirect_to: String,
}
