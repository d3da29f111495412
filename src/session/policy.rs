//! Cookie policy for the session tokens.
//!
//! A single `SessionPolicy` value describes how the access and refresh tokens
//! are persisted. It is built once at startup from the CLI options and shared
//! with the token store, so every place that reads or writes the session uses
//! the same names, lifetimes and attributes.

use std::fmt;

/// Cookie holding the short-lived access token.
pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";
/// Cookie holding the refresh token.
pub const REFRESH_TOKEN_COOKIE: &str = "refreshToken";
/// Cookie holding the signed-in user id.
pub const USER_ID_COOKIE: &str = "userId";

/// Access token lifetime in seconds (one hour).
pub const ACCESS_TOKEN_MAX_AGE_SECONDS: i64 = 60 * 60;
/// Refresh token lifetime in seconds (four hours).
pub const REFRESH_TOKEN_MAX_AGE_SECONDS: i64 = 4 * 60 * 60;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum SameSite {
    Strict,
    #[default]
    Lax,
    None,
}

impl fmt::Display for SameSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            Self::Strict => "Strict",
            Self::Lax => "Lax",
            Self::None => "None",
        };
        f.write_str(value)
    }
}

/// Deployment mode; production turns on the `Secure` cookie attribute.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    /// Parse the CLI/env value, accepting the common short forms.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "development" | "dev" => Some(Self::Development),
            "production" | "prod" => Some(Self::Production),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Attributes written on every session cookie.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CookieAttributes {
    pub max_age: i64,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: SameSite,
    pub path: String,
}

/// Per-call overrides of the policy defaults.
#[derive(Clone, Debug, Default)]
pub struct CookieOptions {
    pub max_age: Option<i64>,
    pub secure: Option<bool>,
    pub same_site: Option<SameSite>,
    pub path: Option<String>,
}

#[derive(Clone, Debug)]
pub struct SessionPolicy {
    access_max_age: i64,
    refresh_max_age: i64,
    secure: bool,
    same_site: SameSite,
    path: String,
}

impl SessionPolicy {
    #[must_use]
    pub fn new(environment: Environment) -> Self {
        Self {
            access_max_age: ACCESS_TOKEN_MAX_AGE_SECONDS,
            refresh_max_age: REFRESH_TOKEN_MAX_AGE_SECONDS,
            secure: environment.is_production(),
            same_site: SameSite::Lax,
            path: "/".to_string(),
        }
    }

    #[must_use]
    pub fn with_access_max_age(mut self, seconds: i64) -> Self {
        self.access_max_age = seconds;
        self
    }

    #[must_use]
    pub fn with_refresh_max_age(mut self, seconds: i64) -> Self {
        self.refresh_max_age = seconds;
        self
    }

    #[must_use]
    pub const fn access_max_age(&self) -> i64 {
        self.access_max_age
    }

    #[must_use]
    pub const fn refresh_max_age(&self) -> i64 {
        self.refresh_max_age
    }

    #[must_use]
    pub const fn secure(&self) -> bool {
        self.secure
    }

    /// Defaults merged with the caller's options, using `max_age` as the
    /// lifetime when the caller does not override it.
    #[must_use]
    pub fn attributes(&self, max_age: i64, options: Option<&CookieOptions>) -> CookieAttributes {
        let mut attributes = CookieAttributes {
            max_age,
            secure: self.secure,
            http_only: true,
            same_site: self.same_site,
            path: self.path.clone(),
        };

        if let Some(options) = options {
            if let Some(max_age) = options.max_age {
                attributes.max_age = max_age;
            }
            if let Some(secure) = options.secure {
                attributes.secure = secure;
            }
            if let Some(same_site) = options.same_site {
                attributes.same_site = same_site;
            }
            if let Some(path) = &options.path {
                attributes.path.clone_from(path);
            }
        }

        attributes
    }

    /// Attributes that expire a cookie immediately.
    #[must_use]
    pub fn expired_attributes(&self) -> CookieAttributes {
        self.attributes(0, None)
    }
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self::new(Environment::default())
    }
}
