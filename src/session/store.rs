//! Token persistence on top of the cookie jar.

use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use super::{
    cookies::{CookieJar, CookieWrite},
    policy::{
        ACCESS_TOKEN_COOKIE, CookieOptions, REFRESH_TOKEN_COOKIE, SessionPolicy, USER_ID_COOKIE,
    },
};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("access and refresh tokens are required")]
    MissingToken,
    #[error("failed to set tokens")]
    SetTokens,
    #[error("failed to clear tokens")]
    ClearTokens,
    #[error("failed to set user id")]
    UserId,
}

/// Tokens read from the cookie jar.
#[derive(Debug, Default)]
pub struct Tokens {
    pub access_token: Option<SecretString>,
    pub refresh_token: Option<SecretString>,
}

impl Tokens {
    #[must_use]
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_ref().map(|token| token.expose_secret())
    }

    #[must_use]
    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_ref().map(|token| token.expose_secret())
    }
}

#[derive(Clone, Debug)]
pub struct TokenStore {
    policy: Arc<SessionPolicy>,
}

impl TokenStore {
    #[must_use]
    pub const fn new(policy: Arc<SessionPolicy>) -> Self {
        Self { policy }
    }

    #[must_use]
    pub fn policy(&self) -> &SessionPolicy {
        &self.policy
    }

    /// Persist both tokens.
    ///
    /// The access cookie always uses the policy's access lifetime; a caller
    /// `max_age` only applies to the refresh cookie.
    ///
    /// # Errors
    /// `MissingToken` if either token is empty, `SetTokens` if a token is not a
    /// valid cookie value. No cookie is written in either case.
    pub fn set_tokens(
        &self,
        jar: &mut CookieJar,
        access_token: &str,
        refresh_token: &str,
        options: Option<&CookieOptions>,
    ) -> Result<(), SessionError> {
        if access_token.is_empty() || refresh_token.is_empty() {
            return Err(SessionError::MissingToken);
        }

        let access_options = options.map(|options| CookieOptions {
            max_age: None,
            ..options.clone()
        });

        let writes = vec![
            CookieWrite {
                name: ACCESS_TOKEN_COOKIE.to_string(),
                value: access_token.to_string(),
                attributes: self
                    .policy
                    .attributes(self.policy.access_max_age(), access_options.as_ref()),
            },
            CookieWrite {
                name: REFRESH_TOKEN_COOKIE.to_string(),
                value: refresh_token.to_string(),
                attributes: self
                    .policy
                    .attributes(self.policy.refresh_max_age(), options),
            },
        ];

        jar.write_all(writes).map_err(|err| {
            debug!("Rejected session cookie: {err}");
            SessionError::SetTokens
        })
    }

    #[must_use]
    pub fn get_tokens(&self, jar: &CookieJar) -> Tokens {
        Tokens {
            access_token: jar
                .get(ACCESS_TOKEN_COOKIE)
                .map(|token| SecretString::from(token.to_string())),
            refresh_token: jar
                .get(REFRESH_TOKEN_COOKIE)
                .map(|token| SecretString::from(token.to_string())),
        }
    }

    /// Expire both token cookies.
    ///
    /// # Errors
    /// `ClearTokens` if the expiring cookies could not be rendered.
    pub fn clear_tokens(&self, jar: &mut CookieJar) -> Result<(), SessionError> {
        let writes = [ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE]
            .into_iter()
            .map(|name| self.expired(name))
            .collect();
        jar.write_all(writes).map_err(|_| SessionError::ClearTokens)
    }

    /// Presence check only; expiry and signatures are the backend's concern.
    #[must_use]
    pub fn has_valid_tokens(&self, jar: &CookieJar) -> bool {
        let tokens = self.get_tokens(jar);
        tokens.access_token().is_some_and(|token| !token.is_empty())
            && tokens.refresh_token().is_some_and(|token| !token.is_empty())
    }

    /// Remember the signed-in user id for the refresh token's lifetime.
    ///
    /// # Errors
    /// `UserId` if the id is empty or cannot be used as a cookie value.
    pub fn set_user_id(&self, jar: &mut CookieJar, user_id: &str) -> Result<(), SessionError> {
        if user_id.is_empty() {
            return Err(SessionError::UserId);
        }
        let write = CookieWrite {
            name: USER_ID_COOKIE.to_string(),
            value: user_id.to_string(),
            attributes: self
                .policy
                .attributes(self.policy.refresh_max_age(), None),
        };
        jar.write_all(vec![write]).map_err(|_| SessionError::UserId)
    }

    #[must_use]
    pub fn user_id<'a>(&self, jar: &'a CookieJar) -> Option<&'a str> {
        jar.get(USER_ID_COOKIE)
    }

    /// # Errors
    /// `ClearTokens` if the expiring cookie could not be rendered.
    pub fn clear_user_id(&self, jar: &mut CookieJar) -> Result<(), SessionError> {
        jar.write_all(vec![self.expired(USER_ID_COOKIE)])
            .map_err(|_| SessionError::ClearTokens)
    }

    fn expired(&self, name: &str) -> CookieWrite {
        CookieWrite {
            name: name.to_string(),
            value: String::new(),
            attributes: self.policy.expired_attributes(),
        }
    }
}
