//! Auth endpoints of the registry backend.

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tracing::instrument;

use super::{
    BackendClient, BackendError, Call,
    types::{AuthSession, LoginRequest, RegisterRequest, TokenPair, UserDetails, UserPayload},
};

impl BackendClient {
    /// `POST /api/auth/login`
    ///
    /// # Errors
    /// `Api` with the server message (or "Login failed") when refused.
    #[instrument(skip_all)]
    pub async fn login(&self, request: &LoginRequest) -> Result<AuthSession, BackendError> {
        let url = self.endpoint(&["api", "auth", "login"])?;
        self.execute(self.http().post(url).json(request), Call::public("Login failed"))
            .await?
            .into_data()
    }

    /// `POST /api/auth/register`
    ///
    /// # Errors
    /// `Api` with the server message (or "Registration failed") when refused.
    #[instrument(skip_all)]
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthSession, BackendError> {
        let url = self.endpoint(&["api", "auth", "register"])?;
        self.execute(
            self.http().post(url).json(request),
            Call::public("Registration failed"),
        )
        .await?
        .into_data()
    }

    /// `POST /api/auth/logout`, sending whichever tokens are still around.
    ///
    /// # Errors
    /// Any transport or refusal error; callers clear cookies regardless.
    #[instrument(skip_all)]
    pub async fn logout(
        &self,
        access_token: Option<&SecretString>,
        refresh_token: Option<&SecretString>,
    ) -> Result<(), BackendError> {
        let url = self.endpoint(&["api", "auth", "logout"])?;
        let mut request = self.http().post(url).json(&json!({
            "refreshToken": refresh_token.map(|token| token.expose_secret()),
        }));
        if let Some(token) = access_token {
            request = request.bearer_auth(token.expose_secret());
        }
        let call = if access_token.is_some() {
            Call::authenticated("Logout failed")
        } else {
            Call::public("Logout failed")
        };
        self.execute::<serde_json::Value>(request, call).await?;
        Ok(())
    }

    /// `POST /api/auth/refresh`: mint a new token pair from the refresh token.
    ///
    /// # Errors
    /// Any failure; the route guard treats all of them as "sign in again".
    #[instrument(skip_all)]
    pub async fn refresh_token(
        &self,
        refresh_token: &SecretString,
    ) -> Result<TokenPair, BackendError> {
        let url = self.endpoint(&["api", "auth", "refresh"])?;
        let body = json!({ "refreshToken": refresh_token.expose_secret() });
        self.execute(
            self.http().post(url).json(&body),
            Call::public("Token refresh failed"),
        )
        .await?
        .into_data()
    }

    /// `GET /api/auth/user`
    ///
    /// # Errors
    /// `Unauthorized` when the access token is rejected.
    #[instrument(skip_all)]
    pub async fn get_user_details(
        &self,
        access_token: &SecretString,
    ) -> Result<UserDetails, BackendError> {
        let url = self.endpoint(&["api", "auth", "user"])?;
        let payload: UserPayload = self
            .execute(
                self.http().get(url).bearer_auth(access_token.expose_secret()),
                Call::authenticated("Failed to fetch user details"),
            )
            .await?
            .into_data()?;
        Ok(payload.into())
    }

    /// `POST /api/auth/resend-verification`; returns the server's message.
    ///
    /// # Errors
    /// `Api` when refused.
    #[instrument(skip_all)]
    pub async fn resend_verification(&self, email: &str) -> Result<String, BackendError> {
        let url = self.endpoint(&["api", "auth", "resend-verification"])?;
        let envelope = self
            .execute::<serde_json::Value>(
                self.http().post(url).json(&json!({ "email": email })),
                Call::public("Failed to resend verification email"),
            )
            .await?;
        Ok(envelope.message_or("Verification email sent"))
    }

    /// `GET /api/auth/verify-email/:token`; returns the server's message.
    ///
    /// # Errors
    /// `Api` when the token is unknown or expired.
    #[instrument(skip_all)]
    pub async fn verify_email(&self, token: &str) -> Result<String, BackendError> {
        let url = self.endpoint(&["api", "auth", "verify-email", token])?;
        let envelope = self
            .execute::<serde_json::Value>(
                self.http().get(url),
                Call::public("Email verification failed"),
            )
            .await?;
        Ok(envelope.message_or("Email verified"))
    }
}
