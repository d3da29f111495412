//! The `{ success, message, data }` envelope every backend response uses.

use axum::http::StatusCode;
use serde::{
    Deserialize,
    de::{DeserializeOwned, IgnoredAny},
};

use super::errors::BackendError;

/// Maximum number of error body characters surfaced to callers.
const MAX_ERROR_CHARS: usize = 200;

#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub success: Option<bool>,
    pub message: Option<String>,
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// Payload of a successful call that must carry data.
    ///
    /// # Errors
    /// `Decode` when the backend reported success without a payload.
    pub fn into_data(self) -> Result<T, BackendError> {
        self.data
            .ok_or_else(|| BackendError::Decode("response has no data".to_string()))
    }

    /// Server message, or `fallback` when it sent none.
    #[must_use]
    pub fn message_or(&self, fallback: &str) -> String {
        self.message
            .as_deref()
            .map(str::trim)
            .filter(|message| !message.is_empty())
            .unwrap_or(fallback)
            .to_string()
    }
}

/// How a single backend call should be interpreted.
#[derive(Clone, Copy, Debug)]
pub struct Call<'a> {
    /// Message used when the backend fails without saying why.
    pub fallback: &'a str,
    /// Whether the call carried a bearer token; a `401` then means the session
    /// is gone rather than that the submitted credentials were wrong.
    pub authenticated: bool,
}

impl<'a> Call<'a> {
    #[must_use]
    pub const fn public(fallback: &'a str) -> Self {
        Self {
            fallback,
            authenticated: false,
        }
    }

    #[must_use]
    pub const fn authenticated(fallback: &'a str) -> Self {
        Self {
            fallback,
            authenticated: true,
        }
    }
}

/// Map a raw status and body to the envelope or the matching error.
///
/// # Errors
/// `Api` or `Unauthorized` for refused calls, `Decode` for a successful status
/// with an unreadable body.
pub fn interpret<T: DeserializeOwned>(
    status: StatusCode,
    body: &[u8],
    call: Call<'_>,
) -> Result<Envelope<T>, BackendError> {
    if !status.is_success() {
        let message = serde_json::from_slice::<Envelope<IgnoredAny>>(body).map_or_else(
            |_| sanitize_body(body, call.fallback),
            |envelope| envelope.message_or(call.fallback),
        );
        return Err(refused(status, message, call));
    }

    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Envelope {
            success: None,
            message: None,
            data: None,
        });
    }

    let envelope = serde_json::from_slice::<Envelope<T>>(body)
        .map_err(|err| BackendError::Decode(err.to_string()))?;
    if envelope.success == Some(false) {
        return Err(refused(status, envelope.message_or(call.fallback), call));
    }
    Ok(envelope)
}

fn refused(status: StatusCode, message: String, call: Call<'_>) -> BackendError {
    if call.authenticated && status == StatusCode::UNAUTHORIZED {
        BackendError::Unauthorized(message)
    } else {
        BackendError::Api { status, message }
    }
}

/// Trim and truncate a non-JSON error body; empty bodies use the fallback.
fn sanitize_body(body: &[u8], fallback: &str) -> String {
    let text = String::from_utf8_lossy(body);
    let trimmed = text.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.chars().take(MAX_ERROR_CHARS).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn success_returns_data() -> Result<(), BackendError> {
        let body = br#"{"success":true,"message":"ok","data":{"id":1}}"#;
        let envelope: Envelope<Value> = interpret(StatusCode::OK, body, Call::public("x"))?;
        assert_eq!(envelope.into_data()?["id"], 1);
        Ok(())
    }

    #[test]
    fn success_false_uses_server_message() {
        let body = br#"{"success":false,"message":"bad creds"}"#;
        let result: Result<Envelope<Value>, _> =
            interpret(StatusCode::OK, body, Call::public("Login failed"));
        assert_eq!(result.err().map(|err| err.to_string()).as_deref(), Some("bad creds"));
    }

    #[test]
    fn missing_message_uses_fallback() {
        let body = br#"{"success":false}"#;
        let result: Result<Envelope<Value>, _> =
            interpret(StatusCode::BAD_REQUEST, body, Call::public("Login failed"));
        assert_eq!(result.err().map(|err| err.to_string()).as_deref(), Some("Login failed"));
    }

    #[test]
    fn unauthorized_only_for_authenticated_calls() {
        let body = br#"{"success":false,"message":"expired"}"#;
        let public: Result<Envelope<Value>, _> =
            interpret(StatusCode::UNAUTHORIZED, body, Call::public("x"));
        assert!(matches!(public, Err(BackendError::Api { status, .. }) if status == StatusCode::UNAUTHORIZED));

        let authenticated: Result<Envelope<Value>, _> =
            interpret(StatusCode::UNAUTHORIZED, body, Call::authenticated("x"));
        assert!(matches!(authenticated, Err(BackendError::Unauthorized(_))));
    }

    #[test]
    fn non_json_error_body_is_sanitized() {
        let long = format!("  {}  ", "e".repeat(500));
        let result: Result<Envelope<Value>, _> = interpret(
            StatusCode::BAD_GATEWAY,
            long.as_bytes(),
            Call::public("fallback"),
        );
        match result {
            Err(BackendError::Api { status, message }) => {
                assert_eq!(status, StatusCode::BAD_GATEWAY);
                assert_eq!(message.len(), MAX_ERROR_CHARS);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn empty_error_body_uses_fallback() {
        let result: Result<Envelope<Value>, _> =
            interpret(StatusCode::INTERNAL_SERVER_ERROR, b"", Call::public("fallback"));
        assert_eq!(result.err().map(|err| err.to_string()).as_deref(), Some("fallback"));
    }

    #[test]
    fn empty_success_body_is_accepted() -> Result<(), BackendError> {
        let envelope: Envelope<Value> = interpret(StatusCode::NO_CONTENT, b"", Call::public("x"))?;
        assert!(envelope.data.is_none());
        Ok(())
    }

    #[test]
    fn refusal_with_unexpected_data_keeps_message() {
        let body = br#"{"success":false,"message":"Email taken","data":[1,2]}"#;
        let result: Result<Envelope<String>, _> =
            interpret(StatusCode::CONFLICT, body, Call::public("Registration failed"));
        assert_eq!(result.err().map(|err| err.to_string()).as_deref(), Some("Email taken"));
    }

    #[test]
    fn garbage_success_body_is_a_decode_error() {
        let result: Result<Envelope<Value>, _> =
            interpret(StatusCode::OK, b"<html>", Call::public("x"));
        assert!(matches!(result, Err(BackendError::Decode(_))));
    }
}
