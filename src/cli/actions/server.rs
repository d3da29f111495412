use crate::{
    api::{self, AppState},
    backend::BackendClient,
    media::ImageUploader,
    session::{Environment, SessionPolicy, TokenStore},
};
use anyhow::{Context, Result};
use std::{sync::Arc, time::Duration};
use tracing::{debug, info};

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub backend_url: String,
    pub backend_timeout_seconds: u64,
    pub environment: Environment,
    pub access_token_max_age: i64,
    pub refresh_token_max_age: i64,
    pub cloudinary_url: Option<String>,
    pub cloudinary_upload_preset: Option<String>,
}

/// Build the shared gateway state from the parsed arguments.
///
/// # Errors
/// Returns an error if the backend or image host URL is invalid.
pub fn state(args: &Args) -> Result<AppState> {
    let policy = SessionPolicy::new(args.environment)
        .with_access_max_age(args.access_token_max_age)
        .with_refresh_max_age(args.refresh_token_max_age);
    let store = TokenStore::new(Arc::new(policy));

    let timeout = Duration::from_secs(args.backend_timeout_seconds);
    let backend = BackendClient::new(&args.backend_url, timeout)
        .with_context(|| format!("Invalid backend URL: {}", args.backend_url))?;

    let mut state = AppState::new(backend, store);

    match (&args.cloudinary_url, &args.cloudinary_upload_preset) {
        (Some(url), Some(preset)) => {
            let uploader = ImageUploader::new(url, preset.clone(), timeout)
                .with_context(|| format!("Invalid image host URL: {url}"))?;
            state = state.with_uploader(uploader);
        }
        _ => info!("Image host not configured, uploads disabled"),
    }

    debug!(
        backend = %state.backend().base_url(),
        secure_cookies = state.store().policy().secure(),
        "Gateway state ready"
    );

    Ok(state)
}

/// Execute the server action.
/// # Errors
/// Returns an error if the configuration is invalid or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let state = state(&args)?;
    api::new(args.port, Arc::new(state)).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> Args {
        Args {
            port: 8080,
            backend_url: "https://registry.example".to_string(),
            backend_timeout_seconds: 10,
            environment: Environment::Production,
            access_token_max_age: 3600,
            refresh_token_max_age: 7200,
            cloudinary_url: None,
            cloudinary_upload_preset: None,
        }
    }

    #[test]
    fn state_applies_session_policy() -> Result<()> {
        let state = state(&args())?;
        assert!(state.store().policy().secure());
        assert_eq!(state.store().policy().refresh_max_age(), 7200);
        assert!(state.uploader().is_none());
        Ok(())
    }

    #[test]
    fn state_enables_uploads() -> Result<()> {
        let mut args = args();
        args.cloudinary_url = Some("https://api.cloudinary.com/v1_1/demo/image/upload".to_string());
        args.cloudinary_upload_preset = Some("unsigned".to_string());
        assert!(state(&args)?.uploader().is_some());
        Ok(())
    }

    #[test]
    fn state_rejects_bad_backend_url() {
        let mut args = args();
        args.backend_url = "not a url".to_string();
        assert!(state(&args).is_err());
    }
}
