//! Map validated CLI arguments to the action to run.

use crate::cli::actions::{Action, server::Args};
use crate::cli::commands::{ARG_PORT, backend, media, session};
use anyhow::Result;

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(8080);

    let backend_opts = backend::Options::parse(matches)?;
    let session_opts = session::Options::parse(matches);
    let media_opts = media::Options::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        backend_url: backend_opts.url,
        backend_timeout_seconds: backend_opts.timeout_seconds,
        environment: session_opts.environment,
        access_token_max_age: session_opts.access_max_age,
        refresh_token_max_age: session_opts.refresh_max_age,
        cloudinary_url: media_opts.as_ref().map(|opts| opts.upload_url.clone()),
        cloudinary_upload_preset: media_opts.map(|opts| opts.upload_preset),
    }))
}
