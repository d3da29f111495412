//! # Vehireg (vehicle registry session gateway)
//!
//! `vehireg` sits between the browser and the vehicle-registry REST API and
//! owns the browser session.
//!
//! ## Session
//!
//! The backend mints two opaque bearer tokens: a short-lived access token and
//! a longer-lived refresh token. Both are kept in cookies whose names,
//! lifetimes and attributes come from one [`session::SessionPolicy`] built at
//! startup. The gateway never inspects the tokens; it only checks presence.
//!
//! ## Route guard
//!
//! Every request passes [`api::guard`] first. Dashboard routes need a refresh
//! token; when only the access token is missing it is silently refreshed, and
//! any refresh failure sends the user back to sign-in. Auth pages redirect to
//! the dashboard when a session is already present.
//!
//! ## Relay
//!
//! Dashboard CRUD calls for vehicles, service records, echo tests, insurance
//! claims, modification requests and service stations are relayed to the
//! backend with the access token attached. Image uploads go to the image host.

pub mod api;
pub mod backend;
pub mod cli;
pub mod media;
pub mod session;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
