//! Browser session: the access/refresh token pair kept in cookies.

pub mod cookies;
pub mod policy;
pub mod store;

pub use cookies::{CookieError, CookieJar, CookieWrite};
pub use policy::{CookieOptions, Environment, SameSite, SessionPolicy};
pub use store::{SessionError, TokenStore, Tokens};
