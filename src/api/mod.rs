//! # API Module
//!
//! HTTP endpoints of the local server started by `spyt serve` and, for the
//! duration of a sign-in, by `spyt auth`.
//!
//! ## Endpoints
//!
//! ### Authentication
//!
//! - [`spotify_auth`], [`youtube_auth`] - redirect the browser to the consent page
//!   of the service. A fresh `state` (and for Google a PKCE verifier) is
//!   remembered until the callback arrives.
//! - [`spotify_callback`], [`youtube_callback`] - exchange the authorization code
//!   and keep the resulting session in the server state.
//!
//! ### Playlists
//!
//! - [`playlists`] - one page of the signed-in user's Spotify playlists.
//! - [`export`] - copy playlists to YouTube. The YouTube credential can come
//!   with the request body; without it the server's own YouTube session is used.
//!
//! ### Monitoring
//!
//! - [`health`] - status and version.
//!
//! ## Errors
//!
//! Failures are JSON bodies of the form `{"error": "..."}` with the status
//! from [`crate::error::Error::status_code`]. A rate limit additionally sets
//! `Retry-After` and carries `retryAfter` in the body.

mod auth;
mod export;
mod health;
mod playlists;

pub use auth::spotify_auth;
pub use auth::spotify_callback;
pub use auth::youtube_auth;
pub use auth::youtube_callback;
pub use export::ExportBody;
pub use export::export;
pub use health::health;
pub use playlists::playlists;
