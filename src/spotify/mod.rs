//! # Spotify Integration Module
//!
//! This module is the source side of an export. It implements the parts of the
//! Spotify Web API spyt needs: signing in, listing the user's playlists and
//! reading a playlist's complete track list.
//!
//! ## Architecture
//!
//! ```text
//! Exporter / CLI / API server
//!          ↓
//! Spotify Integration Layer
//!     ├── Authentication (authorization code + refresh token, confidential client)
//!     └── Playlists (limit/offset listing, cursor-paginated tracks)
//!          ↓
//! HTTP Layer (reqwest, JSON)
//!          ↓
//! Spotify Web API
//! ```
//!
//! ## API Coverage
//!
//! - `GET /me/playlists` - the user's playlists, paginated by `limit`/`offset`
//! - `GET /playlists/{id}/tracks` - a playlist's items, followed through `next`
//! - `POST /api/token` - code exchange and token refresh
//!
//! ## Error Handling
//!
//! Every call goes through [`crate::upstream::ensure_success`]:
//! - **429 Too Many Requests** becomes [`crate::error::Error::RateLimited`] with the
//!   `Retry-After` value (1 second when the header is missing)
//! - **Other non-2xx** responses become [`crate::error::Error::Upstream`] with the
//!   status code and the raw body text
//!
//! Nothing here retries on its own; the caller decides what a rate limit means.
//!
//! ## Token Handling
//!
//! The client never stores credentials. Every method takes the access token
//! as an argument and callers obtain it from a [`crate::management::TokenManager`],
//! which refreshes it first when needed.

pub mod auth;
pub mod playlists;

use reqwest::Client;

/// Thin client over the Spotify Web API.
#[derive(Debug, Clone)]
pub struct SpotifyClient {
    http: Client,
    api_url: String,
}

impl SpotifyClient {
    pub fn new(http: Client, api_url: &str) -> Self {
        SpotifyClient {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }
}
