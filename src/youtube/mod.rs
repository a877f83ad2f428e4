//! # YouTube Integration Module
//!
//! Destination side of an export. Implements the three YouTube Data API v3
//! operations spyt needs plus the Google sign-in flow.
//!
//! ## API Coverage
//!
//! - `POST /playlists?part=snippet,status` - create a private playlist
//! - `GET /search?part=snippet&type=video&videoCategoryId=10&maxResults=1` - find a
//!   music video, first by ISRC and then by `"title artists"`
//! - `POST /playlistItems?part=snippet` - append a video to a playlist
//! - `POST https://oauth2.googleapis.com/token` - code exchange and token refresh
//!
//! ## Quota
//!
//! Every search costs 100 quota units, every insert 50. The client itself does
//! not pace requests; the exporter applies a token bucket and backs off on 429.

pub mod auth;
pub mod playlists;

use reqwest::Client;

#[derive(Debug, Clone)]
pub struct YouTubeClient {
    http: Client,
    api_url: String,
}

impl YouTubeClient {
    pub fn new(http: Client, api_url: &str) -> Self {
        YouTubeClient {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }
}
