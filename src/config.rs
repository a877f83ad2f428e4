//! Configuration management for spyt.
//!
//! This module handles loading and accessing configuration values from environment
//! variables and `.env` files. It provides a single [`Config`] value that is built
//! once at startup and then passed explicitly to the clients, the token managers and
//! the API server.
//!
//! The configuration system follows a hierarchical approach:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Application defaults (where applicable)

use std::{env, num::NonZeroU32, path::PathBuf};

use crate::{
    error::{Error, Result},
    export::ExportOptions,
};

pub const SPOTIFY_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
pub const SPOTIFY_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const SPOTIFY_API_URL: &str = "https://api.spotify.com/v1";

pub const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const YOUTUBE_API_URL: &str = "https://www.googleapis.com/youtube/v3";

pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8888";

/// Loads environment variables from a `.env` file in the local data directory.
///
/// Creates the necessary directory structure if it doesn't exist and loads
/// environment variables from a `.env` file located in the platform-specific
/// local data directory under `spyt/.env`. This allows users to store
/// client credentials without hardcoding them.
///
/// # Directory Structure
///
/// The function looks for the `.env` file in:
/// - Linux: `~/.local/share/spyt/.env`
/// - macOS: `~/Library/Application Support/spyt/.env`
/// - Windows: `%LOCALAPPDATA%/spyt/.env`
///
/// # Errors
///
/// This function will return an error if:
/// - The parent directory cannot be created
/// - The `.env` file exists but cannot be read or parsed
///
/// Variables that are already present in the process environment are never
/// overwritten by the file.
pub async fn load_env() -> Result<()> {
    let path = data_dir().join(".env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent).await?;
    }

    if !path.exists() {
        return Ok(());
    }

    dotenv::from_path(&path)
        .map_err(|e| Error::Configuration(format!("{}: {}", path.display(), e)))?;
    Ok(())
}

/// Root of everything spyt keeps on disk.
pub fn data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("spyt")
}

/// Endpoints and client credentials of one OAuth-protected service.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub client_id: String,
    pub client_secret: String,
    pub auth_url: String,
    pub token_url: String,
    pub api_url: String,
    pub redirect_uri: String,
}

/// Runtime configuration of the CLI and the API server.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the local server binds to, e.g. `127.0.0.1:8888`.
    pub server_address: String,
    /// Externally visible base URL of the local server. OAuth redirect URIs
    /// are derived from it and must be registered with both providers.
    pub public_url: String,
    pub spotify: ServiceConfig,
    pub youtube: ServiceConfig,
    pub export: ExportOptions,
}

impl Config {
    /// Builds the configuration from the process environment.
    ///
    /// # Required variables
    ///
    /// - `SPOTIFY_CLIENT_ID`, `SPOTIFY_CLIENT_SECRET`
    /// - `GOOGLE_CLIENT_ID`, `GOOGLE_CLIENT_SECRET`
    ///
    /// # Optional variables
    ///
    /// - `SERVER_ADDRESS` (default `127.0.0.1:8888`)
    /// - `PUBLIC_URL` (default `http://{SERVER_ADDRESS}`)
    /// - `SPOTIFY_API_URL`, `SPOTIFY_AUTH_URL`, `SPOTIFY_TOKEN_URL`
    /// - `YOUTUBE_API_URL`, `GOOGLE_AUTH_URL`, `GOOGLE_TOKEN_URL`
    /// - `SPYT_REQUESTS_PER_SECOND` (default 10)
    /// - `SPYT_FAILURE_SAMPLE_LIMIT` (default 10)
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`Config::from_env`] but reads values through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> Result<String> {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| Error::Configuration(format!("{key} must be set")))
        };
        let optional = |key: &str, default: &str| -> String {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let server_address = optional("SERVER_ADDRESS", DEFAULT_SERVER_ADDRESS);
        let public_url = optional("PUBLIC_URL", &format!("http://{server_address}"))
            .trim_end_matches('/')
            .to_string();

        let spotify = ServiceConfig {
            client_id: required("SPOTIFY_CLIENT_ID")?,
            client_secret: required("SPOTIFY_CLIENT_SECRET")?,
            auth_url: optional("SPOTIFY_AUTH_URL", SPOTIFY_AUTH_URL),
            token_url: optional("SPOTIFY_TOKEN_URL", SPOTIFY_TOKEN_URL),
            api_url: optional("SPOTIFY_API_URL", SPOTIFY_API_URL),
            redirect_uri: format!("{public_url}/callback/spotify"),
        };

        let youtube = ServiceConfig {
            client_id: required("GOOGLE_CLIENT_ID")?,
            client_secret: required("GOOGLE_CLIENT_SECRET")?,
            auth_url: optional("GOOGLE_AUTH_URL", GOOGLE_AUTH_URL),
            token_url: optional("GOOGLE_TOKEN_URL", GOOGLE_TOKEN_URL),
            api_url: optional("YOUTUBE_API_URL", YOUTUBE_API_URL),
            redirect_uri: format!("{public_url}/callback/youtube"),
        };

        let mut export = ExportOptions::default();
        if let Some(rps) = lookup("SPYT_REQUESTS_PER_SECOND") {
            let rps = rps.trim().parse::<u32>().ok().and_then(NonZeroU32::new).ok_or_else(|| {
                Error::Configuration(format!(
                    "SPYT_REQUESTS_PER_SECOND must be a positive integer, got '{rps}'"
                ))
            })?;
            export.requests_per_second = rps;
        }
        if let Some(limit) = lookup("SPYT_FAILURE_SAMPLE_LIMIT") {
            export.failure_sample_limit = limit.trim().parse::<usize>().map_err(|_| {
                Error::Configuration(format!(
                    "SPYT_FAILURE_SAMPLE_LIMIT must be a number, got '{limit}'"
                ))
            })?;
        }

        Ok(Config {
            server_address,
            public_url,
            spotify,
            youtube,
            export,
        })
    }
}
