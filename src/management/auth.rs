use std::{io::ErrorKind, path::PathBuf};

use chrono::{Duration, Utc};
use tracing::{debug, warn};

use crate::{
    config,
    error::{Error, Result},
    oauth::{OAuthClient, Service},
    types::TokenRecord,
};

/// A token is refreshed once it is this close to its expiry.
pub const EXPIRY_MARGIN_SECS: i64 = 60;

#[derive(Clone)]
pub struct TokenManager {
    record: TokenRecord,
    oauth: OAuthClient,
    cache_path: Option<PathBuf>,
}

impl TokenManager {
    pub fn new(record: TokenRecord, oauth: OAuthClient) -> Self {
        TokenManager {
            record,
            oauth,
            cache_path: None,
        }
    }

    /// Persist refreshed records to `path`.
    pub fn with_cache(mut self, path: PathBuf) -> Self {
        self.cache_path = Some(path);
        self
    }

    /// Loads the cached session of the service `oauth` belongs to.
    ///
    /// A missing cache file means the user never signed in (or logged out) and
    /// is reported as [`Error::Unauthenticated`].
    pub async fn load(oauth: OAuthClient) -> Result<Self> {
        let path = Self::token_path(oauth.service());
        Self::load_from(path, oauth).await
    }

    pub async fn load_from(path: PathBuf, oauth: OAuthClient) -> Result<Self> {
        let content = match async_fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(Error::Unauthenticated(format!(
                    "No {} session. Run spyt auth {}",
                    oauth.service(),
                    oauth.service().as_str()
                )));
            }
            Err(e) => return Err(e.into()),
        };
        let record: TokenRecord = serde_json::from_str(&content)?;
        Ok(Self::new(record, oauth).with_cache(path))
    }

    pub async fn persist(&self) -> Result<()> {
        let Some(path) = &self.cache_path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            async_fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(&self.record)?;
        async_fs::write(path, json).await?;
        Ok(())
    }

    /// Forgets the cached session of `service`. Returns whether one existed.
    pub async fn clear(service: Service) -> Result<bool> {
        match async_fs::remove_file(Self::token_path(service)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    pub fn token_path(service: Service) -> PathBuf {
        config::data_dir()
            .join("cache")
            .join(format!("{}-token.json", service.as_str()))
    }

    pub fn service(&self) -> Service {
        self.oauth.service()
    }

    pub fn record(&self) -> &TokenRecord {
        &self.record
    }

    pub fn is_valid(&self) -> bool {
        self.record.is_valid_at(Utc::now(), Self::margin())
    }

    /// Access token that is valid for at least the expiry margin, refreshing first
    /// when needed. A refreshed record replaces the held one and is written to
    /// the cache.
    pub async fn access_token(&mut self) -> Result<String> {
        let fresh = self
            .oauth
            .ensure_fresh(self.record.clone(), Self::margin())
            .await?;
        if fresh != self.record {
            debug!(service = %self.service(), "Access token refreshed");
            self.record = fresh;
            if let Err(e) = self.persist().await {
                warn!(service = %self.service(), error = %e, "Failed to cache refreshed token");
            }
        }
        Ok(self.record.access_token.clone())
    }

    fn margin() -> Duration {
        Duration::seconds(EXPIRY_MARGIN_SECS)
    }
}
