//! OAuth 2.0 plumbing shared by the Spotify and YouTube sign-in flows.
//!
//! Both services are used as confidential clients: the authorization code is
//! exchanged with the client secret, and expired access tokens are renewed with
//! the refresh-token grant. The provider specific bits (scopes, how the client
//! authenticates at the token endpoint, PKCE) live in [`ProviderSettings`]
//! values defined next to each service client.

use std::fmt;

use chrono::{Duration, Utc};
use clap::ValueEnum;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::{
    config::ServiceConfig,
    error::{Error, Result},
    types::{TokenRecord, TokenResponse},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Service {
    Spotify,
    #[value(name = "youtube")]
    YouTube,
}

impl Service {
    pub fn as_str(&self) -> &'static str {
        match self {
            Service::Spotify => "spotify",
            Service::YouTube => "youtube",
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Service::Spotify => write!(f, "Spotify"),
            Service::YouTube => write!(f, "YouTube"),
        }
    }
}

/// How the client proves its identity at the token endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientAuth {
    /// `Authorization: Basic base64(id:secret)`
    BasicHeader,
    /// `client_id` and `client_secret` form fields
    RequestBody,
}

#[derive(Debug, Clone, Copy)]
pub struct ProviderSettings {
    pub service: Service,
    pub scopes: &'static [&'static str],
    pub extra_auth_params: &'static [(&'static str, &'static str)],
    pub client_auth: ClientAuth,
    pub pkce: bool,
}

#[derive(Debug, Clone)]
pub struct OAuthClient {
    http: Client,
    settings: ProviderSettings,
    client_id: String,
    client_secret: String,
    auth_url: String,
    token_url: String,
    redirect_uri: String,
}

impl OAuthClient {
    pub fn new(http: Client, settings: ProviderSettings, config: &ServiceConfig) -> Self {
        OAuthClient {
            http,
            settings,
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            auth_url: config.auth_url.clone(),
            token_url: config.token_url.clone(),
            redirect_uri: config.redirect_uri.clone(),
        }
    }

    pub fn service(&self) -> Service {
        self.settings.service
    }

    pub fn uses_pkce(&self) -> bool {
        self.settings.pkce
    }

    /// Consent page URL the user has to visit to grant access.
    pub fn authorize_url(&self, state: &str, code_challenge: Option<&str>) -> Result<String> {
        let scope = self.settings.scopes.join(" ");
        let mut params: Vec<(&str, &str)> = vec![
            ("client_id", self.client_id.as_str()),
            ("response_type", "code"),
            ("redirect_uri", self.redirect_uri.as_str()),
            ("scope", scope.as_str()),
            ("state", state),
        ];
        params.extend_from_slice(self.settings.extra_auth_params);
        if let Some(challenge) = code_challenge {
            params.push(("code_challenge", challenge));
            params.push(("code_challenge_method", "S256"));
        }

        let url = Url::parse_with_params(&self.auth_url, &params).map_err(|e| {
            Error::Configuration(format!("invalid auth url '{}': {}", self.auth_url, e))
        })?;
        Ok(url.into())
    }

    /// Exchanges an authorization code for a fresh token record.
    pub async fn exchange_code(
        &self,
        code: &str,
        code_verifier: Option<&str>,
    ) -> Result<TokenRecord> {
        let mut params = vec![
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.redirect_uri.as_str()),
        ];
        if let Some(verifier) = code_verifier {
            params.push(("code_verifier", verifier));
        }

        let response = self.token_request(params).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(service = %self.service(), status = status.as_u16(), "Token exchange failed");
            return Err(Error::TokenExchangeFailed {
                status: status.as_u16(),
                body,
            });
        }

        let token: TokenResponse = response.json().await?;
        let mut record = TokenRecord::issued_at(
            Utc::now(),
            token.access_token,
            token.refresh_token,
            token.expires_in,
        );
        record.scope = token.scope;
        record.token_type = token.token_type;

        debug!(service = %self.service(), expires_at = %record.expires_at, "Exchanged authorization code");
        Ok(record)
    }

    /// Renews `record` with the refresh-token grant.
    ///
    /// Fails with [`Error::NoRefreshToken`] without touching the network when
    /// the record carries no refresh token. The old refresh token and scope are
    /// kept when the provider does not send new ones.
    pub async fn refresh(&self, record: &TokenRecord) -> Result<TokenRecord> {
        let Some(refresh_token) = record.refresh_token.as_deref() else {
            return Err(Error::NoRefreshToken);
        };

        let params = vec![
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ];
        let response = self.token_request(params).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(service = %self.service(), status = status.as_u16(), "Token refresh failed");
            return Err(Error::RefreshFailed {
                status: status.as_u16(),
                body,
            });
        }

        let token: TokenResponse = response.json().await?;
        let refreshed = TokenRecord {
            refresh_token: token
                .refresh_token
                .filter(|t| !t.is_empty())
                .or_else(|| record.refresh_token.clone()),
            scope: token.scope.or_else(|| record.scope.clone()),
            token_type: token.token_type.or_else(|| record.token_type.clone()),
            ..TokenRecord::issued_at(Utc::now(), token.access_token, None, token.expires_in)
        };

        debug!(service = %self.service(), expires_at = %refreshed.expires_at, "Refreshed access token");
        Ok(refreshed)
    }

    /// Returns `record` untouched while it is valid, a refreshed one otherwise.
    pub async fn ensure_fresh(&self, record: TokenRecord, margin: Duration) -> Result<TokenRecord> {
        if record.is_valid_at(Utc::now(), margin) {
            return Ok(record);
        }
        self.refresh(&record).await
    }

    fn token_request<'a>(&'a self, mut params: Vec<(&'a str, &'a str)>) -> RequestBuilder {
        let request = self.http.post(&self.token_url);
        match self.settings.client_auth {
            ClientAuth::BasicHeader => request
                .basic_auth(&self.client_id, Some(&self.client_secret))
                .form(&params),
            ClientAuth::RequestBody => {
                params.push(("client_id", self.client_id.as_str()));
                params.push(("client_secret", self.client_secret.as_str()));
                request.form(&params)
            }
        }
    }
}
