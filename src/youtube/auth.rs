use reqwest::Client;

use crate::{
    config::ServiceConfig,
    oauth::{ClientAuth, OAuthClient, ProviderSettings, Service},
};

pub const SCOPES: [&str; 2] = [
    "https://www.googleapis.com/auth/youtube",
    "https://www.googleapis.com/auth/userinfo.email",
];

/// Google sign-in. `access_type=offline` plus `prompt=consent` make Google
/// hand out a refresh token on every consent, not only the first one.
pub const PROVIDER: ProviderSettings = ProviderSettings {
    service: Service::YouTube,
    scopes: &SCOPES,
    extra_auth_params: &[("access_type", "offline"), ("prompt", "consent")],
    client_auth: ClientAuth::RequestBody,
    pkce: true,
};

pub fn oauth_client(http: Client, config: &ServiceConfig) -> OAuthClient {
    OAuthClient::new(http, PROVIDER, config)
}
