use reqwest::Client;

use crate::{
    config::ServiceConfig,
    oauth::{ClientAuth, OAuthClient, ProviderSettings, Service},
};

pub const SCOPES: [&str; 3] = [
    "playlist-read-private",
    "playlist-read-collaborative",
    "user-read-email",
];

/// Spotify sign-in: confidential client authenticating with HTTP Basic, the
/// consent dialog is always shown so switching accounts works.
pub const PROVIDER: ProviderSettings = ProviderSettings {
    service: Service::Spotify,
    scopes: &SCOPES,
    extra_auth_params: &[("show_dialog", "true")],
    client_auth: ClientAuth::BasicHeader,
    pkce: false,
};

pub fn oauth_client(http: Client, config: &ServiceConfig) -> OAuthClient {
    OAuthClient::new(http, PROVIDER, config)
}
