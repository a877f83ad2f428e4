use clap::ValueEnum;

use crate::{error, info, management::TokenManager, oauth::Service, success};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogoutTarget {
    Spotify,
    #[value(name = "youtube")]
    YouTube,
    All,
}

impl LogoutTarget {
    fn services(self) -> &'static [Service] {
        match self {
            LogoutTarget::Spotify => &[Service::Spotify],
            LogoutTarget::YouTube => &[Service::YouTube],
            LogoutTarget::All => &[Service::Spotify, Service::YouTube],
        }
    }
}

/// Forgets the cached sessions of `target`.
pub async fn logout(target: LogoutTarget) {
    for &service in target.services() {
        match TokenManager::clear(service).await {
            Ok(true) => success!("Disconnected {}", service),
            Ok(false) => info!("{} was not connected", service),
            Err(e) => error!("Failed to remove {} session. Err: {}", service, e),
        }
    }
}
