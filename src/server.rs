use std::{collections::HashMap, net::SocketAddr, str::FromStr, sync::Arc, time::Duration};

use axum::{
    Router,
    routing::{get, post},
};
use reqwest::Client;
use tokio::{sync::Mutex, time::Instant};
use tracing::{debug, info};

use crate::{
    api,
    config::Config,
    error::{Error, Result},
    management::TokenManager,
    oauth::{OAuthClient, Service},
    spotify::{self, SpotifyClient},
    utils,
    youtube::{self, YouTubeClient},
};

/// How long a consent page stays redeemable.
pub const SIGN_IN_TIMEOUT: Duration = Duration::from_secs(120);

/// One signed-in service, shared between requests.
pub type Session = Arc<Mutex<Option<TokenManager>>>;

/// A consent page was handed out and its callback has not arrived yet.
#[derive(Debug, Clone)]
struct PendingAuth {
    service: Service,
    code_verifier: Option<String>,
    started: Instant,
}

impl PendingAuth {
    fn is_expired(&self) -> bool {
        self.started.elapsed() > SIGN_IN_TIMEOUT
    }
}

/// State shared by all handlers of the local server.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub spotify: SpotifyClient,
    pub youtube: YouTubeClient,
    spotify_oauth: OAuthClient,
    youtube_oauth: OAuthClient,
    spotify_session: Session,
    youtube_session: Session,
    pending: Arc<Mutex<HashMap<String, PendingAuth>>>,
    persist_sessions: bool,
}

impl AppState {
    pub fn new(config: Config, http: Client) -> Self {
        AppState {
            spotify: SpotifyClient::new(http.clone(), &config.spotify.api_url),
            youtube: YouTubeClient::new(http.clone(), &config.youtube.api_url),
            spotify_oauth: spotify::auth::oauth_client(http.clone(), &config.spotify),
            youtube_oauth: youtube::auth::oauth_client(http, &config.youtube),
            config: Arc::new(config),
            spotify_session: Arc::new(Mutex::new(None)),
            youtube_session: Arc::new(Mutex::new(None)),
            pending: Arc::new(Mutex::new(HashMap::new())),
            persist_sessions: false,
        }
    }

    /// Write sessions completed through the callbacks to the token cache.
    pub fn with_persisted_sessions(mut self) -> Self {
        self.persist_sessions = true;
        self
    }

    /// Picks up the sessions cached by earlier sign-ins.
    pub async fn load_cached_sessions(&self) {
        for service in [Service::Spotify, Service::YouTube] {
            match TokenManager::load(self.oauth(service).clone()).await {
                Ok(manager) => {
                    debug!(%service, "Loaded cached session");
                    *self.session(service).lock().await = Some(manager);
                }
                Err(e) => debug!(%service, error = %e, "No cached session"),
            }
        }
    }

    pub fn oauth(&self, service: Service) -> &OAuthClient {
        match service {
            Service::Spotify => &self.spotify_oauth,
            Service::YouTube => &self.youtube_oauth,
        }
    }

    pub fn session(&self, service: Service) -> &Session {
        match service {
            Service::Spotify => &self.spotify_session,
            Service::YouTube => &self.youtube_session,
        }
    }

    pub async fn set_session(&self, service: Service, manager: TokenManager) {
        *self.session(service).lock().await = Some(manager);
    }

    /// Whether `service` is signed in. Never waits: a session that is locked
    /// right now is in use and therefore counts as connected.
    pub fn has_session(&self, service: Service) -> bool {
        match self.session(service).try_lock() {
            Ok(session) => session.is_some(),
            Err(_) => true,
        }
    }

    /// A copy of the session of `service`. The lock is released right away so
    /// long running work does not block other requests.
    pub async fn session_snapshot(&self, service: Service) -> Option<TokenManager> {
        self.session(service).lock().await.clone()
    }

    /// Stores a copy taken with [`AppState::session_snapshot`] back, keeping any
    /// refresh that happened meanwhile. Does nothing when the session was
    /// dropped in the meantime.
    pub async fn update_session(&self, service: Service, manager: TokenManager) {
        if let Some(current) = self.session(service).lock().await.as_mut() {
            *current = manager;
        }
    }

    /// Registers a new sign-in attempt and returns the consent page URL.
    pub async fn begin_auth(&self, service: Service) -> Result<String> {
        let oauth = self.oauth(service);
        let state = utils::generate_state();
        let code_verifier = oauth.uses_pkce().then(utils::generate_code_verifier);
        let challenge = code_verifier
            .as_deref()
            .map(utils::generate_code_challenge);

        let url = oauth.authorize_url(&state, challenge.as_deref())?;
        let mut pending = self.pending.lock().await;
        pending.retain(|_, auth| !auth.is_expired());
        pending.insert(
            state,
            PendingAuth {
                service,
                code_verifier,
                started: Instant::now(),
            },
        );
        Ok(url)
    }

    /// Finishes the sign-in started under `state` and stores the session.
    pub async fn complete_auth(&self, service: Service, state: &str, code: &str) -> Result<()> {
        let pending = self
            .pending
            .lock()
            .await
            .remove(state)
            .filter(|p| p.service == service && !p.is_expired())
            .ok_or_else(|| Error::InvalidInput("State mismatch".to_string()))?;

        let oauth = self.oauth(service).clone();
        let record = oauth
            .exchange_code(code, pending.code_verifier.as_deref())
            .await?;

        let mut manager = TokenManager::new(record, oauth);
        if self.persist_sessions {
            manager = manager.with_cache(TokenManager::token_path(service));
            manager.persist().await?;
        }
        self.set_session(service, manager).await;

        info!(%service, "Signed in");
        Ok(())
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route("/api/spotify/playlists", get(api::playlists))
        .route("/api/youtube/export", post(api::export))
        .route("/api/spotify/auth", get(api::spotify_auth))
        .route("/api/youtube/auth", get(api::youtube_auth))
        .route("/callback/spotify", get(api::spotify_callback))
        .route("/callback/youtube", get(api::youtube_callback))
        .with_state(state)
}

pub async fn start_api_server(state: AppState) -> Result<()> {
    let addr = SocketAddr::from_str(&state.config.server_address).map_err(|e| {
        Error::Configuration(format!(
            "invalid server address '{}': {}",
            state.config.server_address, e
        ))
    })?;

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "Listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}
