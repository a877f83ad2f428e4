use crate::{
    error, info, oauth::Service,
    server::{AppState, start_api_server},
    warning,
};

/// Runs the HTTP server in the foreground with the cached sessions.
pub async fn serve(state: AppState) {
    state.load_cached_sessions().await;
    for service in [Service::Spotify, Service::YouTube] {
        if !state.has_session(service) {
            warning!(
                "{} is not connected. Visit {}/api/{}/auth to sign in",
                service,
                state.config.public_url,
                service.as_str()
            );
        }
    }

    info!("Serving on {}", state.config.public_url);
    if let Err(e) = start_api_server(state).await {
        error!("Server stopped. Err: {}", e);
    }
}
