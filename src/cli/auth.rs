use std::time::{Duration, Instant};

use crate::{
    error, info,
    oauth::Service,
    server::{AppState, SIGN_IN_TIMEOUT, start_api_server},
    success, warning,
};

/// Signs in to `service` through the browser.
///
/// Starts the local server so the provider can redirect back to it, opens the
/// consent page and waits until the callback stored a session. The session is
/// written to the token cache, later commands pick it up from there.
pub async fn auth(state: AppState, service: Service) {
    let server_state = state.clone();
    tokio::spawn(async move {
        if let Err(e) = start_api_server(server_state).await {
            error!("Failed to start callback server: {}", e);
        }
    });

    let auth_url = match state.begin_auth(service).await {
        Ok(url) => url,
        Err(e) => error!("Cannot build {} sign-in URL. Err: {}", service, e),
    };

    info!("Opening the {} consent page in your browser...", service);
    if webbrowser::open(&auth_url).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            auth_url
        )
    }

    if wait_for_session(&state, service).await {
        success!("{} authentication successful!", service);
    } else {
        error!("{} authentication failed or timed out.", service);
    }
}

async fn wait_for_session(state: &AppState, service: Service) -> bool {
    let start = Instant::now();

    while start.elapsed() < SIGN_IN_TIMEOUT {
        if state.has_session(service) {
            return true;
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    false
}
