use axum::{extract::State, response::Json};
use serde_json::{Value, json};

use crate::{oauth::Service, server::AppState};

/// GET /health
///
/// Also reports which services currently have a session, so a frontend can
/// decide which sign-in buttons to show.
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "connected": {
            "spotify": state.has_session(Service::Spotify),
            "youtube": state.has_session(Service::YouTube),
        }
    }))
}
