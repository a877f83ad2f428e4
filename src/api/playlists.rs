use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;

use crate::{oauth::Service, server::AppState, utils::MAX_PLAYLIST_PAGE_SIZE};

#[derive(Debug, Deserialize)]
pub struct PlaylistQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// GET /api/spotify/playlists?limit&offset
pub async fn playlists(State(state): State<AppState>, Query(query): Query<PlaylistQuery>) -> Response {
    let mut session = state.session(Service::Spotify).lock().await;
    let Some(tokens) = session.as_mut() else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Unauthorized" })),
        )
            .into_response();
    };

    let token = match tokens.access_token().await {
        Ok(token) => token,
        Err(e) => return e.into_response(),
    };
    let limit = query.limit.unwrap_or(i64::from(MAX_PLAYLIST_PAGE_SIZE));
    let offset = query.offset.unwrap_or(0);

    match state.spotify.list_playlists(&token, limit, offset).await {
        Ok(page) => Json(page).into_response(),
        Err(e) => e.into_response(),
    }
}
