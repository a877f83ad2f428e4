use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

use crate::{
    error::{Error, Result},
    export::{ExportRequest, ExportResult, Exporter, NoProgress},
    management::TokenManager,
    oauth::Service,
    server::AppState,
    types::TokenRecord,
};

/// Lifetime assumed for a supplied YouTube token that comes without expiry.
const DEFAULT_SUPPLIED_TOKEN_SECS: i64 = 3600;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportBody {
    #[serde(default)]
    pub playlist_ids: Vec<String>,
    pub youtube_access_token: Option<String>,
    pub youtube_refresh_token: Option<String>,
    /// Unix milliseconds.
    pub youtube_expires_at: Option<i64>,
}

impl ExportBody {
    fn youtube_record(&self) -> Option<TokenRecord> {
        let access_token = self
            .youtube_access_token
            .clone()
            .filter(|t| !t.is_empty())?;
        let expires_at = self
            .youtube_expires_at
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .unwrap_or_else(|| Utc::now() + Duration::seconds(DEFAULT_SUPPLIED_TOKEN_SECS));

        Some(TokenRecord {
            access_token,
            refresh_token: self
                .youtube_refresh_token
                .clone()
                .filter(|t| !t.is_empty()),
            expires_at,
            scope: None,
            token_type: None,
        })
    }
}

/// POST /api/youtube/export
///
/// Works on copies of the cached sessions so other requests are served while
/// the export runs. Refreshed tokens are stored back afterwards.
pub async fn export(
    State(state): State<AppState>,
    body: std::result::Result<Json<ExportBody>, JsonRejection>,
) -> Result<Json<Vec<ExportResult>>> {
    let Json(body) = body.map_err(|rejection| {
        Error::InvalidInput(format!("Invalid export request: {}", rejection.body_text()))
    })?;

    let mut source_tokens = state
        .session_snapshot(Service::Spotify)
        .await
        .ok_or_else(|| Error::Unauthenticated("No Spotify token".to_string()))?;

    let supplied = body
        .youtube_record()
        .map(|record| TokenManager::new(record, state.oauth(Service::YouTube).clone()));
    let uses_cached_youtube = supplied.is_none();
    let mut destination_tokens = match supplied {
        Some(tokens) => Some(tokens),
        None => state.session_snapshot(Service::YouTube).await,
    };

    let exporter = Exporter::new(
        state.spotify.clone(),
        state.youtube.clone(),
        &state.config.export,
    );
    let request = ExportRequest::new(body.playlist_ids);
    let outcome = exporter
        .run(
            &request,
            &mut source_tokens,
            destination_tokens.as_mut(),
            &NoProgress,
        )
        .await;

    state.update_session(Service::Spotify, source_tokens).await;
    if let (true, Some(tokens)) = (uses_cached_youtube, destination_tokens) {
        state.update_session(Service::YouTube, tokens).await;
    }

    Ok(Json(outcome?))
}
