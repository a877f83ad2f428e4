use std::{path::PathBuf, time::Duration};

use indicatif::{ProgressBar, ProgressStyle};
use tabled::Table;

use crate::{
    error::Result,
    error, info,
    management::TokenManager,
    oauth::Service,
    server::AppState,
    success,
    types::{PlaylistSummary, PlaylistTableRow, SavedPlaylist},
};

#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    pub limit: i64,
    pub offset: i64,
    /// Follow every page instead of showing one.
    pub all: bool,
    pub json: bool,
    /// Write the listed playlists to this file.
    pub save: Option<PathBuf>,
    /// Only keep these playlist ids.
    pub ids: Vec<String>,
}

pub async fn playlists(state: &AppState, options: ListOptions) {
    let mut tokens = match TokenManager::load(state.oauth(Service::Spotify).clone()).await {
        Ok(tokens) => tokens,
        Err(e) => error!("{}", e),
    };

    let pb = spinner("Fetching Spotify playlists...");
    let fetched = fetch(state, &mut tokens, &options).await;
    pb.finish_and_clear();

    let (mut playlists, total) = match fetched {
        Ok(fetched) => fetched,
        Err(e) if e.is_auth() => error!("{}. Please run spyt auth spotify", e),
        Err(e) => error!("Failed to fetch playlists. Err: {}", e),
    };

    if !options.ids.is_empty() {
        playlists.retain(|p| options.ids.contains(&p.id));
    }

    if let Some(path) = &options.save {
        let saved: Vec<SavedPlaylist> = playlists.iter().map(SavedPlaylist::from).collect();
        match save(path, &saved).await {
            Ok(()) => success!("Saved {} playlists to {}", saved.len(), path.display()),
            Err(e) => error!("Failed to save playlists. Err: {}", e),
        }
    }

    if options.json {
        match serde_json::to_string_pretty(&playlists) {
            Ok(json) => println!("{}", json),
            Err(e) => error!("Failed to serialize playlists. Err: {}", e),
        }
        return;
    }

    let shown = playlists.len();
    let rows: Vec<PlaylistTableRow> = playlists.into_iter().map(PlaylistTableRow::from).collect();
    println!("{}", Table::new(rows));
    info!("Showing {} of {} playlists", shown, total);
}

async fn fetch(
    state: &AppState,
    tokens: &mut TokenManager,
    options: &ListOptions,
) -> Result<(Vec<PlaylistSummary>, u64)> {
    let token = tokens.access_token().await?;
    if options.all {
        let playlists = state.spotify.list_all_playlists(&token).await?;
        let total = playlists.len() as u64;
        return Ok((playlists, total));
    }

    let page = state
        .spotify
        .list_playlists(&token, options.limit, options.offset)
        .await?;
    Ok((page.items, page.total))
}

async fn save(path: &PathBuf, playlists: &[SavedPlaylist]) -> Result<()> {
    let json = serde_json::to_string_pretty(playlists)?;
    async_fs::write(path, json).await?;
    Ok(())
}

pub(crate) fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    pb
}
