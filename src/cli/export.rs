use indicatif::{ProgressBar, ProgressStyle};
use tabled::Table;

use crate::{
    cli::playlists::spinner,
    error::Error,
    error,
    export::{ExportProgress, ExportRequest, ExportResult, Exporter},
    info,
    management::TokenManager,
    oauth::Service,
    server::AppState,
    success,
    types::{ExportTableRow, Track},
    warning,
};

const YOUTUBE_PLAYLIST_URL: &str = "https://www.youtube.com/playlist?list=";

/// Copies the given Spotify playlists (or all of them) to YouTube.
pub async fn export(state: &AppState, ids: Vec<String>, all: bool, json: bool) {
    let mut spotify = match TokenManager::load(state.oauth(Service::Spotify).clone()).await {
        Ok(tokens) => tokens,
        Err(e) => error!("{}", e),
    };
    let mut youtube = match TokenManager::load(state.oauth(Service::YouTube).clone()).await {
        Ok(tokens) => Some(tokens),
        Err(Error::Unauthenticated(_)) => None,
        Err(e) => {
            warning!("Cannot read YouTube session. Err: {}", e);
            None
        }
    };

    let playlist_ids = if all {
        all_playlist_ids(state, &mut spotify).await
    } else {
        ids
    };

    let exporter = Exporter::new(
        state.spotify.clone(),
        state.youtube.clone(),
        &state.config.export,
    );
    let progress = CliProgress::new();
    let outcome = exporter
        .run(
            &ExportRequest::new(playlist_ids),
            &mut spotify,
            youtube.as_mut(),
            &progress,
        )
        .await;

    let results = match outcome {
        Ok(results) => results,
        Err(Error::Unauthenticated(_)) if youtube.is_none() => {
            warning!("YouTube is not connected. Please run spyt auth youtube first.");
            std::process::exit(1);
        }
        Err(e) if e.is_auth() => error!("{}", e),
        Err(Error::RateLimited { retry_after_secs }) => error!(
            "Spotify is rate limiting requests. Please retry in {} seconds.",
            retry_after_secs
        ),
        Err(e) => error!("Export failed. Err: {}. Please try again.", e),
    };

    if json {
        match serde_json::to_string_pretty(&results) {
            Ok(out) => println!("{}", out),
            Err(e) => error!("Failed to serialize results. Err: {}", e),
        }
        return;
    }

    print_summary(&results);
}

async fn all_playlist_ids(state: &AppState, spotify: &mut TokenManager) -> Vec<String> {
    let pb = spinner("Fetching Spotify playlists...");
    let listing = match spotify.access_token().await {
        Ok(token) => state.spotify.list_all_playlists(&token).await,
        Err(e) => Err(e),
    };
    pb.finish_and_clear();

    match listing {
        Ok(playlists) => playlists.into_iter().map(|p| p.id).collect(),
        Err(e) => error!("Failed to fetch playlists. Err: {}", e),
    }
}

fn print_summary(results: &[ExportResult]) {
    let rows: Vec<ExportTableRow> = results.iter().map(summary_row).collect();
    println!("{}", Table::new(rows));

    for result in results.iter().filter(|r| r.success) {
        let Some(failed_tracks) = &result.failed_tracks else {
            continue;
        };
        if failed_tracks.is_empty() {
            continue;
        }
        let name = result.playlist_name.as_deref().unwrap_or(&result.playlist_id);
        warning!("Tracks without a match in {}:", name);
        for track in failed_tracks {
            println!("    {}", track);
        }
        let missing = result.failed_count.unwrap_or(0);
        if missing > failed_tracks.len() {
            println!("    ... and {} more", missing - failed_tracks.len());
        }
    }

    let succeeded = results.iter().filter(|r| r.success).count();
    if succeeded == results.len() {
        success!("Exported {} playlists", succeeded);
    } else {
        warning!("Exported {} of {} playlists", succeeded, results.len());
    }
}

fn summary_row(result: &ExportResult) -> ExportTableRow {
    let count = |n: Option<usize>| n.map(|n| n.to_string()).unwrap_or_default();

    ExportTableRow {
        playlist: result
            .playlist_name
            .clone()
            .unwrap_or_else(|| result.playlist_id.clone()),
        status: if result.success {
            "ok".to_string()
        } else {
            result.error.clone().unwrap_or_else(|| "failed".to_string())
        },
        added: count(result.added_count),
        failed: count(result.failed_count),
        youtube: result
            .youtube_playlist_id
            .as_ref()
            .map(|id| format!("{YOUTUBE_PLAYLIST_URL}{id}"))
            .unwrap_or_default(),
    }
}

/// Renders one progress bar per playlist.
struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let bar = ProgressBar::hidden();
        bar.set_style(
            ProgressStyle::with_template("{msg} [{bar:30.blue}] {pos}/{len}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> "),
        );
        CliProgress { bar }
    }
}

impl ExportProgress for CliProgress {
    fn playlist_started(&self, index: usize, total: usize, name: &str, tracks: usize) {
        info!("Exporting {} ({}/{}) with {} tracks", name, index + 1, total, tracks);
        self.bar.reset();
        self.bar.set_length(tracks as u64);
        self.bar.set_message(name.to_string());
        self.bar
            .set_draw_target(indicatif::ProgressDrawTarget::stderr());
    }

    fn track_finished(&self, _track: &Track, _matched: bool) {
        self.bar.inc(1);
    }

    fn playlist_finished(&self, result: &ExportResult) {
        self.bar.finish_and_clear();
        self.bar
            .set_draw_target(indicatif::ProgressDrawTarget::hidden());

        match (&result.error, result.added_count, result.total_tracks) {
            (None, Some(added), Some(total)) => success!(
                "{}: added {} of {} tracks",
                result.playlist_name.as_deref().unwrap_or(&result.playlist_id),
                added,
                total
            ),
            (Some(error), _, _) => warning!(
                "{}: {}",
                result.playlist_name.as_deref().unwrap_or(&result.playlist_id),
                error
            ),
            _ => {}
        }
    }
}
