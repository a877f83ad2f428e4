use serde::{Deserialize, Serialize};

use crate::{
    types::{DestinationPlaylist, PlaylistSummary, Track},
    utils::failure_note,
};

/// Outcome of exporting one requested playlist.
///
/// A successful result carries the counts; a failed one only the error. Fields
/// that do not apply are left out of the JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportResult {
    pub playlist_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub playlist_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub youtube_playlist_id: Option<String>,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_tracks: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed_tracks: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExportResult {
    pub fn not_found(playlist_id: &str) -> Self {
        Self::failure(playlist_id, None, "Playlist not found".to_string())
    }

    pub fn failed(playlist: &PlaylistSummary, error: String) -> Self {
        Self::failure(&playlist.id, Some(playlist.name.clone()), error)
    }

    fn failure(playlist_id: &str, playlist_name: Option<String>, error: String) -> Self {
        ExportResult {
            playlist_id: playlist_id.to_string(),
            playlist_name,
            youtube_playlist_id: None,
            success: false,
            total_tracks: None,
            added_count: None,
            failed_count: None,
            failed_tracks: None,
            error: Some(error),
        }
    }
}

/// Running tally for a playlist whose destination copy exists.
pub struct PlaylistReport {
    total: usize,
    added: usize,
    failed: usize,
    sample: Vec<String>,
    sample_limit: usize,
}

impl PlaylistReport {
    pub fn new(total: usize, sample_limit: usize) -> Self {
        PlaylistReport {
            total,
            added: 0,
            failed: 0,
            sample: Vec::new(),
            sample_limit,
        }
    }

    pub fn added(&mut self) {
        self.added += 1;
    }

    /// Counts a miss. Only the first `sample_limit` misses are described.
    pub fn failed(&mut self, track: &Track) {
        self.failed += 1;
        if self.sample.len() < self.sample_limit {
            self.sample.push(failure_note(track));
        }
    }

    pub fn finish(self, playlist: &PlaylistSummary, created: &DestinationPlaylist) -> ExportResult {
        ExportResult {
            playlist_id: playlist.id.clone(),
            playlist_name: Some(playlist.name.clone()),
            youtube_playlist_id: Some(created.id.clone()),
            success: true,
            total_tracks: Some(self.total),
            added_count: Some(self.added),
            failed_count: Some(self.failed),
            failed_tracks: Some(self.sample),
            error: None,
        }
    }
}
