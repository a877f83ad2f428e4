use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// Seconds shaved off every upstream `expires_in` so a token is never sent
/// right at its expiry.
pub const TOKEN_SAFETY_WINDOW_SECS: i64 = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenRecord {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
}

impl TokenRecord {
    /// A record expiring `expires_in` seconds after `now`, minus the safety window.
    pub fn issued_at(
        now: DateTime<Utc>,
        access_token: String,
        refresh_token: Option<String>,
        expires_in: i64,
    ) -> Self {
        TokenRecord {
            access_token,
            refresh_token: refresh_token.filter(|t| !t.is_empty()),
            expires_at: now + Duration::seconds(expires_in - TOKEN_SAFETY_WINDOW_SECS),
            scope: None,
            token_type: None,
        }
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>, margin: Duration) -> bool {
        now < self.expires_at - margin
    }
}

/// Body of a successful OAuth token endpoint response.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    pub expires_in: i64,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistSummary {
    pub id: String,
    pub name: String,
    pub image_url: Option<String>,
    pub owner_name: String,
    pub track_count: u64,
    pub spotify_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistPage {
    pub items: Vec<PlaylistSummary>,
    pub total: u64,
    pub limit: u32,
    pub offset: u32,
}

#[derive(Tabled)]
pub struct PlaylistTableRow {
    pub id: String,
    pub name: String,
    pub owner: String,
    pub tracks: u64,
}

impl From<PlaylistSummary> for PlaylistTableRow {
    fn from(p: PlaylistSummary) -> Self {
        PlaylistTableRow {
            id: p.id,
            name: p.name,
            owner: p.owner_name,
            tracks: p.track_count,
        }
    }
}

/// One line of the summary printed after `spyt export`.
#[derive(Tabled)]
pub struct ExportTableRow {
    pub playlist: String,
    pub status: String,
    pub added: String,
    pub failed: String,
    pub youtube: String,
}

/// Entry of the JSON file written by `playlists --save`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedPlaylist {
    pub id: String,
    pub name: String,
    pub url: String,
    pub owner: String,
    pub track_count: u64,
}

impl From<&PlaylistSummary> for SavedPlaylist {
    fn from(p: &PlaylistSummary) -> Self {
        SavedPlaylist {
            id: p.id.clone(),
            name: p.name.clone(),
            url: p.spotify_url.clone(),
            owner: p.owner_name.clone(),
            track_count: p.track_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub name: String,
    pub artists: Vec<String>,
    pub album: String,
    pub isrc: Option<String>,
    pub spotify_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DestinationPlaylist {
    pub id: String,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoRef {
    pub id: String,
    pub title: String,
}

// Spotify wire types

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyPlaylistsResponse {
    pub items: Vec<SpotifyPlaylistObject>,
    pub total: u64,
    pub limit: u32,
    pub offset: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyPlaylistObject {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub images: Option<Vec<SpotifyImage>>,
    #[serde(default)]
    pub owner: Option<SpotifyOwner>,
    #[serde(default)]
    pub tracks: Option<SpotifyTracksRef>,
    #[serde(default)]
    pub external_urls: Option<SpotifyExternalUrls>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyImage {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyOwner {
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyTracksRef {
    pub total: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyExternalUrls {
    pub spotify: Option<String>,
}

impl From<SpotifyPlaylistObject> for PlaylistSummary {
    fn from(p: SpotifyPlaylistObject) -> Self {
        let image_url = p
            .images
            .and_then(|images| images.into_iter().next())
            .map(|image| image.url);
        let spotify_url = p
            .external_urls
            .and_then(|urls| urls.spotify)
            .unwrap_or_else(|| format!("https://open.spotify.com/playlist/{}", p.id));

        PlaylistSummary {
            image_url,
            owner_name: p
                .owner
                .and_then(|o| o.display_name)
                .unwrap_or_else(|| "Unknown".to_string()),
            track_count: p.tracks.map_or(0, |t| t.total),
            spotify_url,
            id: p.id,
            name: p.name,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyPlaylistTracksResponse {
    pub items: Vec<SpotifyPlaylistItem>,
    pub next: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyPlaylistItem {
    pub track: Option<SpotifyTrackObject>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyTrackObject {
    pub name: String,
    #[serde(default)]
    pub artists: Vec<SpotifyArtistObject>,
    #[serde(default)]
    pub album: Option<SpotifyAlbumObject>,
    #[serde(default)]
    pub external_ids: Option<SpotifyExternalIds>,
    #[serde(default)]
    pub external_urls: Option<SpotifyExternalUrls>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyArtistObject {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyAlbumObject {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyExternalIds {
    pub isrc: Option<String>,
}

impl From<SpotifyTrackObject> for Track {
    fn from(t: SpotifyTrackObject) -> Self {
        Track {
            name: t.name,
            artists: t.artists.into_iter().map(|a| a.name).collect(),
            album: t.album.map(|a| a.name).unwrap_or_default(),
            isrc: t.external_ids.and_then(|ids| ids.isrc),
            spotify_url: t.external_urls.and_then(|urls| urls.spotify),
        }
    }
}

// YouTube wire types

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YouTubeSnippet {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YouTubeStatus {
    pub privacy_status: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreatePlaylistRequest {
    pub snippet: YouTubeSnippet,
    pub status: YouTubeStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePlaylistResponse {
    pub id: String,
    pub snippet: YouTubeSnippet,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub items: Vec<SearchItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchItem {
    pub id: SearchItemId,
    pub snippet: YouTubeSnippet,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchItemId {
    pub video_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceId {
    pub kind: String,
    pub video_id: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItemSnippet {
    pub playlist_id: String,
    pub resource_id: ResourceId,
}

#[derive(Debug, Clone, Serialize)]
pub struct AddPlaylistItemRequest {
    pub snippet: PlaylistItemSnippet,
}
