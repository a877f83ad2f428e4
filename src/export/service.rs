use async_trait::async_trait;

use crate::{
    error::Result,
    spotify::SpotifyClient,
    types::{DestinationPlaylist, PlaylistSummary, Track, VideoRef},
    youtube::YouTubeClient,
};

/// Where playlists are read from.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SourceService: Send + Sync {
    /// Every playlist of the signed-in user.
    async fn playlists(&self, token: &str) -> Result<Vec<PlaylistSummary>>;

    /// Complete, ordered track list of one playlist.
    async fn playlist_tracks(&self, token: &str, playlist_id: &str) -> Result<Vec<Track>>;
}

/// Where playlists are re-created.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DestinationService: Send + Sync {
    async fn create_playlist(
        &self,
        token: &str,
        title: &str,
        description: &str,
    ) -> Result<DestinationPlaylist>;

    /// Best candidate for a track, preferring the ISRC when there is one.
    async fn search_video(
        &self,
        token: &str,
        query: &str,
        isrc: Option<String>,
    ) -> Result<Option<VideoRef>>;

    async fn add_video(&self, token: &str, playlist_id: &str, video_id: &str) -> Result<()>;
}

#[async_trait]
impl SourceService for SpotifyClient {
    async fn playlists(&self, token: &str) -> Result<Vec<PlaylistSummary>> {
        self.list_all_playlists(token).await
    }

    async fn playlist_tracks(&self, token: &str, playlist_id: &str) -> Result<Vec<Track>> {
        self.list_playlist_tracks(token, playlist_id).await
    }
}

#[async_trait]
impl DestinationService for YouTubeClient {
    async fn create_playlist(
        &self,
        token: &str,
        title: &str,
        description: &str,
    ) -> Result<DestinationPlaylist> {
        YouTubeClient::create_playlist(self, token, title, description).await
    }

    async fn search_video(
        &self,
        token: &str,
        query: &str,
        isrc: Option<String>,
    ) -> Result<Option<VideoRef>> {
        YouTubeClient::search_video(self, token, query, isrc.as_deref()).await
    }

    async fn add_video(&self, token: &str, playlist_id: &str, video_id: &str) -> Result<()> {
        self.add_video_to_playlist(token, playlist_id, video_id).await
    }
}
