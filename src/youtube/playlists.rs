use tracing::debug;

use crate::{
    error::Result,
    types::{
        AddPlaylistItemRequest, CreatePlaylistRequest, CreatePlaylistResponse, DestinationPlaylist,
        PlaylistItemSnippet, ResourceId, SearchResponse, VideoRef, YouTubeSnippet, YouTubeStatus,
    },
    upstream::ensure_success,
    youtube::YouTubeClient,
};

/// YouTube category id of "Music".
const MUSIC_CATEGORY_ID: &str = "10";

impl YouTubeClient {
    /// Creates a private playlist owned by the signed-in user.
    pub async fn create_playlist(
        &self,
        token: &str,
        title: &str,
        description: &str,
    ) -> Result<DestinationPlaylist> {
        let body = CreatePlaylistRequest {
            snippet: YouTubeSnippet {
                title: title.to_string(),
                description: description.to_string(),
            },
            status: YouTubeStatus {
                privacy_status: "private".to_string(),
            },
        };

        let response = self
            .http
            .post(format!("{}/playlists", self.api_url))
            .query(&[("part", "snippet,status")])
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;
        let created: CreatePlaylistResponse = ensure_success(response).await?.json().await?;

        debug!(id = %created.id, title, "Created YouTube playlist");
        Ok(DestinationPlaylist {
            id: created.id,
            title: created.snippet.title,
            description: created.snippet.description,
        })
    }

    /// Finds the best candidate video for a track.
    ///
    /// With an ISRC the first attempt searches for the code itself; an empty or
    /// failed ISRC search falls back to the free-text `query`. Returns `None`
    /// when neither search yields a video.
    pub async fn search_video(
        &self,
        token: &str,
        query: &str,
        isrc: Option<&str>,
    ) -> Result<Option<VideoRef>> {
        if let Some(isrc) = isrc.filter(|code| !code.trim().is_empty()) {
            match self.search(token, isrc).await {
                Ok(Some(video)) => return Ok(Some(video)),
                Ok(None) => debug!(isrc, "No video for ISRC, falling back to text search"),
                Err(e) => debug!(isrc, error = %e, "ISRC search failed, falling back to text search"),
            }
        }

        self.search(token, query).await
    }

    pub async fn add_video_to_playlist(
        &self,
        token: &str,
        playlist_id: &str,
        video_id: &str,
    ) -> Result<()> {
        let body = AddPlaylistItemRequest {
            snippet: PlaylistItemSnippet {
                playlist_id: playlist_id.to_string(),
                resource_id: ResourceId {
                    kind: "youtube#video".to_string(),
                    video_id: video_id.to_string(),
                },
            },
        };

        let response = self
            .http
            .post(format!("{}/playlistItems", self.api_url))
            .query(&[("part", "snippet")])
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }

    async fn search(&self, token: &str, q: &str) -> Result<Option<VideoRef>> {
        let response = self
            .http
            .get(format!("{}/search", self.api_url))
            .query(&[
                ("part", "snippet"),
                ("q", q),
                ("type", "video"),
                ("videoCategoryId", MUSIC_CATEGORY_ID),
                ("maxResults", "1"),
            ])
            .bearer_auth(token)
            .send()
            .await?;
        let results: SearchResponse = ensure_success(response).await?.json().await?;

        Ok(results.items.into_iter().find_map(|item| {
            item.id.video_id.map(|id| VideoRef {
                id,
                title: item.snippet.title,
            })
        }))
    }
}
