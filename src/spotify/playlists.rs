use tracing::debug;
use url::Url;

use crate::{
    error::{Error, Result},
    spotify::SpotifyClient,
    types::{
        PlaylistPage, PlaylistSummary, SpotifyPlaylistTracksResponse, SpotifyPlaylistsResponse,
        Track,
    },
    upstream::ensure_success,
    utils::{self, MAX_PLAYLIST_PAGE_SIZE},
};

const TRACKS_PAGE_SIZE: u32 = 100;

impl SpotifyClient {
    /// Retrieves one page of the current user's playlists.
    ///
    /// `limit` is clamped to `1..=50` and `offset` to `>= 0` before the request
    /// is sent, so out-of-range values coming from a query string never reach
    /// Spotify.
    ///
    /// # Errors
    ///
    /// - [`crate::error::Error::RateLimited`] when Spotify answers 429
    /// - [`crate::error::Error::Upstream`] for any other non-2xx status
    pub async fn list_playlists(&self, token: &str, limit: i64, offset: i64) -> Result<PlaylistPage> {
        let limit = utils::clamp_limit(limit);
        let offset = utils::clamp_offset(offset);

        let response = self
            .http
            .get(format!("{}/me/playlists", self.api_url))
            .query(&[("limit", limit), ("offset", offset)])
            .bearer_auth(token)
            .send()
            .await?;
        let page: SpotifyPlaylistsResponse = ensure_success(response).await?.json().await?;

        Ok(PlaylistPage {
            items: page.items.into_iter().map(PlaylistSummary::from).collect(),
            total: page.total,
            limit: page.limit,
            offset: page.offset,
        })
    }

    /// Walks every `limit`/`offset` page and returns all playlists of the user.
    pub async fn list_all_playlists(&self, token: &str) -> Result<Vec<PlaylistSummary>> {
        let mut playlists = Vec::new();
        let mut offset: u64 = 0;

        loop {
            let page = self
                .list_playlists(token, MAX_PLAYLIST_PAGE_SIZE as i64, offset as i64)
                .await?;
            let fetched = page.items.len() as u64;
            playlists.extend(page.items);
            offset += fetched;

            if fetched == 0 || offset >= page.total {
                break;
            }
        }

        debug!(count = playlists.len(), "Fetched playlist listing");
        Ok(playlists)
    }

    /// Reads the complete, ordered track list of a playlist.
    ///
    /// Follows the `next` link of every page until Spotify stops returning one
    /// and collects everything in memory. Items whose track is `null` (removed
    /// or unavailable tracks) are skipped.
    pub async fn list_playlist_tracks(&self, token: &str, playlist_id: &str) -> Result<Vec<Track>> {
        let mut tracks = Vec::new();
        let first = self
            .http
            .get(self.playlist_tracks_url(playlist_id)?)
            .query(&[("limit", TRACKS_PAGE_SIZE)]);
        let mut request = Some(first);

        while let Some(builder) = request.take() {
            let response = builder.bearer_auth(token).send().await?;
            let page: SpotifyPlaylistTracksResponse = ensure_success(response).await?.json().await?;

            tracks.extend(
                page.items
                    .into_iter()
                    .filter_map(|item| item.track)
                    .map(Track::from),
            );
            request = page.next.map(|next| self.http.get(next));
        }

        debug!(playlist_id, count = tracks.len(), "Fetched playlist tracks");
        Ok(tracks)
    }

    /// `{api}/playlists/{id}/tracks` with `id` percent-encoded as one segment.
    fn playlist_tracks_url(&self, playlist_id: &str) -> Result<Url> {
        let invalid = || Error::Configuration(format!("invalid Spotify API URL '{}'", self.api_url));
        let mut url = Url::parse(&self.api_url).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .extend(["playlists", playlist_id, "tracks"]);
        Ok(url)
    }
}
