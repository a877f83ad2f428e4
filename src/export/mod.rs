//! Playlist export.
//!
//! [`Exporter`] copies Spotify playlists to YouTube: for each requested id it
//! fetches the tracks, creates a private YouTube playlist and adds the best
//! matching video for every track. A track that cannot be matched or added is
//! counted as failed without stopping the playlist, and a playlist that fails
//! as a whole is reported without stopping the batch.
//!
//! Calls to YouTube go through a [`Throttle`] so a large export stays within
//! the quota, and a rate-limited call is retried after the delay YouTube asks
//! for.
//!
//! Exports are not idempotent. Running the same request twice creates two
//! YouTube playlists.

mod report;
mod service;
mod throttle;

use std::{num::NonZeroU32, time::Duration};

use tracing::{debug, info, warn};

pub use report::{ExportResult, PlaylistReport};
pub use service::{DestinationService, SourceService};
#[cfg(test)]
pub use service::{MockDestinationService, MockSourceService};
pub use throttle::Throttle;

use crate::{
    error::{Error, Result},
    management::TokenManager,
    types::{PlaylistSummary, Track},
    utils,
};

const DEFAULT_REQUESTS_PER_SECOND: NonZeroU32 = NonZeroU32::new(10).unwrap();

/// Tunables of an export run.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Upper bound on YouTube calls per second.
    pub requests_per_second: NonZeroU32,
    /// How many failed tracks are described per playlist.
    pub failure_sample_limit: usize,
    /// Retries of a single rate-limited call before the track is given up.
    pub max_rate_limit_retries: u32,
    /// Longest wait honoured from a `Retry-After`.
    pub max_backoff: Duration,
}

impl Default for ExportOptions {
    fn default() -> Self {
        ExportOptions {
            requests_per_second: DEFAULT_REQUESTS_PER_SECOND,
            failure_sample_limit: 10,
            max_rate_limit_retries: 2,
            max_backoff: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExportRequest {
    pub playlist_ids: Vec<String>,
}

impl ExportRequest {
    pub fn new(playlist_ids: Vec<String>) -> Self {
        ExportRequest { playlist_ids }
    }
}

/// Observer of a running export. Every hook defaults to doing nothing.
pub trait ExportProgress: Send + Sync {
    fn playlist_started(&self, _index: usize, _total: usize, _name: &str, _tracks: usize) {}

    fn track_finished(&self, _track: &Track, _matched: bool) {}

    fn playlist_finished(&self, _result: &ExportResult) {}
}

pub struct NoProgress;

impl ExportProgress for NoProgress {}

pub struct Exporter<S, D> {
    source: S,
    destination: D,
    throttle: Throttle,
    failure_sample_limit: usize,
}

impl<S, D> Exporter<S, D>
where
    S: SourceService,
    D: DestinationService,
{
    pub fn new(source: S, destination: D, options: &ExportOptions) -> Self {
        Exporter {
            source,
            destination,
            throttle: Throttle::new(
                options.requests_per_second,
                options.max_rate_limit_retries,
                options.max_backoff,
            ),
            failure_sample_limit: options.failure_sample_limit,
        }
    }

    /// Exports the requested playlists in order and returns one result each.
    ///
    /// Fails as a whole when the run cannot start: no YouTube session, an
    /// empty or blank id list, or a failing Spotify playlist listing. A session
    /// that expires and cannot be refreshed aborts the run at any point with
    /// [`Error::Unauthenticated`]. Everything else is reported per playlist.
    pub async fn run(
        &self,
        request: &ExportRequest,
        source_tokens: &mut TokenManager,
        destination_tokens: Option<&mut TokenManager>,
        progress: &dyn ExportProgress,
    ) -> Result<Vec<ExportResult>> {
        let Some(destination_tokens) = destination_tokens else {
            return Err(Error::Unauthenticated(
                "No YouTube token. Please connect YouTube first.".to_string(),
            ));
        };
        if request.playlist_ids.is_empty() {
            return Err(Error::InvalidInput("No playlist IDs provided".to_string()));
        }
        if request.playlist_ids.iter().any(|id| id.trim().is_empty()) {
            return Err(Error::InvalidInput(
                "Playlist IDs must not be blank".to_string(),
            ));
        }

        // Surface an unusable YouTube session before any playlist is touched.
        fresh_token(destination_tokens).await?;

        let token = fresh_token(source_tokens).await?;
        let listing = self.source.playlists(&token).await?;
        debug!(
            available = listing.len(),
            requested = request.playlist_ids.len(),
            "Fetched Spotify playlist listing"
        );

        let total = request.playlist_ids.len();
        let mut results = Vec::with_capacity(total);
        for (index, playlist_id) in request.playlist_ids.iter().enumerate() {
            let result = match listing.iter().find(|p| &p.id == playlist_id) {
                None => {
                    warn!(playlist_id, "Playlist not found in Spotify listing");
                    ExportResult::not_found(playlist_id)
                }
                Some(playlist) => {
                    match self
                        .export_playlist(
                            playlist,
                            index,
                            total,
                            source_tokens,
                            destination_tokens,
                            progress,
                        )
                        .await
                    {
                        Ok(result) => result,
                        Err(e) if e.is_auth() => return Err(e),
                        Err(e) => {
                            warn!(playlist_id, error = %e, "Playlist export failed");
                            ExportResult::failed(playlist, e.to_string())
                        }
                    }
                }
            };
            progress.playlist_finished(&result);
            results.push(result);
        }

        Ok(results)
    }

    async fn export_playlist(
        &self,
        playlist: &PlaylistSummary,
        index: usize,
        total: usize,
        source_tokens: &mut TokenManager,
        destination_tokens: &mut TokenManager,
        progress: &dyn ExportProgress,
    ) -> Result<ExportResult> {
        let token = fresh_token(source_tokens).await?;
        let tracks = self.source.playlist_tracks(&token, &playlist.id).await?;
        progress.playlist_started(index, total, &playlist.name, tracks.len());

        let description = format!("Imported from Spotify - {} tracks", tracks.len());
        let token = fresh_token(destination_tokens).await?;
        let created = self
            .throttle
            .call(|| {
                self.destination
                    .create_playlist(&token, &playlist.name, &description)
            })
            .await?;
        info!(
            playlist = %playlist.name,
            youtube_id = %created.id,
            tracks = tracks.len(),
            "Created YouTube playlist"
        );

        let mut report = PlaylistReport::new(tracks.len(), self.failure_sample_limit);
        for track in &tracks {
            let matched = match self.export_track(track, &created.id, destination_tokens).await {
                Ok(matched) => matched,
                Err(e) if e.is_auth() => return Err(e),
                Err(e) => {
                    debug!(track = %track.name, error = %e, "Track export failed");
                    false
                }
            };
            if matched {
                report.added();
            } else {
                report.failed(track);
            }
            progress.track_finished(track, matched);
        }

        Ok(report.finish(playlist, &created))
    }

    /// Whether a video for `track` ended up in the playlist.
    async fn export_track(
        &self,
        track: &Track,
        playlist_id: &str,
        destination_tokens: &mut TokenManager,
    ) -> Result<bool> {
        let query = utils::search_query(track);
        let token = fresh_token(destination_tokens).await?;
        let video = self
            .throttle
            .call(|| {
                self.destination
                    .search_video(&token, &query, track.isrc.clone())
            })
            .await?;
        let Some(video) = video else {
            debug!(query, "No video found");
            return Ok(false);
        };

        let token = fresh_token(destination_tokens).await?;
        self.throttle
            .call(|| self.destination.add_video(&token, playlist_id, &video.id))
            .await?;
        Ok(true)
    }
}

/// Access token of `tokens`, with a failed refresh reported as a lost session.
async fn fresh_token(tokens: &mut TokenManager) -> Result<String> {
    tokens.access_token().await.map_err(|e| {
        if !e.is_auth() {
            return e;
        }
        let service = tokens.service();
        warn!(%service, error = %e, "Session can no longer be refreshed");
        Error::Unauthenticated(format!(
            "{service} session expired ({e}). Please run spyt auth {}",
            service.as_str()
        ))
    })
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use chrono::Utc;
    use reqwest::Client;

    use super::*;
    use crate::{
        config::ServiceConfig,
        spotify, youtube,
        types::{DestinationPlaylist, TokenRecord, VideoRef},
    };

    fn service_config() -> ServiceConfig {
        ServiceConfig {
            client_id: "id".into(),
            client_secret: "secret".into(),
            auth_url: "http://127.0.0.1:1/authorize".into(),
            token_url: "http://127.0.0.1:1/token".into(),
            api_url: "http://127.0.0.1:1".into(),
            redirect_uri: "http://127.0.0.1:8888/callback".into(),
        }
    }

    fn spotify_tokens() -> TokenManager {
        let record = TokenRecord::issued_at(Utc::now(), "sp-token".into(), None, 3600);
        TokenManager::new(
            record,
            spotify::auth::oauth_client(Client::new(), &service_config()),
        )
    }

    fn youtube_tokens() -> TokenManager {
        let record = TokenRecord::issued_at(Utc::now(), "yt-token".into(), None, 3600);
        TokenManager::new(
            record,
            youtube::auth::oauth_client(Client::new(), &service_config()),
        )
    }

    fn summary(id: &str, name: &str) -> PlaylistSummary {
        PlaylistSummary {
            id: id.into(),
            name: name.into(),
            image_url: None,
            owner_name: "me".into(),
            track_count: 0,
            spotify_url: format!("https://open.spotify.com/playlist/{id}"),
        }
    }

    fn track(name: &str, artist: &str) -> Track {
        Track {
            name: name.into(),
            artists: vec![artist.into()],
            album: "album".into(),
            isrc: None,
            spotify_url: None,
        }
    }

    fn options() -> ExportOptions {
        ExportOptions {
            requests_per_second: NonZeroU32::new(1000).unwrap(),
            ..ExportOptions::default()
        }
    }

    fn source_with(playlists: Vec<PlaylistSummary>, tracks: Vec<Track>) -> MockSourceService {
        let mut source = MockSourceService::new();
        source
            .expect_playlists()
            .returning(move |_| Ok(playlists.clone()));
        source
            .expect_playlist_tracks()
            .returning(move |_, _| Ok(tracks.clone()));
        source
    }

    fn created(id: &str) -> DestinationPlaylist {
        DestinationPlaylist {
            id: id.into(),
            title: "title".into(),
            description: String::new(),
        }
    }

    #[tokio::test]
    async fn test_exports_matched_and_unmatched_tracks() {
        let source = source_with(
            vec![summary("p1", "Road Trip")],
            vec![
                track("trackA", "artistA"),
                track("trackB", "artistB"),
                track("trackC", "artistC"),
            ],
        );
        let mut destination = MockDestinationService::new();
        destination
            .expect_create_playlist()
            .times(1)
            .returning(|_, title, description| {
                assert_eq!(title, "Road Trip");
                assert_eq!(description, "Imported from Spotify - 3 tracks");
                Ok(created("yt1"))
            });
        destination
            .expect_search_video()
            .times(3)
            .returning(|_, query, _| {
                if query.starts_with("trackC") {
                    Ok(None)
                } else {
                    Ok(Some(VideoRef {
                        id: format!("v-{query}"),
                        title: query.to_string(),
                    }))
                }
            });
        destination
            .expect_add_video()
            .times(2)
            .returning(|_, playlist_id, _| {
                assert_eq!(playlist_id, "yt1");
                Ok(())
            });

        let exporter = Exporter::new(source, destination, &options());
        let results = exporter
            .run(
                &ExportRequest::new(vec!["p1".into()]),
                &mut spotify_tokens(),
                Some(&mut youtube_tokens()),
                &NoProgress,
            )
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        let result = &results[0];
        assert!(result.success);
        assert_eq!(result.playlist_id, "p1");
        assert_eq!(result.youtube_playlist_id.as_deref(), Some("yt1"));
        assert_eq!(result.total_tracks, Some(3));
        assert_eq!(result.added_count, Some(2));
        assert_eq!(result.failed_count, Some(1));
        assert_eq!(
            result.failed_tracks,
            Some(vec!["trackC - artistC".to_string()])
        );
    }

    #[tokio::test]
    async fn test_unknown_playlist_is_reported_not_found() {
        let source = source_with(vec![summary("p1", "Road Trip")], vec![]);
        let mut destination = MockDestinationService::new();
        destination.expect_create_playlist().never();

        let exporter = Exporter::new(source, destination, &options());
        let results = exporter
            .run(
                &ExportRequest::new(vec!["p9".into()]),
                &mut spotify_tokens(),
                Some(&mut youtube_tokens()),
                &NoProgress,
            )
            .await
            .unwrap();

        assert_eq!(results, vec![ExportResult::not_found("p9")]);
    }

    #[tokio::test]
    async fn test_missing_destination_token_fails_before_anything_else() {
        let mut source = MockSourceService::new();
        source.expect_playlists().never();
        let destination = MockDestinationService::new();

        let exporter = Exporter::new(source, destination, &options());
        let result = exporter
            .run(
                &ExportRequest::new(vec![]),
                &mut spotify_tokens(),
                None,
                &NoProgress,
            )
            .await;

        assert!(matches!(result, Err(Error::Unauthenticated(_))));
    }

    #[tokio::test]
    async fn test_empty_request_is_rejected() {
        let mut source = MockSourceService::new();
        source.expect_playlists().never();
        let destination = MockDestinationService::new();

        let exporter = Exporter::new(source, destination, &options());
        let result = exporter
            .run(
                &ExportRequest::default(),
                &mut spotify_tokens(),
                Some(&mut youtube_tokens()),
                &NoProgress,
            )
            .await;

        match result {
            Err(Error::InvalidInput(msg)) => assert_eq!(msg, "No playlist IDs provided"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_listing_failure_is_fatal() {
        let mut source = MockSourceService::new();
        source.expect_playlists().returning(|_| {
            Err(Error::RateLimited {
                retry_after_secs: 7,
            })
        });
        let destination = MockDestinationService::new();

        let exporter = Exporter::new(source, destination, &options());
        let result = exporter
            .run(
                &ExportRequest::new(vec!["p1".into()]),
                &mut spotify_tokens(),
                Some(&mut youtube_tokens()),
                &NoProgress,
            )
            .await;

        assert!(matches!(
            result,
            Err(Error::RateLimited {
                retry_after_secs: 7
            })
        ));
    }

    #[tokio::test]
    async fn test_playlist_creation_failure_does_not_stop_batch() {
        let source = source_with(
            vec![summary("p1", "First"), summary("p2", "Second")],
            vec![track("song", "band")],
        );
        let mut destination = MockDestinationService::new();
        destination
            .expect_create_playlist()
            .times(2)
            .returning(|_, title, _| {
                if title == "First" {
                    Err(Error::Upstream {
                        status: 403,
                        body: "quotaExceeded".into(),
                    })
                } else {
                    Ok(created("yt2"))
                }
            });
        destination.expect_search_video().times(1).returning(|_, _, _| {
            Ok(Some(VideoRef {
                id: "v1".into(),
                title: "song".into(),
            }))
        });
        destination.expect_add_video().times(1).returning(|_, _, _| Ok(()));

        let exporter = Exporter::new(source, destination, &options());
        let results = exporter
            .run(
                &ExportRequest::new(vec!["p1".into(), "p2".into()]),
                &mut spotify_tokens(),
                Some(&mut youtube_tokens()),
                &NoProgress,
            )
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert!(!results[0].success);
        assert_eq!(results[0].playlist_name.as_deref(), Some("First"));
        assert!(results[0].error.as_deref().unwrap().contains("quotaExceeded"));
        assert!(results[1].success);
        assert_eq!(results[1].added_count, Some(1));
    }

    #[tokio::test]
    async fn test_failed_add_counts_as_failed_track() {
        let source = source_with(vec![summary("p1", "Mix")], vec![track("song", "band")]);
        let mut destination = MockDestinationService::new();
        destination
            .expect_create_playlist()
            .returning(|_, _, _| Ok(created("yt1")));
        destination.expect_search_video().returning(|_, _, _| {
            Ok(Some(VideoRef {
                id: "v1".into(),
                title: "song".into(),
            }))
        });
        destination.expect_add_video().returning(|_, _, _| {
            Err(Error::Upstream {
                status: 409,
                body: "conflict".into(),
            })
        });

        let exporter = Exporter::new(source, destination, &options());
        let results = exporter
            .run(
                &ExportRequest::new(vec!["p1".into()]),
                &mut spotify_tokens(),
                Some(&mut youtube_tokens()),
                &NoProgress,
            )
            .await
            .unwrap();

        assert!(results[0].success);
        assert_eq!(results[0].added_count, Some(0));
        assert_eq!(results[0].failed_count, Some(1));
        assert_eq!(
            results[0].failed_tracks,
            Some(vec!["song - band".to_string()])
        );
    }

    #[tokio::test]
    async fn test_isrc_is_passed_to_search() {
        let mut with_isrc = track("song", "band");
        with_isrc.isrc = Some("USRC17607839".into());
        let source = source_with(vec![summary("p1", "Mix")], vec![with_isrc]);
        let mut destination = MockDestinationService::new();
        destination
            .expect_create_playlist()
            .returning(|_, _, _| Ok(created("yt1")));
        destination
            .expect_search_video()
            .times(1)
            .returning(|_, query, isrc| {
                assert_eq!(query, "song band");
                assert_eq!(isrc.as_deref(), Some("USRC17607839"));
                Ok(None)
            });

        let exporter = Exporter::new(source, destination, &options());
        let results = exporter
            .run(
                &ExportRequest::new(vec!["p1".into()]),
                &mut spotify_tokens(),
                Some(&mut youtube_tokens()),
                &NoProgress,
            )
            .await
            .unwrap();

        assert_eq!(results[0].failed_count, Some(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limited_search_is_retried() {
        let source = source_with(vec![summary("p1", "Mix")], vec![track("song", "band")]);
        let searches = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&searches);
        let mut destination = MockDestinationService::new();
        destination
            .expect_create_playlist()
            .returning(|_, _, _| Ok(created("yt1")));
        destination
            .expect_search_video()
            .returning(move |_, _, _| {
                if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(Error::RateLimited {
                        retry_after_secs: 3,
                    })
                } else {
                    Ok(Some(VideoRef {
                        id: "v1".into(),
                        title: "song".into(),
                    }))
                }
            });
        destination.expect_add_video().times(1).returning(|_, _, _| Ok(()));

        let exporter = Exporter::new(source, destination, &options());
        let results = exporter
            .run(
                &ExportRequest::new(vec!["p1".into()]),
                &mut spotify_tokens(),
                Some(&mut youtube_tokens()),
                &NoProgress,
            )
            .await
            .unwrap();

        assert_eq!(searches.load(Ordering::SeqCst), 2);
        assert_eq!(results[0].added_count, Some(1));
    }

    #[tokio::test]
    async fn test_repeated_runs_create_new_playlists() {
        let source = source_with(vec![summary("p1", "Mix")], vec![]);
        let created_count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&created_count);
        let mut destination = MockDestinationService::new();
        destination
            .expect_create_playlist()
            .times(2)
            .returning(move |_, _, _| {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                Ok(created(&format!("yt{n}")))
            });

        let exporter = Exporter::new(source, destination, &options());
        let request = ExportRequest::new(vec!["p1".into()]);
        let mut spotify = spotify_tokens();
        let mut youtube = youtube_tokens();
        let first = exporter
            .run(&request, &mut spotify, Some(&mut youtube), &NoProgress)
            .await
            .unwrap();
        let second = exporter
            .run(&request, &mut spotify, Some(&mut youtube), &NoProgress)
            .await
            .unwrap();

        assert_ne!(first[0].youtube_playlist_id, second[0].youtube_playlist_id);
        assert_eq!(first[0].total_tracks, Some(0));
    }

    #[tokio::test]
    async fn test_expired_destination_session_fails_before_listing() {
        let mut source = MockSourceService::new();
        source.expect_playlists().never();
        let mut destination = MockDestinationService::new();
        destination.expect_create_playlist().never();
        let record = TokenRecord::issued_at(Utc::now(), "stale".into(), None, 0);
        let mut youtube = TokenManager::new(
            record,
            youtube::auth::oauth_client(Client::new(), &service_config()),
        );

        let exporter = Exporter::new(source, destination, &options());
        let result = exporter
            .run(
                &ExportRequest::new(vec!["p1".into()]),
                &mut spotify_tokens(),
                Some(&mut youtube),
                &NoProgress,
            )
            .await;

        match result {
            Err(Error::Unauthenticated(msg)) => assert!(msg.contains("spyt auth youtube")),
            other => panic!("Expected Unauthenticated, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_destination_session_lost_mid_run_aborts_export() {
        use wiremock::{
            Mock, MockServer, ResponseTemplate,
            matchers::{method, path},
        };

        // Each refresh yields an already expired token, so every call refreshes
        // again. The third refresh is rejected.
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "short-lived",
                "expires_in": 0
            })))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(400).set_body_string("invalid_grant"))
            .mount(&server)
            .await;

        let config = ServiceConfig {
            token_url: format!("{}/token", server.uri()),
            ..service_config()
        };
        let record = TokenRecord::issued_at(Utc::now(), "stale".into(), Some("r".into()), 0);
        let mut youtube = TokenManager::new(
            record,
            youtube::auth::oauth_client(Client::new(), &config),
        );

        let source = source_with(
            vec![summary("p1", "First"), summary("p2", "Second")],
            vec![track("song", "band"), track("other", "band")],
        );
        let mut destination = MockDestinationService::new();
        destination
            .expect_create_playlist()
            .times(1)
            .returning(|_, _, _| Ok(created("yt1")));
        destination.expect_search_video().never();
        destination.expect_add_video().never();

        let exporter = Exporter::new(source, destination, &options());
        let result = exporter
            .run(
                &ExportRequest::new(vec!["p1".into(), "p2".into()]),
                &mut spotify_tokens(),
                Some(&mut youtube),
                &NoProgress,
            )
            .await;

        match result {
            Err(Error::Unauthenticated(msg)) => assert!(msg.contains("invalid_grant")),
            other => panic!("Expected Unauthenticated, got {other:?}"),
        }
    }

    #[test]
    fn test_default_options() {
        let options = ExportOptions::default();
        assert_eq!(options.requests_per_second.get(), 10);
        assert_eq!(options.failure_sample_limit, 10);
        assert_eq!(options.max_rate_limit_retries, 2);
        assert_eq!(options.max_backoff, Duration::from_secs(60));
    }
}
