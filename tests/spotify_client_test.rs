use reqwest::Client;
use serde_json::json;
use spyt::{error::Error, spotify::SpotifyClient};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{header, method, path, query_param},
};

fn playlist_json(id: &str, name: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": name,
        "images": [{ "url": format!("https://i.scdn.co/{id}.jpg") }],
        "owner": { "display_name": "Alice" },
        "tracks": { "total": 12 },
        "external_urls": { "spotify": format!("https://open.spotify.com/playlist/{id}") }
    })
}

fn track_json(name: &str, artists: &[&str], isrc: Option<&str>) -> serde_json::Value {
    json!({
        "track": {
            "name": name,
            "artists": artists.iter().map(|a| json!({ "name": a })).collect::<Vec<_>>(),
            "album": { "name": "Album" },
            "external_ids": { "isrc": isrc },
        }
    })
}

async fn client(server: &MockServer) -> SpotifyClient {
    SpotifyClient::new(Client::new(), &server.uri())
}

#[tokio::test]
async fn test_list_playlists_maps_items() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/me/playlists"))
        .and(query_param("limit", "20"))
        .and(query_param("offset", "40"))
        .and(header("authorization", "Bearer sp-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                playlist_json("p1", "Road Trip"),
                { "id": "p2", "name": "Bare" }
            ],
            "total": 42,
            "limit": 20,
            "offset": 40
        })))
        .expect(1)
        .mount(&server)
        .await;

    let page = client(&server)
        .await
        .list_playlists("sp-token", 20, 40)
        .await
        .unwrap();

    assert_eq!(page.total, 42);
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[0].owner_name, "Alice");
    assert_eq!(page.items[0].track_count, 12);
    assert_eq!(
        page.items[0].image_url.as_deref(),
        Some("https://i.scdn.co/p1.jpg")
    );
    assert_eq!(page.items[1].owner_name, "Unknown");
    assert_eq!(page.items[1].track_count, 0);
    assert_eq!(
        page.items[1].spotify_url,
        "https://open.spotify.com/playlist/p2"
    );
}

#[tokio::test]
async fn test_list_playlists_clamps_paging() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/me/playlists"))
        .and(query_param("limit", "50"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [], "total": 0, "limit": 50, "offset": 0
        })))
        .expect(1)
        .mount(&server)
        .await;

    let page = client(&server)
        .await
        .list_playlists("t", 500, -3)
        .await
        .unwrap();
    assert!(page.items.is_empty());
}

#[tokio::test]
async fn test_rate_limit_carries_retry_after() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/me/playlists"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "7"))
        .mount(&server)
        .await;

    let err = client(&server)
        .await
        .list_playlists("t", 50, 0)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::RateLimited {
            retry_after_secs: 7
        }
    ));
}

#[tokio::test]
async fn test_rate_limit_without_header_defaults_to_one_second() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/me/playlists"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let err = client(&server)
        .await
        .list_playlists("t", 50, 0)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::RateLimited {
            retry_after_secs: 1
        }
    ));
}

#[tokio::test]
async fn test_other_failures_keep_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/me/playlists"))
        .respond_with(ResponseTemplate::new(401).set_body_string("The access token expired"))
        .mount(&server)
        .await;

    let err = client(&server)
        .await
        .list_playlists("t", 50, 0)
        .await
        .unwrap_err();
    match err {
        Error::Upstream { status, body } => {
            assert_eq!(status, 401);
            assert_eq!(body, "The access token expired");
        }
        other => panic!("Expected Upstream error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_list_all_playlists_walks_pages() {
    let server = MockServer::start().await;
    let first: Vec<_> = (0..50)
        .map(|i| playlist_json(&format!("p{i}"), "x"))
        .collect();
    Mock::given(method("GET"))
        .and(path("/me/playlists"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": first, "total": 52, "limit": 50, "offset": 0
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/me/playlists"))
        .and(query_param("offset", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [playlist_json("p50", "x"), playlist_json("p51", "x")],
            "total": 52, "limit": 50, "offset": 50
        })))
        .expect(1)
        .mount(&server)
        .await;

    let playlists = client(&server)
        .await
        .list_all_playlists("t")
        .await
        .unwrap();

    assert_eq!(playlists.len(), 52);
    assert_eq!(playlists[51].id, "p51");
}

#[tokio::test]
async fn test_list_playlist_tracks_follows_next_and_skips_null_tracks() {
    let server = MockServer::start().await;
    let next = format!("{}/playlists/p1/tracks?offset=100&limit=100", server.uri());
    Mock::given(method("GET"))
        .and(path("/playlists/p1/tracks"))
        .and(query_param("offset", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [track_json("Third", &["C"], None)],
            "next": null
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/playlists/p1/tracks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                track_json("First", &["A", "B"], Some("USRC17607839")),
                { "track": null },
                track_json("Second", &["B"], None)
            ],
            "next": next
        })))
        .expect(1)
        .mount(&server)
        .await;

    let tracks = client(&server)
        .await
        .list_playlist_tracks("t", "p1")
        .await
        .unwrap();

    let names: Vec<&str> = tracks.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["First", "Second", "Third"]);
    assert_eq!(tracks[0].artists, vec!["A", "B"]);
    assert_eq!(tracks[0].isrc.as_deref(), Some("USRC17607839"));
    assert_eq!(tracks[1].isrc, None);
}

#[tokio::test]
async fn test_playlist_id_is_encoded_as_one_path_segment() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/playlists/a%2Fb%20c/tracks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [track_json("Only", &["A"], None)],
            "next": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let tracks = client(&server)
        .await
        .list_playlist_tracks("t", "a/b c")
        .await
        .unwrap();

    assert_eq!(tracks.len(), 1);
}
