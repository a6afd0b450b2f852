//! SpotifyClient against a wiremock server.

use chrono::Utc;
use reqwest::StatusCode;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use likesync::{
    error::ApiError,
    management::{SnapshotStore, TokenManager},
    spotify::{self, SpotifyApi, SpotifyClient},
    sync::{Ingestor, MonthKey, ReconcileOutcome, Reconciler, SilentProgress},
    types::{Cursor, Token},
};

fn client(server: &MockServer) -> SpotifyClient {
    let token = Token {
        access_token: "test-token".to_string(),
        refresh_token: "refresh".to_string(),
        scope: String::new(),
        expires_in: 3600,
        obtained_at: Utc::now().timestamp() as u64,
    };
    SpotifyClient::new(TokenManager::new(token), server.uri())
}

fn saved_item(id: &str, added_at: &str) -> serde_json::Value {
    json!({
        "added_at": added_at,
        "track": {
            "id": id,
            "name": format!("Track {id}"),
            "uri": format!("spotify:track:{id}"),
            "artists": [{ "name": "Main" }, { "name": "Guest" }],
            "external_urls": { "spotify": format!("https://open.spotify.com/track/{id}") },
            "popularity": 50
        }
    })
}

async fn mount_saved_tracks(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/me/tracks"))
        .and(query_param("limit", "20"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [saved_item("t1", "2024-03-01T10:00:00Z"), saved_item("t2", "2024-02-29T17:30:00Z")],
            "next": format!("{}/me/tracks?cursor=abc", server.uri()),
            "total": 3
        })))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/me/tracks"))
        .and(query_param("cursor", "abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [saved_item("t3", "2024-01-15T08:00:00Z")],
            "next": null,
            "total": 3
        })))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_saved_tracks_follow_next_url() {
    let server = MockServer::start().await;
    mount_saved_tracks(&server).await;
    let api = client(&server);

    let first = api.list_saved_tracks(None).await.unwrap();
    assert_eq!(first.items.len(), 2);
    assert_eq!(first.items[0].track.artists[0].name, "Main");
    let cursor = first.next.expect("second page");
    assert_eq!(cursor, Cursor::new(format!("{}/me/tracks?cursor=abc", server.uri())));

    let second = api.list_saved_tracks(Some(&cursor)).await.unwrap();
    assert_eq!(second.items[0].track.id.as_deref(), Some("t3"));
    assert!(!second.has_next());
}

#[tokio::test]
async fn test_ingest_over_http_keeps_offsets() {
    let server = MockServer::start().await;
    mount_saved_tracks(&server).await;
    let api = client(&server);
    let dir = TempDir::new().unwrap();
    let store = SnapshotStore::new(dir.path());

    let ingested = Ingestor::new(&api, &store, &SilentProgress)
        .ingest()
        .await
        .unwrap();

    assert_eq!(ingested.snapshot.len(), 3);
    let on_disk = SnapshotStore::load(&ingested.path).await.unwrap();
    assert_eq!(on_disk.tracks()[1].spotify_id, "t2");
    assert_eq!(on_disk.tracks()[1].artist_name, "Main");
    assert_eq!(
        MonthKey::of(&on_disk.tracks()[1].added_at),
        MonthKey::new(3, 2024).unwrap()
    );
}

#[tokio::test]
async fn test_error_status_carries_spotify_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/me/tracks"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": { "status": 401, "message": "The access token expired" }
        })))
        .mount(&server)
        .await;

    let err = client(&server).list_saved_tracks(None).await.unwrap_err();
    match &err {
        ApiError::Status {
            status, message, ..
        } => {
            assert_eq!(*status, StatusCode::UNAUTHORIZED);
            assert_eq!(message, "The access token expired");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!err.is_transient());
}

#[tokio::test]
async fn test_server_errors_and_rate_limits_are_transient() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/me/tracks"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/me/playlists"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let api = client(&server);
    let bad_gateway = api.list_saved_tracks(None).await.unwrap_err();
    assert!(bad_gateway.is_transient());
    assert!(matches!(
        bad_gateway,
        ApiError::Status { ref message, .. } if message == "Bad Gateway"
    ));
    assert!(api.list_playlists(None).await.unwrap_err().is_transient());
}

#[tokio::test]
async fn test_malformed_body_is_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/me/tracks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "unexpected": true })))
        .mount(&server)
        .await;

    let err = client(&server).list_saved_tracks(None).await.unwrap_err();
    assert!(matches!(err, ApiError::Decode { .. }));
    assert!(!err.is_transient());
}

#[tokio::test]
async fn test_saved_track_without_id_is_decoded_and_skipped() {
    let server = MockServer::start().await;
    let mut local_file = saved_item("ignored", "2024-03-05T09:00:00Z");
    local_file["track"]["id"] = serde_json::Value::Null;
    Mock::given(method("GET"))
        .and(path("/me/tracks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [saved_item("t1", "2024-03-01T10:00:00Z"), local_file],
            "next": null,
            "total": 2
        })))
        .mount(&server)
        .await;
    let api = client(&server);

    let page = api.list_saved_tracks(None).await.unwrap();
    assert_eq!(page.items.len(), 2);
    assert!(page.items[1].track.id.is_none());

    let dir = TempDir::new().unwrap();
    let store = SnapshotStore::new(dir.path());
    let ingested = Ingestor::new(&api, &store, &SilentProgress)
        .ingest()
        .await
        .unwrap();
    let ids: Vec<&str> = ingested
        .snapshot
        .tracks()
        .iter()
        .map(|t| t.spotify_id.as_str())
        .collect();
    assert_eq!(ids, vec!["t1"]);
}

#[tokio::test]
async fn test_null_playlist_entries_are_skipped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/me/playlists"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                { "id": "p1", "name": "March '24", "owner": { "id": "me" } },
                null
            ],
            "next": null
        })))
        .mount(&server)
        .await;

    let owned = spotify::owned_playlists(&client(&server), "me").await.unwrap();
    assert_eq!(owned.len(), 1);
    assert_eq!(owned[0].id, "p1");
}

#[tokio::test]
async fn test_owned_playlists_filters_by_owner_across_pages() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/me/playlists"))
        .and(query_param("limit", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                { "id": "p1", "name": "March '24", "owner": { "id": "me" } },
                { "id": "p2", "name": "Shared", "owner": { "id": "friend" } }
            ],
            "next": format!("{}/me/playlists?cursor=p2", server.uri())
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/me/playlists"))
        .and(query_param("cursor", "p2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{ "id": "p3", "name": "April '24", "owner": { "id": "me" } }],
            "next": null
        })))
        .mount(&server)
        .await;

    let owned = spotify::owned_playlists(&client(&server), "me").await.unwrap();
    let ids: Vec<&str> = owned.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["p1", "p3"]);
}

#[tokio::test]
async fn test_create_playlist_is_private() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/users/me/playlists"))
        .and(body_json(json!({
            "name": "March '24",
            "description": "",
            "public": false,
            "collaborative": false
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "new-id",
            "name": "March '24",
            "public": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    let playlist = client(&server)
        .create_playlist("me", "March '24", false)
        .await
        .unwrap();
    assert_eq!(playlist.id, "new-id");
    assert_eq!(playlist.name, "March '24");
}

#[tokio::test]
async fn test_append_track_sends_single_uri() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/playlists/pl-1/tracks"))
        .and(body_json(json!({ "uris": ["spotify:track:t1"] })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "snapshot_id": "s1" })))
        .expect(1)
        .mount(&server)
        .await;

    client(&server).append_track("pl-1", "t1").await.unwrap();
}

#[tokio::test]
async fn test_current_user_id() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "me",
            "display_name": "Me"
        })))
        .mount(&server)
        .await;

    assert_eq!(client(&server).current_user_id().await.unwrap(), "me");
}

#[tokio::test]
async fn test_reconcile_over_http_appends_one_track_per_call() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "me" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/me/playlists"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{ "id": "pl-mar", "name": "March '24", "owner": { "id": "me" } }],
            "next": null
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/playlists/pl-mar/tracks"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "snapshot_id": "s" })))
        .expect(2)
        .mount(&server)
        .await;

    mount_saved_tracks(&server).await;

    let api = client(&server);
    let dir = TempDir::new().unwrap();
    let store = SnapshotStore::new(dir.path());
    let ingested = Ingestor::new(&api, &store, &SilentProgress)
        .ingest()
        .await
        .unwrap();

    let outcome = Reconciler::new(&api, &SilentProgress)
        .run(MonthKey::new(3, 2024).unwrap(), &ingested.snapshot)
        .await
        .unwrap();
    assert!(matches!(
        outcome,
        ReconcileOutcome::Synced { created: false, appended: 2, .. }
    ));
}
