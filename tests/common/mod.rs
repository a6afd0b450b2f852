//! Shared helpers: an in-memory Spotify and fixture builders.
#![allow(dead_code)]

use std::{
    collections::{HashMap, VecDeque},
    path::Path,
    sync::Mutex,
};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use reqwest::StatusCode;

use likesync::{
    error::ApiError,
    spotify::SpotifyApi,
    sync::{MonthKey, ProgressObserver},
    types::{
        Cursor, ExternalUrls, Page, Playlist, PlaylistOwner, PlaylistRef, SavedTrack, Track,
        TrackArtist, TrackRecord,
    },
};

pub const USER_ID: &str = "user-1";

const PLAYLISTS_PER_PAGE: usize = 2;

#[derive(Default)]
struct State {
    saved_pages: Vec<Vec<SavedTrack>>,
    page_failures: HashMap<usize, VecDeque<ApiError>>,
    saved_requests: Vec<Option<String>>,
    playlists: Vec<Playlist>,
    created: Vec<PlaylistRef>,
    create_failure: Option<ApiError>,
    appended: Vec<(String, String)>,
    append_limit: Option<usize>,
}

/// In-memory [`SpotifyApi`] that records every call.
///
/// Saved track cursors are `page-<n>`. Playlists are served two per page.
/// Created playlists are remembered and show up in later listings.
pub struct FakeSpotify {
    state: Mutex<State>,
}

impl FakeSpotify {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
        }
    }

    pub fn with_saved_pages(self, pages: Vec<Vec<SavedTrack>>) -> Self {
        self.state.lock().unwrap().saved_pages = pages;
        self
    }

    /// Page `index` (0 based) answers with these errors, one per request,
    /// before it succeeds.
    pub fn fail_page(self, index: usize, errors: Vec<ApiError>) -> Self {
        self.state
            .lock()
            .unwrap()
            .page_failures
            .insert(index, errors.into());
        self
    }

    pub fn with_playlist(self, id: &str, name: &str, owner: &str) -> Self {
        self.state.lock().unwrap().playlists.push(Playlist {
            id: id.to_string(),
            name: name.to_string(),
            owner: PlaylistOwner {
                id: owner.to_string(),
            },
        });
        self
    }

    pub fn fail_create(self, error: ApiError) -> Self {
        self.state.lock().unwrap().create_failure = Some(error);
        self
    }

    /// Appends fail once `limit` tracks were appended successfully.
    pub fn fail_appends_after(self, limit: usize) -> Self {
        self.state.lock().unwrap().append_limit = Some(limit);
        self
    }

    pub fn saved_requests(&self) -> Vec<Option<String>> {
        self.state.lock().unwrap().saved_requests.clone()
    }

    pub fn created(&self) -> Vec<PlaylistRef> {
        self.state.lock().unwrap().created.clone()
    }

    pub fn appended(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().appended.clone()
    }
}

#[async_trait]
impl SpotifyApi for FakeSpotify {
    async fn list_saved_tracks(&self, cursor: Option<&Cursor>) -> Result<Page<SavedTrack>, ApiError> {
        let mut state = self.state.lock().unwrap();
        state
            .saved_requests
            .push(cursor.map(|c| c.as_str().to_string()));

        let index = match cursor {
            None => 0,
            Some(c) => c
                .as_str()
                .strip_prefix("page-")
                .and_then(|n| n.parse().ok())
                .expect("cursor handed out by the fake"),
        };

        if let Some(err) = state
            .page_failures
            .get_mut(&index)
            .and_then(|errors| errors.pop_front())
        {
            return Err(err);
        }

        let items = state.saved_pages.get(index).cloned().unwrap_or_default();
        let next = (index + 1 < state.saved_pages.len())
            .then(|| Cursor::new(format!("page-{}", index + 1)));
        Ok(Page { items, next })
    }

    async fn list_playlists(&self, cursor: Option<&Cursor>) -> Result<Page<Playlist>, ApiError> {
        let state = self.state.lock().unwrap();
        let start: usize = cursor
            .map(|c| c.as_str().parse().expect("offset cursor"))
            .unwrap_or(0);
        let end = (start + PLAYLISTS_PER_PAGE).min(state.playlists.len());
        let items = state.playlists[start..end].to_vec();
        let next = (end < state.playlists.len()).then(|| Cursor::new(end.to_string()));
        Ok(Page { items, next })
    }

    async fn create_playlist(
        &self,
        owner_id: &str,
        name: &str,
        public: bool,
    ) -> Result<PlaylistRef, ApiError> {
        assert!(!public, "monthly playlists are private");
        let mut state = self.state.lock().unwrap();
        if let Some(err) = state.create_failure.take() {
            return Err(err);
        }

        let playlist = PlaylistRef {
            id: format!("created-{}", state.created.len() + 1),
            name: name.to_string(),
        };
        state.playlists.push(Playlist {
            id: playlist.id.clone(),
            name: playlist.name.clone(),
            owner: PlaylistOwner {
                id: owner_id.to_string(),
            },
        });
        state.created.push(playlist.clone());
        Ok(playlist)
    }

    async fn append_track(&self, playlist_id: &str, track_id: &str) -> Result<(), ApiError> {
        let mut state = self.state.lock().unwrap();
        if state.append_limit == Some(state.appended.len()) {
            return Err(status_error(StatusCode::NOT_FOUND));
        }
        state
            .appended
            .push((playlist_id.to_string(), track_id.to_string()));
        Ok(())
    }

    async fn current_user_id(&self) -> Result<String, ApiError> {
        Ok(USER_ID.to_string())
    }
}

/// Observer collecting events as short strings.
#[derive(Default)]
pub struct RecordingProgress {
    events: Mutex<Vec<String>>,
}

impl RecordingProgress {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    fn push(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }
}

impl ProgressObserver for RecordingProgress {
    fn page_fetched(&self, page: usize, items: usize, total: usize) {
        self.push(format!("page {page} {items} {total}"));
    }

    fn page_failed(&self, page: usize, attempt: u32, _error: &ApiError) {
        self.push(format!("failed {page} {attempt}"));
    }

    fn snapshot_saved(&self, _path: &Path, tracks: usize) {
        self.push(format!("saved {tracks}"));
    }

    fn month_empty(&self, month: MonthKey) {
        self.push(format!("empty {month}"));
    }

    fn playlist_found(&self, playlist: &PlaylistRef) {
        self.push(format!("found {}", playlist.id));
    }

    fn playlist_missing(&self, name: &str) {
        self.push(format!("missing {name}"));
    }

    fn playlist_created(&self, playlist: &PlaylistRef) {
        self.push(format!("created {}", playlist.id));
    }

    fn track_appended(&self, position: usize, track: &TrackRecord) {
        self.push(format!("appended {position} {}", track.spotify_id));
    }
}

pub fn status_error(status: StatusCode) -> ApiError {
    ApiError::Status {
        url: "https://api.spotify.test/v1/me/tracks".to_string(),
        status,
        message: status.canonical_reason().unwrap_or_default().to_string(),
    }
}

pub fn transient() -> ApiError {
    status_error(StatusCode::BAD_GATEWAY)
}

pub fn fatal() -> ApiError {
    status_error(StatusCode::UNAUTHORIZED)
}

pub fn saved(id: &str, added_at: &str) -> SavedTrack {
    SavedTrack {
        added_at: DateTime::parse_from_rfc3339(added_at).unwrap(),
        track: Track {
            id: Some(id.to_string()),
            name: format!("Track {id}"),
            uri: format!("spotify:track:{id}"),
            artists: vec![
                TrackArtist {
                    name: format!("Artist {id}"),
                },
                TrackArtist {
                    name: "Featured".to_string(),
                },
            ],
            external_urls: ExternalUrls {
                spotify: Some(format!("https://open.spotify.com/track/{id}")),
            },
        },
    }
}

/// `count` saved tracks per page, ids `p<page>-t<n>`.
pub fn saved_pages(pages: usize, count: usize) -> Vec<Vec<SavedTrack>> {
    (0..pages)
        .map(|p| {
            (0..count)
                .map(|t| saved(&format!("p{p}-t{t}"), "2024-03-10T12:00:00Z"))
                .collect()
        })
        .collect()
}

/// Saved item Spotify returns without a track id.
pub fn unavailable(added_at: &str) -> SavedTrack {
    let mut item = saved("gone", added_at);
    item.track.id = None;
    item
}

pub fn record(id: &str, added_at: &str) -> TrackRecord {
    TrackRecord::from_saved(
        saved(id, added_at),
        NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
    )
    .unwrap()
}
