use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use tabled::Tabled;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub refresh_token: String,
    pub scope: String,
    pub expires_in: u64,
    pub obtained_at: u64,
}

#[derive(Debug, Clone)]
pub struct PkceToken {
    pub code_verifier: String,
    pub token: Option<Token>,
}

/// One saved track as captured by an ingestion run.
///
/// `added_at` keeps the offset it was received with, partitioning converts it
/// to the reference timezone on demand. `captured_on` is the day the record
/// was normalized and is never changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackRecord {
    pub added_at: DateTime<FixedOffset>,
    pub artist_name: String,
    pub track_name: String,
    pub spotify_id: String,
    pub external_url: String,
    pub uri: String,
    pub captured_on: NaiveDate,
}

impl TrackRecord {
    /// Normalizes a saved track item, keeping only the first credited artist.
    ///
    /// Items Spotify returns without a track id (unavailable or local files)
    /// cannot be added to a playlist and yield `None`.
    pub fn from_saved(item: SavedTrack, captured_on: NaiveDate) -> Option<Self> {
        let SavedTrack { added_at, track } = item;
        let spotify_id = track.id?;
        Some(Self {
            added_at,
            artist_name: track
                .artists
                .into_iter()
                .next()
                .map(|a| a.name)
                .unwrap_or_default(),
            track_name: track.name,
            spotify_id,
            external_url: track.external_urls.spotify.unwrap_or_default(),
            uri: track.uri,
            captured_on,
        })
    }
}

/// Ordered tracks of one ingestion run.
///
/// Serialized as a plain array of [`TrackRecord`]. Records are only ever
/// appended while a run is in progress; the same track saved twice across
/// runs ends up in both snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    tracks: Vec<TrackRecord>,
}

impl Snapshot {
    pub fn new(tracks: Vec<TrackRecord>) -> Self {
        Self { tracks }
    }

    pub fn push(&mut self, record: TrackRecord) {
        self.tracks.push(record);
    }

    pub fn tracks(&self) -> &[TrackRecord] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

/// A playlist owned by the current user, as far as reconciliation cares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistRef {
    pub id: String,
    pub name: String,
}

/// Opaque continuation token of a paginated listing.
///
/// For Spotify this is the absolute `next` URL of the previous page. It is
/// handed back to the adapter as is and never built from offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor(String);

impl Cursor {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One page of a paginated listing.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next: Option<Cursor>,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedTracksResponse {
    pub items: Vec<SavedTrack>,
    pub next: Option<String>,
    pub total: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedTrack {
    pub added_at: DateTime<FixedOffset>,
    pub track: Track,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    pub id: Option<String>,
    pub name: String,
    pub uri: String,
    #[serde(default)]
    pub artists: Vec<TrackArtist>,
    #[serde(default)]
    pub external_urls: ExternalUrls,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackArtist {
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExternalUrls {
    pub spotify: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetUserPlaylistsResponse {
    /// Spotify lists playlists it can no longer resolve as `null`.
    pub items: Vec<Option<Playlist>>,
    pub next: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    pub owner: PlaylistOwner,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistOwner {
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlaylistRequest {
    pub name: String,
    pub description: String,
    pub public: bool,
    pub collaborative: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlaylistResponse {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddTrackToPlaylistRequest {
    pub uris: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddTrackToPlaylistResponse {
    pub snapshot_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUserResponse {
    pub id: String,
    pub display_name: Option<String>,
}

#[derive(Tabled)]
pub struct MonthTableRow {
    pub month: String,
    pub playlist: String,
    pub tracks: usize,
}
