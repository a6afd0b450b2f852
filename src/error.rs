//! Error types.
//!
//! Remote failures are captured once as [`ApiError`] and then carried, not
//! re-classified, inside the engine errors together with the page, playlist
//! or track they happened on.

use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

/// A failed call against the Spotify Web API.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} responded with {status}: {message}")]
    Status {
        url: String,
        status: StatusCode,
        message: String,
    },

    #[error("unexpected response body from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("no usable access token: {0}")]
    Token(String),
}

impl ApiError {
    /// Whether the failure is page-local and worth another attempt.
    ///
    /// Network failures, rate limiting and server errors are transient.
    /// Authorization failures, other client errors and malformed bodies are
    /// not going to change on retry.
    pub fn is_transient(&self) -> bool {
        match self {
            ApiError::Transport { .. } => true,
            ApiError::Status { status, .. } => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            ApiError::Decode { .. } | ApiError::Token(_) => false,
        }
    }
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("cannot access snapshot {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("snapshot {path} is not valid: {source}")]
    Serde {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("no snapshot found in {0}")]
    NotFound(PathBuf),
}

/// Ingestion stopped before the last page.
///
/// `saved` is the number of tracks written to the partial snapshot before the
/// error was returned.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("fetching page {page} failed, {saved} tracks saved: {source}")]
    Fatal {
        page: usize,
        saved: usize,
        #[source]
        source: ApiError,
    },

    #[error("page {page} failed {attempts} times in a row, {saved} tracks saved: {source}")]
    RetriesExhausted {
        page: usize,
        attempts: u32,
        saved: usize,
        #[source]
        source: ApiError,
    },

    #[error(transparent)]
    Store(#[from] SnapshotError),
}

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("listing playlists failed: {0}")]
    ListPlaylists(#[source] ApiError),

    #[error("creating playlist \"{name}\" failed: {source}")]
    CreatePlaylist {
        name: String,
        #[source]
        source: ApiError,
    },

    #[error("adding track {track_id} to playlist {playlist_id} failed after {appended} tracks: {source}")]
    AppendTrack {
        playlist_id: String,
        track_id: String,
        appended: usize,
        #[source]
        source: ApiError,
    },
}

#[derive(Debug, Error)]
pub enum MonthKeyError {
    #[error("month must be between 1 and 12, got \"{0}\"")]
    Month(String),

    #[error("year must have four digits, got \"{0}\"")]
    Year(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("cannot create {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot read .env file: {0}")]
    Dotenv(String),

    #[error("invalid server address \"{address}\": {source}")]
    InvalidAddress {
        address: String,
        #[source]
        source: std::net::AddrParseError,
    },
}
