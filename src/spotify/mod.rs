//! # Spotify Integration Module
//!
//! This module is the only place that talks to the Spotify Web API. Everything
//! the sync engines need from the remote side goes through the [`SpotifyApi`]
//! trait, so the engines can run against [`SpotifyClient`] in production and
//! against an in-memory fake in tests.
//!
//! ## Architecture
//!
//! ```text
//! CLI Layer
//!          ↓
//! Sync Engines (ingest, partition, reconcile)
//!          ↓
//! SpotifyApi trait
//!     ├── SpotifyClient (reqwest, JSON)
//!     └── auth (OAuth 2.0 PKCE, token exchange)
//!          ↓
//! Spotify Web API
//! ```
//!
//! ## API Coverage
//!
//! - `GET /me` - Current user id
//! - `GET /me/tracks` - Saved tracks, 20 per page
//! - `GET /me/playlists` - User's playlists, 50 per page
//! - `POST /users/{user_id}/playlists` - Create private playlists
//! - `POST /playlists/{playlist_id}/tracks` - Append tracks
//! - `POST /api/token` - Token exchange and refresh operations
//!
//! ## Pagination
//!
//! Listings return a [`Page`] whose `next` is Spotify's absolute `next` URL
//! wrapped in an opaque [`Cursor`]. Callers hand the cursor back unchanged to
//! get the following page.
//!
//! ## Error Types
//!
//! All remote calls return [`ApiError`]; [`ApiError::is_transient`] tells
//! page-local hiccups apart from failures that will not go away on retry.

pub mod auth;
mod client;

use async_trait::async_trait;

pub use client::{PLAYLISTS_PAGE_SIZE, SAVED_TRACKS_PAGE_SIZE, SpotifyClient};

use crate::{
    error::ApiError,
    types::{Cursor, Page, Playlist, PlaylistRef, SavedTrack},
};

/// Remote capabilities the sync engines rely on.
///
/// Implementations must not retry on their own; retry decisions belong to the
/// callers.
#[async_trait]
pub trait SpotifyApi: Send + Sync {
    /// One page of the user's saved tracks. `None` requests the first page.
    async fn list_saved_tracks(&self, cursor: Option<&Cursor>) -> Result<Page<SavedTrack>, ApiError>;

    /// One page of the playlists visible to the user, including ones owned by others.
    async fn list_playlists(&self, cursor: Option<&Cursor>) -> Result<Page<Playlist>, ApiError>;

    async fn create_playlist(
        &self,
        owner_id: &str,
        name: &str,
        public: bool,
    ) -> Result<PlaylistRef, ApiError>;

    /// Appends a single track, by track id, to the end of a playlist.
    async fn append_track(&self, playlist_id: &str, track_id: &str) -> Result<(), ApiError>;

    async fn current_user_id(&self) -> Result<String, ApiError>;
}

/// Walks every playlist page and keeps those owned by `user_id`.
///
/// Any failing page aborts the listing.
pub async fn owned_playlists<A>(api: &A, user_id: &str) -> Result<Vec<PlaylistRef>, ApiError>
where
    A: SpotifyApi + ?Sized,
{
    let mut owned = Vec::new();
    let mut page = api.list_playlists(None).await?;

    loop {
        owned.extend(
            page.items
                .into_iter()
                .filter(|p| p.owner.id == user_id)
                .map(|p| PlaylistRef {
                    id: p.id,
                    name: p.name,
                }),
        );

        match page.next {
            Some(cursor) => page = api.list_playlists(Some(&cursor)).await?,
            None => break,
        }
    }

    tracing::debug!(user_id, count = owned.len(), "owned playlists listed");
    Ok(owned)
}
