use std::fmt;

use crate::{
    error::ReconcileError,
    spotify::{self, SpotifyApi},
    sync::{
        partition::{MonthKey, select_month},
        progress::ProgressObserver,
    },
    types::{PlaylistRef, Snapshot},
};

/// Finds the existing playlist that collects a month, if any.
pub trait PlaylistResolver: Send + Sync {
    fn resolve(&self, month: MonthKey, name: &str) -> Option<PlaylistRef>;
}

/// Matches playlists by exact display name.
///
/// When several owned playlists share the name the first one listed wins.
pub struct ByName {
    playlists: Vec<PlaylistRef>,
}

impl ByName {
    pub fn new(playlists: Vec<PlaylistRef>) -> Self {
        Self { playlists }
    }
}

impl PlaylistResolver for ByName {
    fn resolve(&self, _month: MonthKey, name: &str) -> Option<PlaylistRef> {
        self.playlists.iter().find(|p| p.name == name).cloned()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The month has no tracks; nothing was created or appended.
    Skipped,
    Synced {
        playlist: PlaylistRef,
        created: bool,
        appended: usize,
    },
}

impl fmt::Display for ReconcileOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReconcileOutcome::Skipped => write!(f, "No tracks for this month, nothing synced"),
            ReconcileOutcome::Synced {
                playlist,
                created: true,
                appended,
            } => write!(f, "Created {} with {} tracks", playlist.name, appended),
            ReconcileOutcome::Synced {
                playlist, appended, ..
            } => write!(
                f,
                "Appended {} tracks to existing playlist {}",
                appended, playlist.name
            ),
        }
    }
}

/// Makes the month's playlist exist and appends the month's tracks to it.
///
/// Tracks are appended one call at a time in snapshot order, without
/// checking what the playlist already holds. Running the same month twice
/// reuses the playlist but appends every track again.
pub struct Reconciler<'a, A: ?Sized, P: ?Sized> {
    api: &'a A,
    progress: &'a P,
}

impl<'a, A, P> Reconciler<'a, A, P>
where
    A: SpotifyApi + ?Sized,
    P: ProgressObserver + ?Sized,
{
    pub fn new(api: &'a A, progress: &'a P) -> Self {
        Self { api, progress }
    }

    /// Looks up the current user and their playlists, then reconciles `month`.
    pub async fn run(&self, month: MonthKey, snapshot: &Snapshot) -> Result<ReconcileOutcome, ReconcileError> {
        let owner_id = self
            .api
            .current_user_id()
            .await
            .map_err(ReconcileError::ListPlaylists)?;
        let playlists = spotify::owned_playlists(self.api, &owner_id)
            .await
            .map_err(ReconcileError::ListPlaylists)?;

        self.reconcile(month, snapshot, &ByName::new(playlists), &owner_id)
            .await
    }

    pub async fn reconcile<R>(
        &self,
        month: MonthKey,
        snapshot: &Snapshot,
        resolver: &R,
        owner_id: &str,
    ) -> Result<ReconcileOutcome, ReconcileError>
    where
        R: PlaylistResolver + ?Sized,
    {
        let tracks = select_month(snapshot, month);
        if tracks.is_empty() {
            tracing::debug!(%month, "no tracks for month");
            self.progress.month_empty(month);
            return Ok(ReconcileOutcome::Skipped);
        }

        let name = month.playlist_name();
        let (playlist, created) = match resolver.resolve(month, &name) {
            Some(playlist) => {
                self.progress.playlist_found(&playlist);
                (playlist, false)
            }
            None => {
                self.progress.playlist_missing(&name);
                let playlist = self
                    .api
                    .create_playlist(owner_id, &name, false)
                    .await
                    .map_err(|source| ReconcileError::CreatePlaylist {
                        name: name.clone(),
                        source,
                    })?;
                self.progress.playlist_created(&playlist);
                (playlist, true)
            }
        };

        self.progress.appending(&playlist, tracks.len());
        for (appended, track) in tracks.iter().enumerate() {
            self.api
                .append_track(&playlist.id, &track.spotify_id)
                .await
                .map_err(|source| ReconcileError::AppendTrack {
                    playlist_id: playlist.id.clone(),
                    track_id: track.spotify_id.clone(),
                    appended,
                    source,
                })?;
            tracing::debug!(playlist = %playlist.id, track = %track.spotify_id, "track appended");
            self.progress.track_appended(appended + 1, track);
        }
        self.progress.appends_finished(&playlist, tracks.len());

        Ok(ReconcileOutcome::Synced {
            playlist,
            created,
            appended: tracks.len(),
        })
    }
}
