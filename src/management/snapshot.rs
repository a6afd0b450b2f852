use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::{config, error::SnapshotError, types::Snapshot};

const FILE_PREFIX: &str = "saved_track_";
const FILE_EXTENSION: &str = "json";
const PARTIAL_MARKER: &str = "partial";

/// Directory of dated snapshot files, one per ingestion run.
///
/// Files are named `saved_track_<YYYYMMDD>.json` and hold a JSON array of
/// track records. A second complete run on the same day replaces that day's
/// file. Runs that stop early write `saved_track_<YYYYMMDD>.partial.json`
/// instead.
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store rooted in the default data directory.
    pub fn default_location() -> Self {
        Self::new(config::snapshot_dir())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn file_name(date: NaiveDate) -> String {
        format!(
            "{FILE_PREFIX}{date}.{FILE_EXTENSION}",
            date = date.format("%Y%m%d")
        )
    }

    pub fn path_for(&self, date: NaiveDate) -> PathBuf {
        self.dir.join(Self::file_name(date))
    }

    /// Name of the snapshot an interrupted run leaves behind. Never picked by
    /// [`SnapshotStore::latest`].
    pub fn partial_file_name(date: NaiveDate) -> String {
        format!(
            "{FILE_PREFIX}{date}.{PARTIAL_MARKER}.{FILE_EXTENSION}",
            date = date.format("%Y%m%d")
        )
    }

    pub fn partial_path_for(&self, date: NaiveDate) -> PathBuf {
        self.dir.join(Self::partial_file_name(date))
    }

    /// Writes the snapshot of a completed run, replacing that day's file and
    /// removing a partial one left by an earlier failed run.
    pub async fn persist(&self, snapshot: &Snapshot, date: NaiveDate) -> Result<PathBuf, SnapshotError> {
        let path = self.path_for(date);
        self.write(&path, snapshot).await?;

        let partial = self.partial_path_for(date);
        match async_fs::remove_file(&partial).await {
            Ok(()) => tracing::debug!(path = %partial.display(), "stale partial snapshot removed"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(path = %partial.display(), error = %e, "cannot remove partial snapshot"),
        }
        Ok(path)
    }

    /// Writes what an interrupted run collected. A complete snapshot of the
    /// same day is left untouched.
    pub async fn persist_partial(&self, snapshot: &Snapshot, date: NaiveDate) -> Result<PathBuf, SnapshotError> {
        let path = self.partial_path_for(date);
        self.write(&path, snapshot).await?;
        Ok(path)
    }

    // Goes through a temporary file so a crash never leaves a truncated snapshot.
    async fn write(&self, path: &Path, snapshot: &Snapshot) -> Result<(), SnapshotError> {
        async_fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| SnapshotError::Io {
                path: self.dir.clone(),
                source,
            })?;

        let json = serde_json::to_string_pretty(snapshot).map_err(|source| SnapshotError::Serde {
            path: path.to_path_buf(),
            source,
        })?;

        let tmp = path.with_extension(format!("{FILE_EXTENSION}.tmp"));
        async_fs::write(&tmp, json)
            .await
            .map_err(|source| SnapshotError::Io {
                path: tmp.clone(),
                source,
            })?;
        if let Err(source) = async_fs::rename(&tmp, path).await {
            let _ = async_fs::remove_file(&tmp).await;
            return Err(SnapshotError::Io {
                path: path.to_path_buf(),
                source,
            });
        }

        tracing::debug!(path = %path.display(), tracks = snapshot.len(), "snapshot written");
        Ok(())
    }

    pub async fn load(path: &Path) -> Result<Snapshot, SnapshotError> {
        let content = async_fs::read_to_string(path)
            .await
            .map_err(|source| SnapshotError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        serde_json::from_str(&content).map_err(|source| SnapshotError::Serde {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Path of the most recent snapshot, judged by the date in its name.
    pub async fn latest(&self) -> Result<PathBuf, SnapshotError> {
        let io_err = |source| SnapshotError::Io {
            path: self.dir.clone(),
            source,
        };

        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SnapshotError::NotFound(self.dir.clone()));
            }
            Err(e) => return Err(io_err(e)),
        };

        let mut latest: Option<(NaiveDate, PathBuf)> = None;
        while let Some(entry) = entries.next_entry().await.map_err(io_err)? {
            let name = entry.file_name();
            let Some(date) = name.to_str().and_then(Self::date_from_file_name) else {
                continue;
            };
            if latest.as_ref().is_none_or(|(best, _)| date > *best) {
                latest = Some((date, entry.path()));
            }
        }

        latest
            .map(|(_, path)| path)
            .ok_or_else(|| SnapshotError::NotFound(self.dir.clone()))
    }

    fn date_from_file_name(name: &str) -> Option<NaiveDate> {
        let stem = name
            .strip_prefix(FILE_PREFIX)?
            .strip_suffix(FILE_EXTENSION)?
            .strip_suffix('.')?;
        NaiveDate::parse_from_str(stem, "%Y%m%d").ok()
    }
}
