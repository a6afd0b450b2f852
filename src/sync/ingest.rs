use std::{path::PathBuf, time::Duration};

use chrono::Local;
use tokio::time::sleep;

use crate::{
    error::{ApiError, IngestError},
    management::SnapshotStore,
    spotify::SpotifyApi,
    sync::progress::ProgressObserver,
    types::{Cursor, Page, SavedTrack, Snapshot, TrackRecord},
};

/// How often a page is asked for again after transient failures.
///
/// Cursors are opaque, so a page that keeps failing cannot be skipped; once
/// `max_attempts` consecutive attempts failed the run stops like on a fatal
/// error.
#[derive(Debug, Clone, Copy)]
pub struct PagePolicy {
    pub max_attempts: u32,
    pub retry_delay: Duration,
}

impl Default for PagePolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            retry_delay: Duration::from_secs(1),
        }
    }
}

/// Result of a completed ingestion run.
#[derive(Debug)]
pub struct Ingested {
    pub snapshot: Snapshot,
    pub path: PathBuf,
    pub pages: usize,
}

enum PageFailure {
    Fatal {
        page: usize,
        source: ApiError,
    },
    Exhausted {
        page: usize,
        attempts: u32,
        source: ApiError,
    },
}

impl PageFailure {
    fn into_error(self, saved: usize) -> IngestError {
        match self {
            PageFailure::Fatal { page, source } => IngestError::Fatal { page, saved, source },
            PageFailure::Exhausted {
                page,
                attempts,
                source,
            } => IngestError::RetriesExhausted {
                page,
                attempts,
                saved,
                source,
            },
        }
    }
}

/// Pulls every saved track page by page into a snapshot and persists it.
pub struct Ingestor<'a, A: ?Sized, P: ?Sized> {
    api: &'a A,
    store: &'a SnapshotStore,
    progress: &'a P,
    policy: PagePolicy,
}

impl<'a, A, P> Ingestor<'a, A, P>
where
    A: SpotifyApi + ?Sized,
    P: ProgressObserver + ?Sized,
{
    pub fn new(api: &'a A, store: &'a SnapshotStore, progress: &'a P) -> Self {
        Self {
            api,
            store,
            progress,
            policy: PagePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: PagePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Runs one ingestion and writes the snapshot named after today's date.
    ///
    /// When the run stops early, whatever was collected is still written, as
    /// that day's partial snapshot, before the error is returned.
    pub async fn ingest(&self) -> Result<Ingested, IngestError> {
        let mut snapshot = Snapshot::default();
        let collected = self.collect(&mut snapshot).await;
        let today = Local::now().date_naive();

        match collected {
            Ok(pages) => {
                let path = self.store.persist(&snapshot, today).await?;
                self.progress.snapshot_saved(&path, snapshot.len());
                Ok(Ingested {
                    snapshot,
                    path,
                    pages,
                })
            }
            Err(failure) => {
                let saved = match self.store.persist_partial(&snapshot, today).await {
                    Ok(path) => {
                        self.progress.snapshot_saved(&path, snapshot.len());
                        snapshot.len()
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "partial snapshot could not be written");
                        0
                    }
                };
                Err(failure.into_error(saved))
            }
        }
    }

    async fn collect(&self, snapshot: &mut Snapshot) -> Result<usize, PageFailure> {
        let mut cursor: Option<Cursor> = None;
        let mut page_no = 0;

        loop {
            page_no += 1;
            let page = self.fetch_page(page_no, cursor.take()).await?;

            // stamped per page, a run crossing midnight records both days
            let captured_on = Local::now().date_naive();
            let before = snapshot.len();
            for item in page.items {
                match TrackRecord::from_saved(item, captured_on) {
                    Some(record) => snapshot.push(record),
                    None => tracing::warn!(page = page_no, "saved track without id skipped"),
                }
            }
            let items = snapshot.len() - before;
            tracing::debug!(page = page_no, items, total = snapshot.len(), "saved tracks page");
            self.progress.page_fetched(page_no, items, snapshot.len());

            match page.next {
                Some(next) => cursor = Some(next),
                None => return Ok(page_no),
            }
        }
    }

    async fn fetch_page(
        &self,
        page_no: usize,
        cursor: Option<Cursor>,
    ) -> Result<Page<SavedTrack>, PageFailure> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            let err = match self.api.list_saved_tracks(cursor.as_ref()).await {
                Ok(page) => return Ok(page),
                Err(err) => err,
            };

            if !err.is_transient() {
                return Err(PageFailure::Fatal {
                    page: page_no,
                    source: err,
                });
            }

            tracing::warn!(page = page_no, attempt, error = %err, "saved tracks page failed");
            self.progress.page_failed(page_no, attempt, &err);

            if attempt >= max_attempts {
                return Err(PageFailure::Exhausted {
                    page: page_no,
                    attempts: attempt,
                    source: err,
                });
            }

            if !self.policy.retry_delay.is_zero() {
                sleep(self.policy.retry_delay).await;
            }
        }
    }
}
