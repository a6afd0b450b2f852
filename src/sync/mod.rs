//! # Sync Module
//!
//! The two halves of the tool:
//!
//! ```text
//! Spotify ──▶ ingest ──▶ SnapshotStore ──▶ partition ──▶ reconcile ──▶ Spotify
//! ```
//!
//! - [`ingest`] pages through the saved tracks and writes a dated snapshot.
//! - [`partition`] picks a month out of a snapshot and names its playlist.
//! - [`reconcile`] creates or reuses that playlist and appends the tracks.
//! - [`progress`] is the observer both engines report through.
//!
//! Every remote call is awaited before the next one is issued.

pub mod ingest;
pub mod partition;
pub mod progress;
pub mod reconcile;

pub use ingest::{Ingested, Ingestor, PagePolicy};
pub use partition::{MonthKey, month_counts, select_month};
pub use progress::{ConsoleProgress, ProgressObserver, SilentProgress};
pub use reconcile::{ByName, PlaylistResolver, ReconcileOutcome, Reconciler};
