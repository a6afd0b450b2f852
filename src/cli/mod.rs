//! # CLI Module
//!
//! User-facing commands. Each command loads what it needs, hands the work to
//! the [`crate::sync`] engines with a [`crate::sync::ConsoleProgress`]
//! observer and turns errors into messages via the crate's output macros.
//!
//! - [`auth`] - Spotify OAuth authentication with PKCE
//! - [`import`] - Captures all saved tracks into a dated snapshot
//! - [`playlist`] - Creates or fills the playlist of one month
//! - [`months`] - Lists the months present in a snapshot
//!
//! ## Usage Patterns
//!
//! ```bash
//! likesync auth                              # Authenticate with Spotify
//! likesync import                            # Snapshot saved tracks
//! likesync months                            # What is in the latest snapshot
//! likesync playlist --month 3 --year 2024    # Fill "March '24"
//! ```

mod auth;
mod import;
mod months;
mod playlist;

use std::path::PathBuf;

pub use auth::auth;
pub use import::import;
pub use months::months;
pub use playlist::playlist;

use crate::{error, management::SnapshotStore};

/// The given snapshot file, or the latest one in the default directory.
async fn snapshot_path(file: Option<PathBuf>) -> PathBuf {
    match file {
        Some(file) => file,
        None => match SnapshotStore::default_location().latest().await {
            Ok(path) => path,
            Err(e) => error!("{}\nRun likesync import first or pass --file.", e),
        },
    }
}
