mod auth;
mod snapshot;

pub use auth::TokenManager;
pub use snapshot::SnapshotStore;
