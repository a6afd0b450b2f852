use std::path::PathBuf;

use crate::{
    error,
    management::SnapshotStore,
    spotify::SpotifyClient,
    success,
    sync::{ConsoleProgress, Ingestor, PagePolicy},
};

pub async fn import(dir: Option<PathBuf>, page_attempts: u32) {
    let client = match SpotifyClient::from_cache().await {
        Ok(client) => client,
        Err(e) => error!("{}", e),
    };

    let store = match dir {
        Some(dir) => SnapshotStore::new(dir),
        None => SnapshotStore::default_location(),
    };
    let progress = ConsoleProgress::new();
    let policy = PagePolicy {
        max_attempts: page_attempts,
        ..PagePolicy::default()
    };

    let result = Ingestor::new(&client, &store, &progress)
        .with_policy(policy)
        .ingest()
        .await;
    // error! exits without unwinding, clear the spinner first
    drop(progress);

    match result {
        Ok(ingested) => success!(
            "Imported {} saved tracks from {} pages.",
            ingested.snapshot.len(),
            ingested.pages
        ),
        Err(e) => error!("Import stopped: {}", e),
    }
}
