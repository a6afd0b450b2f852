use std::path::PathBuf;

use crate::{
    error, info,
    management::SnapshotStore,
    spotify::SpotifyClient,
    success,
    sync::{ConsoleProgress, MonthKey, ReconcileOutcome, Reconciler},
};

pub async fn playlist(month: u32, year: i32, file: Option<PathBuf>) {
    let month = match MonthKey::new(month, year) {
        Ok(month) => month,
        Err(e) => error!("{}", e),
    };

    let path = super::snapshot_path(file).await;
    let snapshot = match SnapshotStore::load(&path).await {
        Ok(snapshot) => snapshot,
        Err(e) => error!("{}", e),
    };
    info!(
        "Loaded {} tracks from {}",
        snapshot.len(),
        path.display()
    );

    let client = match SpotifyClient::from_cache().await {
        Ok(client) => client,
        Err(e) => error!("{}", e),
    };

    let progress = ConsoleProgress::new();
    let outcome = Reconciler::new(&client, &progress).run(month, &snapshot).await;
    // error! exits without unwinding, clear the progress bar first
    drop(progress);

    match outcome {
        Ok(ReconcileOutcome::Skipped) => {}
        Ok(outcome) => success!("{}.", outcome),
        Err(e) => error!("Playlist update stopped: {}", e),
    }
}
