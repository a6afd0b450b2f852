use std::path::PathBuf;

use tabled::Table;

use crate::{
    error,
    management::SnapshotStore,
    sync::month_counts,
    types::MonthTableRow,
    warning,
};

pub async fn months(file: Option<PathBuf>) {
    let path = super::snapshot_path(file).await;
    let snapshot = match SnapshotStore::load(&path).await {
        Ok(snapshot) => snapshot,
        Err(e) => error!("{}", e),
    };

    if snapshot.is_empty() {
        warning!("{} holds no tracks.", path.display());
        return;
    }

    let rows: Vec<MonthTableRow> = month_counts(&snapshot)
        .into_iter()
        .map(|(month, tracks)| MonthTableRow {
            month: month.to_string(),
            playlist: month.playlist_name(),
            tracks,
        })
        .collect();

    println!("{}", Table::new(rows));
}
