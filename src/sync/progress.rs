use std::{path::Path, sync::Mutex};

use indicatif::{ProgressBar, ProgressStyle};

use crate::{
    error::ApiError,
    info, success,
    sync::partition::{MonthKey, reference_time},
    types::{PlaylistRef, TrackRecord},
    warning,
};

/// Side channel through which the engines report what they are doing.
///
/// Every method has an empty default so observers only implement what they
/// display. Nothing reported here feeds back into the engines.
pub trait ProgressObserver: Send + Sync {
    /// A page of saved tracks was stored; `page` only ever increases.
    fn page_fetched(&self, _page: usize, _items: usize, _total: usize) {}

    /// A transient failure on `page`; the same cursor will be tried again
    /// unless `attempt` was the last one allowed.
    fn page_failed(&self, _page: usize, _attempt: u32, _error: &ApiError) {}

    fn snapshot_saved(&self, _path: &Path, _tracks: usize) {}

    fn month_empty(&self, _month: MonthKey) {}

    fn playlist_found(&self, _playlist: &PlaylistRef) {}

    fn playlist_missing(&self, _name: &str) {}

    fn playlist_created(&self, _playlist: &PlaylistRef) {}

    fn appending(&self, _playlist: &PlaylistRef, _total: usize) {}

    fn track_appended(&self, _position: usize, _track: &TrackRecord) {}

    fn appends_finished(&self, _playlist: &PlaylistRef, _appended: usize) {}
}

/// Observer that reports nothing.
pub struct SilentProgress;

impl ProgressObserver for SilentProgress {}

/// Terminal observer: spinners and bars from `indicatif`, status lines from
/// the crate's output macros.
#[derive(Default)]
pub struct ConsoleProgress {
    bar: Mutex<Option<ProgressBar>>,
}

impl ConsoleProgress {
    pub fn new() -> Self {
        Self::default()
    }

    fn current(&self) -> Option<ProgressBar> {
        self.bar.lock().ok().and_then(|guard| guard.clone())
    }

    fn replace_bar(&self, bar: Option<ProgressBar>) {
        if let Ok(mut guard) = self.bar.lock() {
            if let Some(old) = guard.take() {
                old.finish_and_clear();
            }
            *guard = bar;
        }
    }

    fn spinner(message: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        pb.set_message(message.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
            pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
        }
        pb
    }
}

impl ProgressObserver for ConsoleProgress {
    fn page_fetched(&self, page: usize, _items: usize, total: usize) {
        let pb = match self.current() {
            Some(pb) => pb,
            None => {
                let pb = Self::spinner("Fetching saved tracks...");
                self.replace_bar(Some(pb.clone()));
                pb
            }
        };
        pb.set_message(format!("Fetched page {} ({} tracks)...", page, total));
    }

    fn page_failed(&self, page: usize, attempt: u32, error: &ApiError) {
        let report = || warning!("Page {} failed (attempt {}): {}", page, attempt, error);
        match self.current() {
            Some(pb) => pb.suspend(report),
            None => report(),
        }
    }

    fn snapshot_saved(&self, path: &Path, tracks: usize) {
        self.replace_bar(None);
        success!("Saved {} tracks to {}", tracks, path.display());
    }

    fn month_empty(&self, month: MonthKey) {
        info!(
            "No tracks saved in {}, nothing to do.",
            month.playlist_name()
        );
    }

    fn playlist_found(&self, playlist: &PlaylistRef) {
        info!("Playlist exists: {} with id {}", playlist.name, playlist.id);
    }

    fn playlist_missing(&self, name: &str) {
        info!("Playlist missing: {}, creating it", name);
    }

    fn playlist_created(&self, playlist: &PlaylistRef) {
        success!("Playlist {} created with id {}", playlist.name, playlist.id);
    }

    fn appending(&self, _playlist: &PlaylistRef, total: usize) {
        let pb = ProgressBar::new(total as u64);
        if let Ok(style) = ProgressStyle::with_template("{bar:30.green/blue} {pos}/{len} {msg}") {
            pb.set_style(style);
        }
        self.replace_bar(Some(pb));
    }

    fn track_appended(&self, _position: usize, track: &TrackRecord) {
        if let Some(pb) = self.current() {
            pb.set_message(format!(
                "{} {} - {}",
                reference_time(&track.added_at).format("%Y-%m-%d %H:%M"),
                track.artist_name,
                track.track_name
            ));
            pb.inc(1);
        }
    }

    fn appends_finished(&self, playlist: &PlaylistRef, appended: usize) {
        self.replace_bar(None);
        success!("Added {} tracks to {}", appended, playlist.name);
    }
}

impl Drop for ConsoleProgress {
    fn drop(&mut self) {
        self.replace_bar(None);
    }
}
