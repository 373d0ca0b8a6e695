use crate::atomic::TMP_SUFFIX;
use std::path::Path;
use std::time::{Duration, SystemTime};
use walkdir::{DirEntry, WalkDir};

/// Temp files younger than this may belong to a write in progress.
const STALE_AFTER: Duration = Duration::from_secs(300);

/// Outcome of a stale temporary file purge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PurgeReport {
    pub removed: usize,
    pub failed: usize,
}

pub(crate) async fn purge_tmp(root: &Path) -> PurgeReport {
    let root = root.to_path_buf();
    let now = SystemTime::now();

    tokio::task::spawn_blocking(move || remove_stale(&root, now, STALE_AFTER))
        .await
        .unwrap_or_default()
}

fn remove_stale(root: &Path, now: SystemTime, threshold: Duration) -> PurgeReport {
    let mut report = PurgeReport::default();

    WalkDir::new(root)
        .into_iter()
        .flatten()
        .filter(|entry| is_tmp(entry) && is_stale(entry, now, threshold))
        .for_each(|entry| match std::fs::remove_file(entry.path()) {
            Ok(()) => report.removed += 1,
            Err(_) => report.failed += 1,
        });

    report
}

fn is_tmp(entry: &DirEntry) -> bool {
    entry.file_type().is_file()
        && entry.file_name().to_str().is_some_and(|name| name.ends_with(TMP_SUFFIX))
}

fn is_stale(entry: &DirEntry, now: SystemTime, threshold: Duration) -> bool {
    entry
        .metadata()
        .ok()
        .and_then(|m| m.modified().ok())
        .and_then(|modified| now.duration_since(modified).ok())
        .is_none_or(|age| age > threshold)
}
