// src/snapshot/merge.rs

//! Merging per-device fetch outputs into one snapshot

use crate::error::{Error, Result};
use crate::model::{Category, Snapshot, UpdateRecord};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Build the snapshot of a category from the per-device `*.json` files in
/// its directory.
///
/// Files are merged in filename order so the device order is the same on
/// every run. A device with no file has no release this run. The merged
/// files are removed afterwards.
pub fn merge_category(dir: &Path, category: Category) -> Result<Snapshot> {
    info!("Creating JSON for {}", category);

    let snapshot_name = format!("{}.json", category.name());
    let files = device_files(dir, &snapshot_name)?;

    let mut records = Vec::with_capacity(files.len());
    for path in &files {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::IoError(format!("Failed to read {}: {e}", path.display())))?;
        let record: UpdateRecord = serde_json::from_str(&content).map_err(|e| {
            Error::ParseError(format!("Invalid device record {}: {e}", path.display()))
        })?;
        records.push(record);
    }

    for path in &files {
        fs::remove_file(path)
            .map_err(|e| Error::IoError(format!("Failed to remove {}: {e}", path.display())))?;
    }

    debug!("Merged {} device records for {}", records.len(), category);
    Ok(Snapshot::new(records))
}

/// Per-device files in a category directory, sorted by name
fn device_files(dir: &Path, snapshot_name: &str) -> Result<Vec<PathBuf>> {
    let pattern = format!("{}/*.json", glob::Pattern::escape(&dir.to_string_lossy()));
    let paths = glob::glob(&pattern)
        .map_err(|e| Error::IoError(format!("Invalid pattern {pattern}: {e}")))?;

    let mut files: Vec<PathBuf> = paths
        .flatten()
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| {
                    name != snapshot_name && !name.starts_with(super::PREVIOUS_PREFIX)
                })
        })
        .collect();
    files.sort();
    Ok(files)
}
