// src/snapshot/mod.rs

//! On-disk snapshot storage
//!
//! Layout under the state root, one directory per category:
//!
//! ```text
//! stable_fastboot/
//!     stable_fastboot.json   current snapshot (published)
//!     old_stable_fastboot    previous snapshot (during a run only)
//!     <device>.json          per-device fetch output (merged, then removed)
//! ```
//!
//! At the start of a run the current snapshot is renamed aside; the merge
//! writes a fresh one; after publication the previous one is deleted.

mod merge;

pub use merge::merge_category;

use crate::error::{Error, Result};
use crate::model::{Category, Snapshot};
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Prefix of the previous-snapshot artifact
pub const PREVIOUS_PREFIX: &str = "old_";

/// Snapshot files rooted at a state directory
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    root: PathBuf,
}

impl SnapshotStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn category_dir(&self, category: Category) -> PathBuf {
        self.root.join(category.name())
    }

    pub fn current_path(&self, category: Category) -> PathBuf {
        self.category_dir(category)
            .join(format!("{}.json", category.name()))
    }

    pub fn previous_path(&self, category: Category) -> PathBuf {
        self.category_dir(category)
            .join(format!("{PREVIOUS_PREFIX}{}", category.name()))
    }

    /// Create the directories of `categories` and move their current
    /// snapshots aside. Other categories are left alone.
    pub fn prepare(&self, categories: &[Category]) -> Result<()> {
        for category in categories {
            let dir = self.category_dir(*category);
            fs::create_dir_all(&dir).map_err(|e| {
                Error::IoError(format!("Failed to create directory {}: {e}", dir.display()))
            })?;

            let current = self.current_path(*category);
            if current.exists() {
                let previous = self.previous_path(*category);
                fs::rename(&current, &previous).map_err(|e| {
                    Error::IoError(format!(
                        "Failed to move {} to {}: {e}",
                        current.display(),
                        previous.display()
                    ))
                })?;
                debug!("Moved {} aside", current.display());
            }
        }
        Ok(())
    }

    /// Load the previous snapshot of a category
    ///
    /// Returns `None` on the first run. An unreadable previous snapshot is
    /// treated the same way: it only costs one run of change detection.
    pub fn load_previous(&self, category: Category) -> Option<Snapshot> {
        let path = self.previous_path(category);
        if !path.exists() {
            info!("Can't find old {} files, skipping", category);
            return None;
        }

        match read_snapshot(&path) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                warn!("Ignoring unreadable previous snapshot {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Load the current snapshot of a category
    pub fn load_current(&self, category: Category) -> Result<Snapshot> {
        read_snapshot(&self.current_path(category))
    }

    /// Merge the per-device fetch outputs of a category into a snapshot
    pub fn merge(&self, category: Category) -> Result<Snapshot> {
        merge_category(&self.category_dir(category), category)
    }

    /// Write the current snapshot of a category
    ///
    /// The file is written under a temporary name and renamed into place.
    pub fn write_current(&self, category: Category, snapshot: &Snapshot) -> Result<PathBuf> {
        let dir = self.category_dir(category);
        let path = self.current_path(category);

        let mut file = tempfile::NamedTempFile::new_in(&dir).map_err(|e| {
            Error::IoError(format!("Failed to create temp file in {}: {e}", dir.display()))
        })?;
        file.write_all(&to_json(snapshot)?)?;
        file.write_all(b"\n")?;
        file.persist(&path).map_err(|e| {
            Error::IoError(format!("Failed to write {}: {}", path.display(), e.error))
        })?;

        debug!("Wrote {} records to {}", snapshot.len(), path.display());
        Ok(path)
    }

    /// Existing current snapshot files of the given categories
    pub fn current_paths(&self, categories: &[Category]) -> Vec<PathBuf> {
        categories
            .iter()
            .map(|c| self.current_path(*c))
            .filter(|p| p.exists())
            .collect()
    }

    /// Delete the previous snapshots of `categories`. Returns how many were
    /// removed.
    pub fn cleanup_previous(&self, categories: &[Category]) -> Result<usize> {
        let mut removed = 0;
        for category in categories {
            let path = self.previous_path(*category);
            match fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(Error::IoError(format!(
                        "Failed to remove {}: {e}",
                        path.display()
                    )));
                }
            }
        }
        Ok(removed)
    }
}

/// Read a snapshot file
pub fn read_snapshot(path: &Path) -> Result<Snapshot> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::NotFound(path.display().to_string())
        } else {
            Error::IoError(format!("Failed to read {}: {e}", path.display()))
        }
    })?;
    serde_json::from_str(&content)
        .map_err(|e| Error::ParseError(format!("Invalid snapshot {}: {e}", path.display())))
}

/// Serialize a snapshot as JSON indented by one space
fn to_json(snapshot: &Snapshot) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b" ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    snapshot.serialize(&mut serializer)?;
    Ok(buf)
}
