// src/model/diff.rs

//! Diff computation between the previous and current snapshot of a category.
//!
//! Records are matched by codename whenever both snapshots allow it, so a
//! reordering upstream cannot attribute a change to the wrong device.
//! Snapshots whose records lack codenames (or repeat them) fall back to
//! positional matching, truncated to the shorter side.

use std::collections::{HashMap, HashSet};

use tracing::{debug, info, warn};

use super::{ChangeEvent, Snapshot, UpdateRecord};

/// How records of the two snapshots were paired up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffStrategy {
    /// No previous snapshot; nothing was compared
    FirstRun,
    /// Records matched by codename
    Keyed,
    /// Records matched by index
    Positional,
}

/// The result of diffing two snapshots
#[derive(Debug, Clone)]
pub struct SnapshotDiff {
    /// Changed records, in the order of the new snapshot
    pub changes: Vec<ChangeEvent>,

    pub strategy: DiffStrategy,
}

impl SnapshotDiff {
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn into_changes(self) -> Vec<ChangeEvent> {
        self.changes
    }
}

/// Compute the records of `new` whose version differs from their
/// counterpart in `old`.
///
/// `old` is `None` on the first run for a category, which yields no
/// changes regardless of what `new` holds.
pub fn diff_snapshots(old: Option<&Snapshot>, new: &Snapshot) -> SnapshotDiff {
    let Some(old) = old else {
        info!("No previous snapshot, running for the first time");
        return SnapshotDiff {
            changes: Vec::new(),
            strategy: DiffStrategy::FirstRun,
        };
    };

    match codename_index(old) {
        Some(old_index) if codename_index(new).is_some() => SnapshotDiff {
            changes: keyed_diff(&old_index, new),
            strategy: DiffStrategy::Keyed,
        },
        _ => SnapshotDiff {
            changes: positional_diff(old, new),
            strategy: DiffStrategy::Positional,
        },
    }
}

/// Index a snapshot by codename, or `None` if any record has no codename
/// or a codename appears twice.
fn codename_index(snapshot: &Snapshot) -> Option<HashMap<&str, &UpdateRecord>> {
    let mut index = HashMap::with_capacity(snapshot.len());
    for record in snapshot.iter() {
        if record.codename.is_empty() {
            return None;
        }
        if index.insert(record.codename.as_str(), record).is_some() {
            debug!("Duplicate codename {} in snapshot", record.codename);
            return None;
        }
    }
    Some(index)
}

fn keyed_diff(old_index: &HashMap<&str, &UpdateRecord>, new: &Snapshot) -> Vec<ChangeEvent> {
    let mut changes = Vec::new();
    let mut seen = HashSet::new();

    for record in new.iter() {
        seen.insert(record.codename.as_str());
        match old_index.get(record.codename.as_str()) {
            Some(previous) if previous.version != record.version => {
                changes.push(change(previous, record));
            }
            Some(_) => {}
            None => debug!("{}: not in previous snapshot, skipping", record.codename),
        }
    }

    for codename in old_index.keys().filter(|c| !seen.contains(*c)) {
        debug!("{}: no longer in current snapshot", codename);
    }

    changes
}

fn positional_diff(old: &Snapshot, new: &Snapshot) -> Vec<ChangeEvent> {
    if old.len() != new.len() {
        warn!(
            "Snapshot length changed ({} -> {}), comparing the first {} records only",
            old.len(),
            new.len(),
            old.len().min(new.len())
        );
    }

    old.iter()
        .zip(new.iter())
        .filter(|(previous, current)| previous.version != current.version)
        .map(|(previous, current)| change(previous, current))
        .collect()
}

fn change(previous: &UpdateRecord, current: &UpdateRecord) -> ChangeEvent {
    ChangeEvent {
        record: current.clone(),
        previous_version: previous.version.clone(),
    }
}
