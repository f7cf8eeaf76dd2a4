// src/model/mod.rs

//! Update records, snapshots and the change events derived from them.
//!
//! A snapshot is the full ordered list of per-device update records for
//! one category at one point in time. Two snapshots exist per category:
//! the one just fetched and the one retained from the previous run. The
//! diff between them yields change events, which are classified and
//! announced.

mod diff;

pub use diff::{DiffStrategy, SnapshotDiff, diff_snapshots};

use crate::classifier::{Branch, Classification, PackageType, Region};
use serde::{Deserialize, Serialize};

/// One observed update for one device
///
/// Every field defaults to an empty string so that partial records from
/// older snapshots still deserialize.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateRecord {
    /// Marketing name, e.g. "Redmi 6A"
    pub device: String,
    /// Device identifier, possibly with a variant suffix (`cactus_eea_global`)
    pub codename: String,
    /// Firmware version
    pub version: String,
    /// Android platform version
    pub android: String,
    /// Artifact file name
    pub filename: String,
    /// Download URL
    pub download: String,
}

impl UpdateRecord {
    /// Device identifier with any variant suffix stripped
    pub fn canonical_codename(&self) -> &str {
        canonical_codename(&self.codename)
    }
}

/// Strip the variant suffix from a codename: everything from the first
/// underscore on.
pub fn canonical_codename(codename: &str) -> &str {
    codename.split('_').next().unwrap_or(codename)
}

/// Ordered per-device records for one category
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    pub records: Vec<UpdateRecord>,
}

impl Snapshot {
    pub fn new(records: Vec<UpdateRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, UpdateRecord> {
        self.records.iter()
    }
}

impl From<Vec<UpdateRecord>> for Snapshot {
    fn from(records: Vec<UpdateRecord>) -> Self {
        Self::new(records)
    }
}

/// A record whose version changed since the previous snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    /// The record as it appears in the new snapshot
    pub record: UpdateRecord,
    /// The version it replaced
    pub previous_version: String,
}

/// A change event with its derived attributes and rollback verdict
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedUpdate {
    pub record: UpdateRecord,
    pub branch: Branch,
    pub region: Region,
    pub package_type: PackageType,
    pub rolled_back: bool,
}

impl ClassifiedUpdate {
    pub fn new(record: UpdateRecord, classification: Classification, rolled_back: bool) -> Self {
        Self {
            record,
            branch: classification.branch,
            region: classification.region,
            package_type: classification.package_type,
            rolled_back,
        }
    }

    pub fn canonical_codename(&self) -> &str {
        self.record.canonical_codename()
    }
}

/// One of the four tracked (branch x package type) groups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    StableRecovery,
    StableFastboot,
    WeeklyRecovery,
    WeeklyFastboot,
}

impl Category {
    /// Every category, in processing order
    pub fn all() -> &'static [Category] {
        &[
            Self::StableRecovery,
            Self::StableFastboot,
            Self::WeeklyRecovery,
            Self::WeeklyFastboot,
        ]
    }

    /// Directory and snapshot file stem for this category
    pub fn name(&self) -> &'static str {
        match self {
            Self::StableRecovery => "stable_recovery",
            Self::StableFastboot => "stable_fastboot",
            Self::WeeklyRecovery => "weekly_recovery",
            Self::WeeklyFastboot => "weekly_fastboot",
        }
    }

    /// Parse a category from its directory name
    pub fn parse(s: &str) -> Option<Self> {
        Self::all().iter().copied().find(|c| c.name() == s)
    }

    pub fn branch(&self) -> Branch {
        match self {
            Self::StableRecovery | Self::StableFastboot => Branch::Stable,
            Self::WeeklyRecovery | Self::WeeklyFastboot => Branch::Weekly,
        }
    }

    pub fn package_type(&self) -> PackageType {
        match self {
            Self::StableRecovery | Self::WeeklyRecovery => PackageType::Recovery,
            Self::StableFastboot | Self::WeeklyFastboot => PackageType::Fastboot,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
