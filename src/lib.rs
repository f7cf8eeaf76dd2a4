// src/lib.rs

//! MIUI Updates Tracker
//!
//! Periodic batch job that watches the firmware releases published for
//! Xiaomi devices, detects version changes since the previous run, tells
//! new releases from rollbacks, and announces them on Telegram and Discord.
//!
//! # Architecture
//!
//! - Snapshots: one JSON array per category plus the one from the last run
//! - Diff: version changes matched by codename, by position as a fallback
//! - Classification: ordered first-match-wins filename and version rules
//! - Rollbacks: looked up in a read-only remote history archive
//! - Best effort: archive and channel failures are logged, never fatal

pub mod classifier;
pub mod config;
mod error;
pub mod fetch;
pub mod http;
pub mod model;
pub mod notify;
pub mod process;
pub mod publish;
pub mod rollback;
pub mod snapshot;
pub mod tracker;

pub use classifier::{Branch, Classification, PackageType, Region, classify};
pub use config::TrackerConfig;
pub use error::{Error, Result};
pub use model::{
    Category, ChangeEvent, ClassifiedUpdate, DiffStrategy, Snapshot, SnapshotDiff, UpdateRecord,
    diff_snapshots,
};
pub use notify::{Channel, DeliveryError, Message, Notifier, NotifyReport};
pub use rollback::{ArchiveEntry, ArchiveError, ArchiveSource, RollbackResolver};
pub use snapshot::SnapshotStore;
pub use tracker::{RunSummary, Tracker};
