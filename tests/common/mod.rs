// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.

#![allow(dead_code)]

use chrono::{DateTime, Local};
use miui_tracker::fetch::NoopFetcher;
use miui_tracker::notify::{Channel, DeliveryError, Notifier};
use miui_tracker::publish::Publisher;
use miui_tracker::rollback::{ArchiveEntry, ArchiveError, ArchiveSource, parse_archive};
use miui_tracker::{Category, RollbackResolver, SnapshotStore, Tracker, UpdateRecord};
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Build a complete update record
pub fn record(codename: &str, version: &str, filename: &str) -> UpdateRecord {
    UpdateRecord {
        device: format!("Xiaomi {codename}"),
        codename: codename.to_string(),
        version: version.to_string(),
        android: "10.0".to_string(),
        filename: filename.to_string(),
        download: format!("https://bigota.d.miui.com/{version}/{filename}"),
    }
}

/// Drop a per-device fetch output into a category directory
pub fn write_device_file(root: &Path, category: Category, name: &str, content: &str) {
    let dir = root.join(category.name());
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join(format!("{name}.json")), content).unwrap();
}

/// Drop a per-device fetch output for a record
pub fn write_device(root: &Path, category: Category, record: &UpdateRecord) {
    let name = if record.codename.is_empty() {
        "device"
    } else {
        record.codename.as_str()
    };
    write_device_file(root, category, name, &serde_json::to_string(record).unwrap());
}

/// Write the current snapshot of a category as raw JSON
pub fn write_current_snapshot(root: &Path, category: Category, json: &str) {
    let dir = root.join(category.name());
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join(format!("{}.json", category.name())), json).unwrap();
}

/// In-memory history archive. Unknown codenames fail like a 404.
#[derive(Default)]
pub struct FakeArchive {
    documents: HashMap<String, Vec<ArchiveEntry>>,
    pub queried: Rc<RefCell<Vec<String>>>,
}

impl FakeArchive {
    pub fn with_document(mut self, codename: &str, json: &str) -> Self {
        self.documents
            .insert(codename.to_string(), parse_archive(json).unwrap());
        self
    }
}

impl ArchiveSource for FakeArchive {
    fn fetch(&self, codename: &str) -> Result<Vec<ArchiveEntry>, ArchiveError> {
        self.queried.borrow_mut().push(codename.to_string());
        self.documents
            .get(codename)
            .cloned()
            .ok_or_else(|| ArchiveError::Status {
                url: format!("https://archive.test/{codename}.json"),
                status: 404,
            })
    }
}

/// Channel that records every message, optionally failing each send
pub struct RecordingChannel {
    name: String,
    fail: bool,
    pub sent: Rc<RefCell<Vec<String>>>,
}

impl RecordingChannel {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            fail: false,
            sent: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn failing(name: &str) -> Self {
        Self {
            fail: true,
            ..Self::new(name)
        }
    }
}

impl Channel for RecordingChannel {
    fn name(&self) -> &str {
        &self.name
    }

    fn send(&self, text: &str) -> Result<(), DeliveryError> {
        self.sent.borrow_mut().push(text.to_string());
        if self.fail {
            Err(DeliveryError::Rejected {
                status: 401,
                detail: "wrong / unauthorized token".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

/// Publisher that records the paths of each call
#[derive(Default)]
pub struct RecordingPublisher {
    fail: bool,
    pub calls: Rc<RefCell<Vec<Vec<PathBuf>>>>,
}

impl RecordingPublisher {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

impl Publisher for RecordingPublisher {
    fn publish(&self, paths: &[PathBuf], _started: DateTime<Local>) -> miui_tracker::Result<()> {
        self.calls.borrow_mut().push(paths.to_vec());
        if self.fail {
            Err(miui_tracker::Error::CommandFailed(
                "git push exited with 128".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}

/// Handles onto the fakes wired into a tracker
pub struct Recorded {
    pub queried: Rc<RefCell<Vec<String>>>,
    pub primary: Rc<RefCell<Vec<String>>>,
    pub secondary: Rc<RefCell<Vec<String>>>,
    pub published: Rc<RefCell<Vec<Vec<PathBuf>>>>,
}

/// Wire a tracker over `root` with in-memory collaborators
pub fn tracker_with(
    root: &Path,
    categories: Vec<Category>,
    archive: FakeArchive,
    primary: RecordingChannel,
    secondary: RecordingChannel,
    publisher: RecordingPublisher,
) -> (Tracker, Recorded) {
    let recorded = Recorded {
        queried: Rc::clone(&archive.queried),
        primary: Rc::clone(&primary.sent),
        secondary: Rc::clone(&secondary.sent),
        published: Rc::clone(&publisher.calls),
    };

    let tracker = Tracker::new(
        SnapshotStore::new(root),
        categories,
        Box::new(NoopFetcher),
        RollbackResolver::new(Box::new(archive)),
        Notifier::new(Box::new(primary), Box::new(secondary)),
        Box::new(publisher),
    );
    (tracker, recorded)
}

/// Tracker with an empty archive, working channels and publisher
pub fn default_tracker(root: &Path, categories: Vec<Category>) -> (Tracker, Recorded) {
    tracker_with(
        root,
        categories,
        FakeArchive::default(),
        RecordingChannel::new("telegram"),
        RecordingChannel::new("discord"),
        RecordingPublisher::default(),
    )
}
