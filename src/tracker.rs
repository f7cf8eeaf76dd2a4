// src/tracker.rs

//! One batch run of the tracker
//!
//! Ordering is strict: previous snapshots are moved aside before anything
//! is merged, every category is merged and diffed before the first
//! notification goes out, and publication and cleanup happen last. Only
//! an unusable state directory or a corrupt current snapshot aborts a run.

use crate::classifier::{Classification, classify};
use crate::error::Result;
use crate::fetch::FetchSource;
use crate::model::{Category, ChangeEvent, ClassifiedUpdate, diff_snapshots};
use crate::notify::Notifier;
use crate::publish::Publisher;
use crate::rollback::RollbackResolver;
use crate::snapshot::SnapshotStore;
use chrono::Local;
use tracing::{debug, info, warn};

/// Counters for one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub categories: usize,
    pub changes: usize,
    pub rolled_back: usize,
    pub delivered: usize,
    pub failed_deliveries: usize,
    pub published: bool,
}

/// The wired-up pipeline for a run
pub struct Tracker {
    store: SnapshotStore,
    categories: Vec<Category>,
    fetcher: Box<dyn FetchSource>,
    resolver: RollbackResolver,
    notifier: Notifier,
    publisher: Box<dyn Publisher>,
}

impl Tracker {
    pub fn new(
        store: SnapshotStore,
        categories: Vec<Category>,
        fetcher: Box<dyn FetchSource>,
        resolver: RollbackResolver,
        notifier: Notifier,
        publisher: Box<dyn Publisher>,
    ) -> Self {
        Self {
            store,
            categories,
            fetcher,
            resolver,
            notifier,
            publisher,
        }
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    /// Execute one full run
    pub fn run(&self) -> Result<RunSummary> {
        let started = Local::now();
        let mut summary = RunSummary {
            categories: self.categories.len(),
            ..RunSummary::default()
        };

        self.store.prepare(&self.categories)?;

        let batches = self
            .categories
            .iter()
            .map(|category| self.process_category(*category))
            .collect::<Result<Vec<_>>>()?;
        let changes: Vec<ChangeEvent> = batches.concat();
        summary.changes = changes.len();

        if changes.is_empty() {
            info!("No new updates found!");
        }

        for event in changes {
            let update = self.resolve(event);
            if update.rolled_back {
                summary.rolled_back += 1;
            }
            let report = self.notifier.notify(&update);
            summary.delivered += report.delivered();
            summary.failed_deliveries += report.failed();
        }

        let paths = self.store.current_paths(&self.categories);
        match self.publisher.publish(&paths, started) {
            Ok(()) => summary.published = true,
            Err(e) => warn!("Publishing snapshots failed: {}", e),
        }

        match self.store.cleanup_previous(&self.categories) {
            Ok(removed) => debug!("Removed {} previous snapshots", removed),
            Err(e) => warn!("Cleaning up previous snapshots failed: {}", e),
        }

        info!(
            "Run finished: {} changes, {} rolled back, {} deliveries failed",
            summary.changes, summary.rolled_back, summary.failed_deliveries
        );
        Ok(summary)
    }

    /// Fetch, merge, persist and diff one category
    pub fn process_category(&self, category: Category) -> Result<Vec<ChangeEvent>> {
        let dir = self.store.category_dir(category);
        if let Err(e) = self.fetcher.fetch(category, &dir) {
            warn!("Fetching {} failed, using the files present: {}", category, e);
        }

        let merged = self.store.merge(category)?;
        let previous = self.store.load_previous(category);

        let current = match previous.as_ref() {
            Some(previous) if merged.is_empty() && !previous.is_empty() => {
                warn!(
                    "{} came back empty, keeping the previous {} records",
                    category,
                    previous.len()
                );
                previous.clone()
            }
            _ => merged,
        };
        self.store.write_current(category, &current)?;

        let diff = diff_snapshots(previous.as_ref(), &current);
        debug!(
            "{}: {} changes ({:?} diff)",
            category,
            diff.changes.len(),
            diff.strategy
        );
        let changes = diff.into_changes();
        for change in &changes {
            let record = &change.record;
            let found = Classification::from_parts(&record.filename, &record.version);
            if found.branch != category.branch()
                || found.package_type != category.package_type()
            {
                warn!(
                    "{}: {} {} was fetched as {}",
                    record.codename, found.branch, found.package_type, category
                );
            }
        }
        Ok(changes)
    }

    /// Classify a change and look up whether it is a rollback
    pub fn resolve(&self, event: ChangeEvent) -> ClassifiedUpdate {
        let record = event.record;
        let classification = classify(&record);
        let rolled_back = self.resolver.is_rolled_back(
            &record.codename,
            &record.filename,
            &record.version,
            classification.branch,
        );
        ClassifiedUpdate::new(record, classification, rolled_back)
    }
}
