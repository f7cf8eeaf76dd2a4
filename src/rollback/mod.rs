// src/rollback/mod.rs

//! Rollback detection
//!
//! A vendor occasionally re-publishes a build it already shipped, after
//! pulling a newer one. From the snapshot diff alone that looks like any
//! other version change. The history archive tells the two apart: if the
//! same version was already archived for the same device, branch and
//! region, the change is a rollback.
//!
//! Lookups never fail the run. A missing or unreadable archive means the
//! device is being tracked for the first time, and the update is treated
//! as new.

mod archive;

pub use archive::{
    ArchiveEntry, ArchiveError, ArchiveSource, ArchiveVersions, CODENAME_PLACEHOLDER,
    DEFAULT_ARCHIVE_URL_TEMPLATE, HttpArchive, parse_archive,
};

use crate::classifier::{Branch, Region, archive_region_of};
use crate::model::canonical_codename;
use tracing::info;

/// Outcome of a rollback lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollbackVerdict {
    /// Codename the archive was queried with
    pub codename: String,
    /// Two-way region used for matching
    pub region: Region,
    /// Archive entries on the same branch
    pub branch_entries: usize,
    /// False when the archive could not be read
    pub archive_available: bool,
    pub rolled_back: bool,
}

/// Decides whether a changed version was already shipped before
pub struct RollbackResolver {
    archive: Box<dyn ArchiveSource>,
}

impl RollbackResolver {
    pub fn new(archive: Box<dyn ArchiveSource>) -> Self {
        Self { archive }
    }

    /// Whether `version` is already archived for this device, branch and region
    pub fn is_rolled_back(
        &self,
        codename: &str,
        filename: &str,
        version: &str,
        branch: Branch,
    ) -> bool {
        self.verdict(codename, filename, version, branch).rolled_back
    }

    /// Full lookup result, for reporting
    pub fn verdict(
        &self,
        codename: &str,
        filename: &str,
        version: &str,
        branch: Branch,
    ) -> RollbackVerdict {
        let codename = canonical_codename(codename);
        let region = archive_region_of(filename);

        let (history, archive_available) = match self.archive.fetch(codename) {
            Ok(history) => (history, true),
            Err(e) => {
                info!("Working on {} for the first time! ({})", codename, e);
                (Vec::new(), false)
            }
        };

        let on_branch: Vec<&ArchiveEntry> = history
            .iter()
            .filter(|entry| entry.branch == branch.archive_key())
            .collect();

        let rolled_back = on_branch
            .iter()
            .any(|entry| entry.versions.miui == version && entry.region == region.as_str());

        if rolled_back {
            info!("{}: {} is rolled back ROM!", codename, version);
        }

        RollbackVerdict {
            codename: codename.to_string(),
            region,
            branch_entries: on_branch.len(),
            archive_available,
            rolled_back,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Archive fake that records which codenames were requested
    struct FakeArchive {
        result: fn() -> Result<Vec<ArchiveEntry>, ArchiveError>,
        requested: std::rc::Rc<RefCell<Vec<String>>>,
    }

    impl ArchiveSource for FakeArchive {
        fn fetch(&self, codename: &str) -> Result<Vec<ArchiveEntry>, ArchiveError> {
            self.requested.borrow_mut().push(codename.to_string());
            (self.result)()
        }
    }

    fn entry(branch: &str, region: &str, miui: &str) -> ArchiveEntry {
        ArchiveEntry {
            branch: branch.to_string(),
            region: region.to_string(),
            versions: ArchiveVersions {
                miui: miui.to_string(),
            },
        }
    }

    fn cactus_history() -> Result<Vec<ArchiveEntry>, ArchiveError> {
        Ok(vec![
            entry("stable", "Global", "V12.0.1.0"),
            entry("weekly", "China", "20.3.26"),
        ])
    }

    fn resolver(
        result: fn() -> Result<Vec<ArchiveEntry>, ArchiveError>,
    ) -> (RollbackResolver, std::rc::Rc<RefCell<Vec<String>>>) {
        let requested = std::rc::Rc::new(RefCell::new(Vec::new()));
        let archive = FakeArchive {
            result,
            requested: requested.clone(),
        };
        (RollbackResolver::new(Box::new(archive)), requested)
    }

    #[test]
    fn test_known_version_is_rollback() {
        let (resolver, requested) = resolver(cactus_history);
        assert!(resolver.is_rolled_back(
            "cactus_eea",
            "miui_MI6AGlobal_V12.0.1.0.zip",
            "V12.0.1.0",
            Branch::Stable
        ));
        assert_eq!(*requested.borrow(), vec!["cactus".to_string()]);
    }

    #[test]
    fn test_unknown_version_is_new() {
        let (resolver, _) = resolver(cactus_history);
        assert!(!resolver.is_rolled_back(
            "cactus_eea",
            "miui_MI6AGlobal_V12.0.2.0.zip",
            "V12.0.2.0",
            Branch::Stable
        ));
    }

    #[test]
    fn test_region_must_match() {
        let (resolver, _) = resolver(cactus_history);
        // No MI/Global marker: China build, archive only has the Global one
        assert!(!resolver.is_rolled_back(
            "cactus",
            "miui_CACTUS_V12.0.1.0.zip",
            "V12.0.1.0",
            Branch::Stable
        ));
    }

    #[test]
    fn test_branch_must_match() {
        let (resolver, _) = resolver(cactus_history);
        assert!(!resolver.is_rolled_back(
            "cactus",
            "miui_CACTUS_20.3.26.zip",
            "20.3.26",
            Branch::Stable
        ));
        assert!(resolver.is_rolled_back(
            "cactus",
            "miui_CACTUS_20.3.26.zip",
            "20.3.26",
            Branch::Weekly
        ));
    }

    #[test]
    fn test_parse_failure_degrades_to_new() {
        let (resolver, _) = resolver(|| Err(ArchiveError::Parse("expected value".to_string())));
        let verdict = resolver.verdict("cactus", "miui_MI6AGlobal.zip", "V12.0.1.0", Branch::Stable);
        assert!(!verdict.rolled_back);
        assert!(!verdict.archive_available);
        assert_eq!(verdict.branch_entries, 0);
    }

    #[test]
    fn test_transport_failure_degrades_to_new() {
        let (resolver, _) = resolver(|| {
            Err(ArchiveError::Transport {
                url: "https://archive.invalid/cactus.json".to_string(),
                reason: "operation timed out".to_string(),
            })
        });
        assert!(!resolver.is_rolled_back("cactus", "MI", "V12.0.1.0", Branch::Stable));
    }

    #[test]
    fn test_archive_is_queried_per_call() {
        let (resolver, requested) = resolver(cactus_history);
        resolver.is_rolled_back("cactus", "MI", "V12.0.1.0", Branch::Stable);
        resolver.is_rolled_back("cactus", "MI", "V12.0.1.0", Branch::Stable);
        assert_eq!(requested.borrow().len(), 2);
    }

    #[test]
    fn test_verdict_reports_branch_entries() {
        let (resolver, _) = resolver(cactus_history);
        let verdict = resolver.verdict("cactus_global", "MI", "V12.0.9.0", Branch::Stable);
        assert_eq!(verdict.codename, "cactus");
        assert_eq!(verdict.region, Region::Global);
        assert_eq!(verdict.branch_entries, 1);
        assert!(verdict.archive_available);
    }
}
