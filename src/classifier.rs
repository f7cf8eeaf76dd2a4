// src/classifier.rs

//! Release classification from filename and version strings
//!
//! Firmware records carry no structured metadata about their release
//! track, region or package format. Those attributes are encoded in the
//! artifact filename and the version string, and are recovered here with
//! ordered substring rules. Rules are evaluated first-match-wins: several
//! markers are substrings of others (`global` appears inside
//! `eea_global`), so the more specific rules must come first.

use crate::model::UpdateRecord;

/// Release track of an update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Branch {
    Stable,
    Weekly,
}

impl Branch {
    /// Character whose presence in a version string marks a stable build
    pub const STABLE_MARKER: char = 'V';

    /// Stable builds carry a `V` in their version (`V12.0.1.0.RJCMIXM`),
    /// weekly builds do not (`20.3.26`).
    pub fn from_version(version: &str) -> Self {
        if version.contains(Self::STABLE_MARKER) {
            Self::Stable
        } else {
            Self::Weekly
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stable => "Stable",
            Self::Weekly => "Weekly",
        }
    }

    /// Key used for this branch by the history archive
    pub fn archive_key(&self) -> &'static str {
        match self {
            Self::Stable => "stable",
            Self::Weekly => "weekly",
        }
    }
}

impl std::fmt::Display for Branch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Distribution region of an update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    China,
    Global,
    India,
    Russia,
    EeaGlobal,
}

impl Region {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::China => "China",
            Self::Global => "Global",
            Self::India => "India",
            Self::Russia => "Russia",
            Self::EeaGlobal => "EEA Global",
        }
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Artifact format of an update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PackageType {
    Recovery,
    Fastboot,
}

impl PackageType {
    /// Fastboot images ship as `.tgz` archives; everything else is a
    /// recovery zip.
    pub fn from_filename(filename: &str) -> Self {
        if filename.ends_with(".tgz") {
            Self::Fastboot
        } else {
            Self::Recovery
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Recovery => "Recovery",
            Self::Fastboot => "Fastboot",
        }
    }
}

impl std::fmt::Display for PackageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A region rule: matches when the filename contains any of its markers
#[derive(Debug, Clone, Copy)]
pub struct RegionRule {
    pub markers: &'static [&'static str],
    pub region: Region,
}

impl RegionRule {
    pub fn matches(&self, filename: &str) -> bool {
        self.markers.iter().any(|marker| filename.contains(marker))
    }
}

/// Region rules for announcements, in precedence order
///
/// Matching is case-sensitive: `EU` is a marker, `eu` is not.
pub const REGION_RULES: &[RegionRule] = &[
    RegionRule {
        markers: &["eea_global", "EU"],
        region: Region::EeaGlobal,
    },
    RegionRule {
        markers: &["in_global", "IN"],
        region: Region::India,
    },
    RegionRule {
        markers: &["ru_global", "RU"],
        region: Region::Russia,
    },
    RegionRule {
        markers: &["global", "MI"],
        region: Region::Global,
    },
];

/// Region rules for history archive lookups
///
/// The archive only distinguishes Global from China builds.
pub const ARCHIVE_REGION_RULES: &[RegionRule] = &[RegionRule {
    markers: &["MI", "Global"],
    region: Region::Global,
}];

/// Region used when no rule matches
pub const DEFAULT_REGION: Region = Region::China;

/// Evaluate `rules` in order and return the first matching region
pub fn match_region(rules: &[RegionRule], filename: &str) -> Region {
    rules
        .iter()
        .find(|rule| rule.matches(filename))
        .map(|rule| rule.region)
        .unwrap_or(DEFAULT_REGION)
}

/// Announcement region of a filename
pub fn region_of(filename: &str) -> Region {
    match_region(REGION_RULES, filename)
}

/// Two-way region of a filename as recorded in the history archive
pub fn archive_region_of(filename: &str) -> Region {
    match_region(ARCHIVE_REGION_RULES, filename)
}

/// Derived attributes of one update record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub branch: Branch,
    pub region: Region,
    pub package_type: PackageType,
}

impl Classification {
    pub fn from_parts(filename: &str, version: &str) -> Self {
        Self {
            branch: Branch::from_version(version),
            region: region_of(filename),
            package_type: PackageType::from_filename(filename),
        }
    }
}

/// Classify an update record. Every record gets exactly one classification.
pub fn classify(record: &UpdateRecord) -> Classification {
    Classification::from_parts(&record.filename, &record.version)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_branch_from_version() {
        assert_eq!(Branch::from_version("V12.0.1.0.RJCMIXM"), Branch::Stable);
        assert_eq!(Branch::from_version("V11.0.3.0.QFKCNXM"), Branch::Stable);
        assert_eq!(Branch::from_version("20.3.26"), Branch::Weekly);
        assert_eq!(Branch::from_version(""), Branch::Weekly);
        // Lowercase v is not the marker
        assert_eq!(Branch::from_version("v12.0.1"), Branch::Weekly);
    }

    #[test]
    fn test_branch_archive_key() {
        assert_eq!(Branch::Stable.archive_key(), "stable");
        assert_eq!(Branch::Weekly.archive_key(), "weekly");
    }

    #[test]
    fn test_region_first_match_wins() {
        // Also contains in_global, which would be India further down the list
        assert_eq!(region_of("xiaomi_eea_global_in_global.tgz"), Region::EeaGlobal);
        // Contains "global" too, but ru_global is checked first
        assert_eq!(region_of("cactus_ru_global_images.tgz"), Region::Russia);
        assert_eq!(region_of("davinci_in_global_images.tgz"), Region::India);
    }

    #[test]
    fn test_region_uppercase_markers() {
        assert_eq!(
            region_of("miui_MIA2EUGlobal_V11.0.3.0.PDIEUXM.zip"),
            Region::EeaGlobal
        );
        assert_eq!(region_of("miui_HMNote8INGlobal_V12.zip"), Region::India);
        assert_eq!(region_of("miui_MI9RUGlobal_V12.zip"), Region::Russia);
        assert_eq!(region_of("miui_MI9Global_V12.0.1.0.zip"), Region::Global);
    }

    #[test]
    fn test_region_markers_are_case_sensitive() {
        // "eu" is not "EU"; falls through to the plain global rule
        assert_eq!(region_of("xiaomi.eu_global.tgz"), Region::Global);
    }

    #[test]
    fn test_region_default_china() {
        assert_eq!(region_of("miui_CACTUS_20.3.26_c3b6a3d0_9.0.zip"), Region::China);
        assert_eq!(region_of(""), Region::China);
    }

    #[test]
    fn test_archive_region_two_way() {
        assert_eq!(archive_region_of("miui_MI9Global_V12.zip"), Region::Global);
        assert_eq!(archive_region_of("cactus_Global_images.tgz"), Region::Global);
        // Lowercase "global" is not an archive marker
        assert_eq!(archive_region_of("cactus_global_images.tgz"), Region::China);
        // Five-way markers collapse: EEA builds with MI in the name are Global
        assert_eq!(archive_region_of("miui_MIA2EUGlobal.zip"), Region::Global);
    }

    #[test]
    fn test_each_rule_matches_its_own_markers() {
        for rule in REGION_RULES {
            for marker in rule.markers {
                let filename = format!("x_{marker}_y.zip");
                assert!(rule.matches(&filename), "{marker} should match its rule");
            }
        }
    }

    #[test]
    fn test_package_type() {
        assert_eq!(
            PackageType::from_filename("cactus_images_V11.0.tgz"),
            PackageType::Fastboot
        );
        assert_eq!(
            PackageType::from_filename("miui_CACTUS_V11.0.zip"),
            PackageType::Recovery
        );
        assert_eq!(PackageType::from_filename(""), PackageType::Recovery);
    }

    #[test]
    fn test_classify_record() {
        let record = UpdateRecord {
            filename: "xiaomi_eea_global_in_global.tgz".to_string(),
            version: "V12.0.1.0.RJCMIXM".to_string(),
            ..Default::default()
        };
        let c = classify(&record);
        assert_eq!(c.branch, Branch::Stable);
        assert_eq!(c.region, Region::EeaGlobal);
        assert_eq!(c.package_type, PackageType::Fastboot);
    }

    #[test]
    fn test_display_labels() {
        assert_eq!(Region::EeaGlobal.to_string(), "EEA Global");
        assert_eq!(Branch::Weekly.to_string(), "Weekly");
        assert_eq!(PackageType::Fastboot.to_string(), "Fastboot");
    }
}
