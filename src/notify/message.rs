// src/notify/message.rs

//! Announcement rendering
//!
//! One canonical message is rendered per update. The second channel's
//! rendering is derived from it mechanically, so the two can never drift.

use crate::model::ClassifiedUpdate;

/// Tag line closing every primary message
pub const CHANNEL_TAG: &str = "@MIUIUpdatesTracker | @XiaomiFirmwareUpdater";

/// Line that replaces the tag line in the secondary rendering
pub const SEPARATOR: &str = "~~                                                     ~~";

/// Both renderings of one announcement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Markdown with single `*` emphasis, for the primary channel
    pub primary: String,
    /// Doubled `**` emphasis and a separator instead of the tag line
    pub secondary: String,
}

impl Message {
    pub fn render(update: &ClassifiedUpdate) -> Self {
        let primary = render_primary(update);
        let secondary = derive_secondary(&primary);
        Self { primary, secondary }
    }
}

/// Headline of an announcement
pub fn headline(update: &ClassifiedUpdate) -> String {
    if update.rolled_back {
        format!("Rolled back {} {} update!", update.branch, update.package_type)
    } else {
        format!("New {} {} update available!", update.branch, update.package_type)
    }
}

/// Render the canonical message
pub fn render_primary(update: &ClassifiedUpdate) -> String {
    let record = &update.record;
    format!(
        "{headline}\n\
         *Device:* {device}\n\
         *Codename:* #{codename}\n\
         *Region:* {region}\n\
         *Version:* `{version}`\n\
         *Android:* {android}\n\
         *Download*: [Here]({download})\n\
         {tag}",
        headline = headline(update),
        device = record.device,
        codename = update.canonical_codename(),
        region = update.region,
        version = record.version,
        android = record.android,
        download = record.download,
        tag = CHANNEL_TAG,
    )
}

/// Derive the secondary rendering from the canonical one
pub fn derive_secondary(primary: &str) -> String {
    primary.replace('*', "**").replace(CHANNEL_TAG, SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{Branch, PackageType, Region};
    use crate::model::UpdateRecord;

    fn update(rolled_back: bool) -> ClassifiedUpdate {
        ClassifiedUpdate {
            record: UpdateRecord {
                device: "Redmi 6A".to_string(),
                codename: "cactus_global".to_string(),
                version: "V11.0.3.0.PCBMIXM".to_string(),
                android: "9.0".to_string(),
                filename: "cactus_global_images_V11.0.3.0.PCBMIXM.tgz".to_string(),
                download: "https://bigota.d.miui.com/V11.0.3.0.PCBMIXM/cactus.tgz".to_string(),
            },
            branch: Branch::Stable,
            region: Region::Global,
            package_type: PackageType::Fastboot,
            rolled_back,
        }
    }

    #[test]
    fn test_primary_layout() {
        let expected = "New Stable Fastboot update available!\n\
            *Device:* Redmi 6A\n\
            *Codename:* #cactus\n\
            *Region:* Global\n\
            *Version:* `V11.0.3.0.PCBMIXM`\n\
            *Android:* 9.0\n\
            *Download*: [Here](https://bigota.d.miui.com/V11.0.3.0.PCBMIXM/cactus.tgz)\n\
            @MIUIUpdatesTracker | @XiaomiFirmwareUpdater";
        assert_eq!(render_primary(&update(false)), expected);
    }

    #[test]
    fn test_rolled_back_headline() {
        let message = render_primary(&update(true));
        assert!(message.starts_with("Rolled back Stable Fastboot update!\n"));
        assert!(!message.contains("available"));
    }

    #[test]
    fn test_render_is_deterministic() {
        assert_eq!(Message::render(&update(false)), Message::render(&update(false)));
    }

    #[test]
    fn test_secondary_is_derived() {
        let message = Message::render(&update(false));
        assert_eq!(message.secondary, derive_secondary(&message.primary));
        assert!(message.secondary.contains("**Device:** Redmi 6A"));
        assert!(message.secondary.ends_with(SEPARATOR));
        assert!(!message.secondary.contains(CHANNEL_TAG));
    }

    #[test]
    fn test_secondary_emphasis_is_doubled() {
        let mut u = update(false);
        u.record.device = "Redmi *Note* 8".to_string();
        let secondary = Message::render(&u).secondary;
        // Every run of asterisks has even length
        for run in secondary.split(|c| c != '*').filter(|run| !run.is_empty()) {
            assert_eq!(run.len() % 2, 0, "odd emphasis run in {secondary}");
        }
    }

    #[test]
    fn test_separator_shape() {
        assert_eq!(SEPARATOR.len(), 57);
        assert!(SEPARATOR.starts_with("~~") && SEPARATOR.ends_with("~~"));
        assert!(SEPARATOR[2..55].chars().all(|c| c == ' '));
    }
}
