// src/commands/inspect.rs

//! Inspection commands: look at one stage of the pipeline in isolation

use anyhow::{Context, Result};
use miui_tracker::config::TrackerConfig;
use miui_tracker::notify::Message;
use miui_tracker::snapshot::read_snapshot;
use miui_tracker::{
    Branch, Classification, ClassifiedUpdate, UpdateRecord, classify, diff_snapshots,
};
use std::path::Path;

/// Print the changes between two snapshot files
pub fn cmd_diff(old: &Path, new: &Path) -> Result<()> {
    let old = read_snapshot(old).with_context(|| format!("Failed to load {}", old.display()))?;
    let new = read_snapshot(new).with_context(|| format!("Failed to load {}", new.display()))?;

    let diff = diff_snapshots(Some(&old), &new);
    if diff.is_empty() {
        println!("No changes ({:?} diff).", diff.strategy);
        return Ok(());
    }

    println!("Changes ({}, {:?} diff):", diff.changes.len(), diff.strategy);
    for change in &diff.changes {
        println!(
            "  {}: {} -> {}",
            change.record.codename, change.previous_version, change.record.version
        );
    }
    Ok(())
}

/// Print the classification of a release
pub fn cmd_classify(filename: &str, version: &str) -> Result<()> {
    print_classification(&Classification::from_parts(filename, version));
    Ok(())
}

fn print_classification(classification: &Classification) {
    println!("Branch: {}", classification.branch);
    println!("Region: {}", classification.region);
    println!("Package type: {}", classification.package_type);
}

/// Query the history archive for a version
pub fn cmd_rollback(
    codename: &str,
    filename: &str,
    version: &str,
    config_path: Option<&Path>,
) -> Result<()> {
    let config = TrackerConfig::load_or_default(config_path)?;
    let resolver = config.rollback_resolver(config.http_client()?);

    let verdict = resolver.verdict(codename, filename, version, Branch::from_version(version));
    println!("Device: {}", verdict.codename);
    println!("Region: {}", verdict.region);
    if verdict.archive_available {
        println!("Archived releases on this branch: {}", verdict.branch_entries);
    } else {
        println!("Archive: unavailable");
    }
    println!("Rolled back: {}", if verdict.rolled_back { "yes" } else { "no" });
    Ok(())
}

/// Print both renderings of an update record
pub fn cmd_render(record: &str, rolled_back: bool) -> Result<()> {
    let record = load_record(record)?;
    let update = ClassifiedUpdate::new(record.clone(), classify(&record), rolled_back);
    let message = Message::render(&update);

    println!("{}", message.primary);
    println!();
    println!("{}", message.secondary);
    Ok(())
}

/// Parse a record given inline or as a file path
fn load_record(arg: &str) -> Result<UpdateRecord> {
    let path = Path::new(arg);
    let content = if path.is_file() {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?
    } else {
        arg.to_string()
    };
    serde_json::from_str(&content).context("Invalid update record JSON")
}
