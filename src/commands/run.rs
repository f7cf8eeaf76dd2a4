// src/commands/run.rs

//! The `run` command: one full tracking pass

use anyhow::{Context, Result};
use miui_tracker::config::{TrackerConfig, env_secret};
use miui_tracker::notify::Notifier;
use miui_tracker::publish::{NoopPublisher, Publisher};
use miui_tracker::{SnapshotStore, Tracker};
use std::path::Path;
use tracing::info;

/// Run the tracker once
pub fn cmd_run(
    config_path: Option<&Path>,
    root: Option<&Path>,
    dry_run: bool,
    no_publish: bool,
) -> Result<()> {
    let mut config = TrackerConfig::load_or_default(config_path)?;
    if let Some(root) = root {
        config.storage.root = root.to_path_buf();
    }

    let tracker = build_tracker(&config, dry_run, no_publish)?;
    info!(
        "Tracking {} categories in {}",
        config.storage.categories.len(),
        config.storage.root.display()
    );

    let summary = tracker
        .run()
        .with_context(|| format!("Run failed in {}", config.storage.root.display()))?;

    println!("Categories: {}", summary.categories);
    println!("Changes: {}", summary.changes);
    println!("  Rolled back: {}", summary.rolled_back);
    println!("Messages delivered: {}", summary.delivered);
    if summary.failed_deliveries > 0 {
        println!("Messages failed: {}", summary.failed_deliveries);
    }
    println!("Published: {}", if summary.published { "yes" } else { "no" });

    Ok(())
}

/// Wire up a tracker from configuration. Secrets are only required for
/// the live channels and publisher.
fn build_tracker(config: &TrackerConfig, dry_run: bool, no_publish: bool) -> Result<Tracker> {
    let client = config.http_client()?;
    let resolver = config.rollback_resolver(client.clone());

    let notifier = if dry_run {
        Notifier::dry_run()
    } else {
        config.notifier(client, &env_secret)?
    };

    let publisher: Box<dyn Publisher> = if dry_run || no_publish {
        Box::new(NoopPublisher)
    } else {
        config.publisher(&env_secret)?
    };

    Ok(Tracker::new(
        SnapshotStore::new(&config.storage.root),
        config.storage.categories.clone(),
        config.fetcher(),
        resolver,
        notifier,
        publisher,
    ))
}
