// src/cli.rs
//! CLI definitions for the tracker
//!
//! This module contains all command-line interface definitions using clap.
//! The actual command implementations are in the `commands` module.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "miui-tracker")]
#[command(author = "XiaomiFirmwareUpdater")]
#[command(version)]
#[command(about = "Track MIUI firmware releases and announce new updates", long_about = None)]
pub struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run one tracking pass: fetch, diff, notify, publish
    Run {
        /// Path to the configuration file (default: ./tracker.toml if present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// State directory, overriding the configuration
        #[arg(short, long)]
        root: Option<PathBuf>,

        /// Log messages instead of sending them; implies --no-publish
        #[arg(long)]
        dry_run: bool,

        /// Leave the new snapshots uncommitted
        #[arg(long)]
        no_publish: bool,
    },

    /// Show the version changes between two snapshot files
    Diff {
        /// Previous snapshot
        old: PathBuf,

        /// Current snapshot
        new: PathBuf,
    },

    /// Show the branch, region and package type of a release
    Classify {
        /// Package file name
        filename: String,

        /// Version string
        version: String,
    },

    /// Check a version against the history archive
    Rollback {
        /// Device codename (variant suffixes are stripped)
        codename: String,

        /// Package file name
        filename: String,

        /// Version string
        version: String,

        /// Path to the configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Print both notification renderings of an update record
    Render {
        /// Record as inline JSON or a path to a JSON file
        record: String,

        /// Render as a rolled back update
        #[arg(long)]
        rolled_back: bool,
    },
}
