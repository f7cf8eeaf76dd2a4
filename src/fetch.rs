// src/fetch.rs

//! Fetch layer boundary
//!
//! Querying the vendor's update servers is done by external fetchers, one
//! strategy per package family. A fetcher leaves one `<device>.json` file
//! per device with a known release in the category directory; the merge
//! step picks them up from there.

use crate::error::{Error, Result};
use crate::model::Category;
use crate::process::run_with_timeout;
use std::path::Path;
use std::process::Command;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Placeholder replaced by the category name in fetch command arguments
pub const CATEGORY_PLACEHOLDER: &str = "{category}";

/// Placeholder replaced by the category directory in fetch command arguments
pub const DIR_PLACEHOLDER: &str = "{dir}";

/// Produces the per-device records of a category
pub trait FetchSource {
    /// Populate `dest_dir` with one `<device>.json` file per device
    fn fetch(&self, category: Category, dest_dir: &Path) -> Result<()>;
}

/// Used when another process already populated the category directories
pub struct NoopFetcher;

impl FetchSource for NoopFetcher {
    fn fetch(&self, category: Category, _dest_dir: &Path) -> Result<()> {
        debug!("No fetch command configured for {}", category);
        Ok(())
    }
}

/// Runs a configured fetch program once per category
#[derive(Debug, Clone)]
pub struct CommandFetcher {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandFetcher {
    /// Build a fetcher from an argv list; `None` when the list is empty
    pub fn from_argv(argv: &[String], timeout: Duration) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
            timeout,
        })
    }

    /// Arguments with placeholders substituted
    pub fn args_for(&self, category: Category, dest_dir: &Path) -> Vec<String> {
        let dir = dest_dir.to_string_lossy();
        self.args
            .iter()
            .map(|arg| {
                arg.replace(CATEGORY_PLACEHOLDER, category.name())
                    .replace(DIR_PLACEHOLDER, &dir)
            })
            .collect()
    }
}

impl FetchSource for CommandFetcher {
    fn fetch(&self, category: Category, dest_dir: &Path) -> Result<()> {
        let args = self.args_for(category, dest_dir);
        debug!("Executing: {} {:?}", self.program, args);

        let output = run_with_timeout(
            Command::new(&self.program)
                .args(&args)
                .env("TRACKER_CATEGORY", category.name()),
            self.timeout,
            &self.program,
        )?;

        for line in output.stdout.lines() {
            debug!("[fetch {}] {}", category, line);
        }
        for line in output.stderr.lines() {
            warn!("[fetch {}] {}", category, line);
        }

        if !output.success() {
            return Err(Error::CommandFailed(format!(
                "{} exited with {} for {}",
                self.program, output.status, category
            )));
        }

        info!("Fetched {}", category.name().replace('_', " "));
        Ok(())
    }
}
