// src/publish.rs

//! Publishing snapshots for the next run
//!
//! The current snapshots are committed to a git repository and pushed, so
//! the next run (possibly on another machine) compares against them.

use crate::error::{Error, Result};
use crate::process::{CommandOutput, run_with_timeout};
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;
use tracing::{debug, info};

/// Persists the current snapshots somewhere durable
pub trait Publisher {
    /// Publish `paths`; `started` is when the run began
    fn publish(&self, paths: &[PathBuf], started: DateTime<Local>) -> Result<()>;
}

/// Used with `--no-publish`
pub struct NoopPublisher;

impl Publisher for NoopPublisher {
    fn publish(&self, paths: &[PathBuf], _started: DateTime<Local>) -> Result<()> {
        info!("Publishing disabled, leaving {} snapshot files uncommitted", paths.len());
        Ok(())
    }
}

/// Commit message for a run
pub fn commit_message(started: DateTime<Local>) -> String {
    format!("sync: {}", started.format("%Y-%m-%d %H:%M:%S"))
}

/// Build an authenticated GitHub push URL
pub fn github_remote(repository: &str, token: &str) -> String {
    format!("https://{token}@github.com/{repository}.git")
}

/// Commits and pushes snapshot files with git
#[derive(Debug, Clone)]
pub struct GitPublisher {
    repo_dir: PathBuf,
    remote: String,
    branch: String,
    author_name: String,
    author_email: String,
    /// Redacted from any output that ends up in errors or logs
    secret: Option<String>,
    timeout: Duration,
}

impl GitPublisher {
    pub fn new(
        repo_dir: impl Into<PathBuf>,
        remote: impl Into<String>,
        branch: impl Into<String>,
    ) -> Self {
        Self {
            repo_dir: repo_dir.into(),
            remote: remote.into(),
            branch: branch.into(),
            author_name: "XiaomiFirmwareUpdater".to_string(),
            author_email: "xiaomifirmwareupdater@gmail.com".to_string(),
            secret: None,
            timeout: Duration::from_secs(120),
        }
    }

    pub fn with_author(mut self, name: impl Into<String>, email: impl Into<String>) -> Self {
        self.author_name = name.into();
        self.author_email = email.into();
        self
    }

    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = Some(secret.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn redact(&self, text: &str) -> String {
        match &self.secret {
            Some(secret) if !secret.is_empty() => text.replace(secret.as_str(), "***"),
            _ => text.to_string(),
        }
    }

    fn git(&self, args: &[&str], label: &str) -> Result<CommandOutput> {
        let mut command = Command::new("git");
        command.arg("-C").arg(&self.repo_dir).args(args);
        run_with_timeout(&mut command, self.timeout, label)
    }

    fn check(&self, output: CommandOutput, label: &str) -> Result<CommandOutput> {
        if output.success() {
            Ok(output)
        } else {
            Err(Error::CommandFailed(format!(
                "{label} exited with {}: {}",
                output.status,
                self.redact(output.stderr.trim())
            )))
        }
    }
}

impl Publisher for GitPublisher {
    fn publish(&self, paths: &[PathBuf], started: DateTime<Local>) -> Result<()> {
        if paths.is_empty() {
            info!("No snapshot files to publish");
            return Ok(());
        }

        let mut add_args = vec!["add".to_string(), "--".to_string()];
        add_args.extend(paths.iter().map(|p| relative_to(p, &self.repo_dir)));
        let add_args: Vec<&str> = add_args.iter().map(String::as_str).collect();
        let output = self.git(&add_args, "git add")?;
        self.check(output, "git add")?;

        let name = format!("user.name={}", self.author_name);
        let email = format!("user.email={}", self.author_email);
        let message = commit_message(started);
        let output = self.git(
            &["-c", name.as_str(), "-c", email.as_str(), "commit", "-m", message.as_str()],
            "git commit",
        )?;
        if !output.success() {
            if !output.stdout.contains("nothing to commit") {
                self.check(output, "git commit")?;
            }
            // An earlier commit may still be waiting for its push
            info!("Snapshots unchanged, pushing any pending commits");
        }

        let refspec = format!("HEAD:{}", self.branch);
        let output = self.git(
            &["push", "-q", self.remote.as_str(), refspec.as_str()],
            "git push",
        )?;
        self.check(output, "git push")?;

        info!("Published snapshots: {}", message);
        debug!("Pushed {} files to {}", paths.len(), self.redact(&self.remote));
        Ok(())
    }
}

/// Path of `path` relative to `base` when it lies inside it
fn relative_to(path: &Path, base: &Path) -> String {
    path.strip_prefix(base)
        .unwrap_or(path)
        .to_string_lossy()
        .into_owned()
}
