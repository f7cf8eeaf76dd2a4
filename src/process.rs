// src/process.rs

//! Running external commands with a timeout

use crate::error::{Error, Result};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::process::{Command, ExitStatus, Stdio};
use std::time::Duration;
use wait_timeout::ChildExt;

/// Captured result of a finished command
#[derive(Debug)]
pub struct CommandOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status.success()
    }
}

/// Run `command` to completion, killing it after `timeout`.
///
/// Output goes to anonymous temp files rather than pipes, so a chatty
/// child cannot block on a full pipe while we wait for it. `label` names
/// the command in errors and must not contain secrets.
pub fn run_with_timeout(
    command: &mut Command,
    timeout: Duration,
    label: &str,
) -> Result<CommandOutput> {
    let mut stdout_file = tempfile::tempfile()?;
    let mut stderr_file = tempfile::tempfile()?;

    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::from(stdout_file.try_clone()?))
        .stderr(Stdio::from(stderr_file.try_clone()?))
        .spawn()
        .map_err(|e| Error::CommandFailed(format!("Failed to spawn '{label}': {e}")))?;

    let status = match child.wait_timeout(timeout)? {
        Some(status) => status,
        None => {
            // Best effort; the child may have exited in the meantime
            let _ = child.kill();
            let _ = child.wait();
            return Err(Error::Timeout {
                command: label.to_string(),
                secs: timeout.as_secs(),
            });
        }
    };

    Ok(CommandOutput {
        status,
        stdout: read_back(&mut stdout_file)?,
        stderr: read_back(&mut stderr_file)?,
    })
}

fn read_back(file: &mut File) -> Result<String> {
    file.seek(SeekFrom::Start(0))?;
    let mut buf = Vec::new();
    file.read_to_end(&mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
