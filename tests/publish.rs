// tests/publish.rs

//! Publishing snapshots to a local bare repository with the git CLI.

use chrono::Local;
use miui_tracker::publish::{GitPublisher, Publisher};
use std::path::Path;
use std::process::Command;

fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git").arg("-C").arg(dir).args(args).output().unwrap();
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

#[test]
fn test_git_publisher_commits_and_pushes() {
    if !git_available() {
        eprintln!("Skipping git publish test: git not found");
        return;
    }

    let temp = tempfile::tempdir().unwrap();
    let remote = temp.path().join("remote.git");
    let work = temp.path().join("work");
    std::fs::create_dir_all(&remote).unwrap();
    std::fs::create_dir_all(work.join("stable_fastboot")).unwrap();
    git(&remote, &["init", "-q", "--bare"]);
    git(&work, &["init", "-q"]);

    let snapshot = work.join("stable_fastboot").join("stable_fastboot.json");
    std::fs::write(&snapshot, "[\n {\n  \"codename\": \"cactus\"\n }\n]\n").unwrap();

    let publisher = GitPublisher::new(&work, remote.to_string_lossy(), "master")
        .with_author("Tracker Bot", "bot@example.com");
    publisher.publish(&[snapshot.clone()], Local::now()).unwrap();

    let subject = git(&remote, &["log", "-1", "--format=%s", "master"]);
    assert!(subject.starts_with("sync: "), "unexpected subject: {subject}");
    let author = git(&remote, &["log", "-1", "--format=%an <%ae>", "master"]);
    assert_eq!(author, "Tracker Bot <bot@example.com>");
    let files = git(&remote, &["ls-tree", "-r", "--name-only", "master"]);
    assert_eq!(files, "stable_fastboot/stable_fastboot.json");

    // Unchanged snapshots are not an error and add no commit
    publisher.publish(&[snapshot], Local::now()).unwrap();
    let count = git(&remote, &["rev-list", "--count", "master"]);
    assert_eq!(count, "1");
}

#[test]
fn test_git_publisher_reports_push_failure() {
    if !git_available() {
        eprintln!("Skipping git publish test: git not found");
        return;
    }

    let temp = tempfile::tempdir().unwrap();
    let work = temp.path().join("work");
    std::fs::create_dir_all(&work).unwrap();
    git(&work, &["init", "-q"]);

    let snapshot = work.join("weekly_fastboot.json");
    std::fs::write(&snapshot, "[]\n").unwrap();

    let missing = temp.path().join("missing.git");
    let publisher = GitPublisher::new(&work, missing.to_string_lossy(), "master")
        .with_author("Tracker Bot", "bot@example.com");
    let result = publisher.publish(&[snapshot], Local::now());
    assert!(matches!(result, Err(miui_tracker::Error::CommandFailed(_))));
}

#[test]
fn test_git_publisher_pushes_commit_left_by_failed_push() {
    if !git_available() {
        eprintln!("Skipping git publish test: git not found");
        return;
    }

    let temp = tempfile::tempdir().unwrap();
    let remote = temp.path().join("remote.git");
    let work = temp.path().join("work");
    std::fs::create_dir_all(&work).unwrap();
    git(&work, &["init", "-q"]);

    let snapshot = work.join("stable_fastboot.json");
    std::fs::write(&snapshot, "[]\n").unwrap();

    let publisher = GitPublisher::new(&work, remote.to_string_lossy(), "master")
        .with_author("Tracker Bot", "bot@example.com");

    // Commit lands locally, push fails
    assert!(publisher.publish(&[snapshot.clone()], Local::now()).is_err());
    assert_eq!(git(&work, &["rev-list", "--count", "HEAD"]), "1");

    // Remote comes back, snapshot unchanged
    std::fs::create_dir_all(&remote).unwrap();
    git(&remote, &["init", "-q", "--bare"]);
    publisher.publish(&[snapshot], Local::now()).unwrap();

    let count = git(&remote, &["rev-list", "--count", "master"]);
    assert_eq!(count, "1");
    let files = git(&remote, &["ls-tree", "-r", "--name-only", "master"]);
    assert_eq!(files, "stable_fastboot.json");
}
