// build.rs

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Common argument: configuration file
fn config_arg() -> Arg {
    Arg::new("config")
        .short('c')
        .long("config")
        .value_name("PATH")
        .help("Path to the configuration file")
}

fn build_cli() -> Command {
    Command::new("miui-tracker")
        .version(env!("CARGO_PKG_VERSION"))
        .author("XiaomiFirmwareUpdater")
        .about("Track MIUI firmware releases and announce new updates")
        .subcommand_required(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Log at debug level unless RUST_LOG says otherwise"),
        )
        .subcommand(
            Command::new("run")
                .about("Run one tracking pass: fetch, diff, notify, publish")
                .arg(config_arg())
                .arg(
                    Arg::new("root")
                        .short('r')
                        .long("root")
                        .value_name("DIR")
                        .help("State directory, overriding the configuration"),
                )
                .arg(
                    Arg::new("dry_run")
                        .long("dry-run")
                        .action(ArgAction::SetTrue)
                        .help("Log messages instead of sending them; implies --no-publish"),
                )
                .arg(
                    Arg::new("no_publish")
                        .long("no-publish")
                        .action(ArgAction::SetTrue)
                        .help("Leave the new snapshots uncommitted"),
                ),
        )
        .subcommand(
            Command::new("diff")
                .about("Show the version changes between two snapshot files")
                .arg(Arg::new("old").required(true).help("Previous snapshot"))
                .arg(Arg::new("new").required(true).help("Current snapshot")),
        )
        .subcommand(
            Command::new("classify")
                .about("Show the branch, region and package type of a release")
                .arg(Arg::new("filename").required(true).help("Package file name"))
                .arg(Arg::new("version").required(true).help("Version string")),
        )
        .subcommand(
            Command::new("rollback")
                .about("Check a version against the history archive")
                .arg(Arg::new("codename").required(true).help("Device codename"))
                .arg(Arg::new("filename").required(true).help("Package file name"))
                .arg(Arg::new("version").required(true).help("Version string"))
                .arg(config_arg()),
        )
        .subcommand(
            Command::new("render")
                .about("Print both notification renderings of an update record")
                .arg(
                    Arg::new("record")
                        .required(true)
                        .help("Record as inline JSON or a path to a JSON file"),
                )
                .arg(
                    Arg::new("rolled_back")
                        .long("rolled-back")
                        .action(ArgAction::SetTrue)
                        .help("Render as a rolled back update"),
                ),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let manifest_dir = match env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(e) => {
            println!("cargo:warning=CARGO_MANIFEST_DIR not set: {}", e);
            return;
        }
    };
    let man_dir = manifest_dir.join("man");

    if let Err(e) = fs::create_dir_all(&man_dir) {
        println!("cargo:warning=Failed to create man directory: {}", e);
        return;
    }

    let man = Man::new(build_cli());
    let mut buffer = Vec::new();

    if let Err(e) = man.render(&mut buffer) {
        println!("cargo:warning=Failed to render man page: {}", e);
        return;
    }

    let man_path = man_dir.join("miui-tracker.1");
    if let Err(e) = fs::write(&man_path, buffer) {
        println!("cargo:warning=Failed to write man page: {}", e);
    }
}
