// src/commands/mod.rs
//! Command handlers for the tracker CLI

mod inspect;
mod run;

pub use inspect::{cmd_classify, cmd_diff, cmd_render, cmd_rollback};
pub use run::cmd_run;
