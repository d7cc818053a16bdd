//! A simulated, in-process Git engine for an interactive Git tutorial.
//!
//! This crate models a single-user Git repository (working tree, index,
//! commit DAG, branches, merges, stash) plus a process-wide remote store,
//! driven by a tiny command-line parser and observed by a lesson/validator
//! system. None of it shells out to a real `git` binary, performs real
//! cryptographic hashing, or touches the host filesystem — it is a plausible,
//! teachably-correct model, not a byte-compatible reimplementation.
//!
//! See [`dispatcher::dispatch`] for the single entry point external callers
//! use to drive the engine one command line at a time.

pub mod achievements;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod lesson;
pub mod lessons;
pub mod parser;
pub mod path;
pub mod persistence;
pub mod remote;
pub mod repo;

pub use error::TutorError;
pub use repo::{CommandResult, LastEvent, Repo};

/// Initialize the `log` facade once for the process.
///
/// Mirrors the teacher's one-shot logging setup at process start: callers
/// (typically the `cli` binary) invoke this exactly once before issuing any
/// commands. Library consumers embedding the engine in their own UI are free
/// to install their own `log::Log` implementation instead and skip this.
#[cfg(feature = "cli")]
pub fn init_logging() {
    use std::io::Write;

    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .try_init();
}
