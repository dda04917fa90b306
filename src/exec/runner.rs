// src/exec/runner.rs

//! The `Runner` abstraction shared by both execution backends.

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use crate::command::Command;
use crate::errors::Result;
use crate::runlog::RunLog;
use crate::types::{RunnerKind, TerminalState};

/// Resolved submission parameters, computed by the handler before the
/// runner's submission protocol starts.
#[derive(Debug, Clone)]
pub struct SubmitContext {
    /// Run-set name the resulting run log is appended to.
    pub runset_name: String,
    /// Resolved stdout file path.
    pub stdout_path: PathBuf,
    /// Resolved stderr file path.
    pub stderr_path: PathBuf,
}

/// Trait abstracting how commands are submitted and how their status is
/// derived.
///
/// Production code uses [`DirectRunner`](crate::exec::DirectRunner) or
/// [`SlurmRunner`](crate::exec::SlurmRunner); tests can provide their own
/// implementation that doesn't spawn real processes.
pub trait Runner: Send + Sync {
    /// Which backend variant this runner is; recorded on every run log it
    /// creates.
    fn kind(&self) -> RunnerKind;

    /// Run the submission protocol for `cmd`.
    ///
    /// The external submit call and the persistence write execute in a
    /// detached task; this future resolves only once the new run log is
    /// retrievable from the store (or the submission failed). On success the
    /// returned run log has already been persisted.
    fn submit<'a>(
        &'a self,
        cmd: &'a Command,
        ctx: &'a SubmitContext,
    ) -> Pin<Box<dyn Future<Output = Result<RunLog>> + Send + 'a>>;

    /// Run the status-check protocol against a previously persisted run log.
    ///
    /// `None` means "not terminal yet, re-poll later"; this covers both live
    /// jobs and jobs whose terminal record has not propagated. The call is
    /// side-effect-free and idempotent.
    fn check_status<'a>(
        &'a self,
        runlog: &'a RunLog,
    ) -> Pin<Box<dyn Future<Output = Result<Option<TerminalState>>> + Send + 'a>>;
}
