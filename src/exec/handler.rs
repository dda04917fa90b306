// src/exec/handler.rs

//! The caller's handle for one unit of work.

use std::path::PathBuf;
use std::sync::Arc;

use crate::command::Command;
use crate::errors::{Result, RunsetError};
use crate::exec::runner::{Runner, SubmitContext};
use crate::runlog::RunLog;
use crate::store::RunStore;
use crate::types::TerminalState;

struct Bound {
    cmd: Command,
    runner: Arc<dyn Runner>,
    stdout_path: PathBuf,
    stderr_path: PathBuf,
}

/// Binds a [`Command`], a [`Runner`], and the eventual [`RunLog`].
///
/// Created per submission request and short-lived; only the run log it
/// produces is persisted.
pub struct RunHandler {
    store: Arc<dyn RunStore>,
    runset_name: String,
    bound: Option<Bound>,
    runlog: Option<RunLog>,
}

impl RunHandler {
    /// Create a handler writing into the named run set, or the store's
    /// current run set when no name is given.
    pub fn new(store: Arc<dyn RunStore>, runset_name: Option<String>) -> Self {
        let runset_name = runset_name.unwrap_or_else(|| store.current_runset_name());
        Self {
            store,
            runset_name,
            bound: None,
            runlog: None,
        }
    }

    pub fn runset_name(&self) -> &str {
        &self.runset_name
    }

    /// Associate a command and runner with this handler.
    ///
    /// Output path precedence: paths declared on the command win over
    /// caller-supplied overrides, which win over the store defaults. No
    /// external effect. Rebinding discards any run log from a previous
    /// `start()`.
    pub fn bind_command(
        &mut self,
        cmd: Command,
        runner: Arc<dyn Runner>,
        stdout_override: Option<PathBuf>,
        stderr_override: Option<PathBuf>,
    ) {
        let stdout_path = cmd
            .stdout_path()
            .map(PathBuf::from)
            .or(stdout_override)
            .unwrap_or_else(|| self.store.default_stdout_path());
        let stderr_path = cmd
            .stderr_path()
            .map(PathBuf::from)
            .or(stderr_override)
            .unwrap_or_else(|| self.store.default_stderr_path());

        self.bound = Some(Bound {
            cmd,
            runner,
            stdout_path,
            stderr_path,
        });
        self.runlog = None;
    }

    /// Run the bound runner's submission protocol.
    ///
    /// Synchronous from the caller's point of view: by the time this returns
    /// successfully, the run log is persisted and retrievable from the store.
    pub async fn start(&mut self) -> Result<&RunLog> {
        let bound = self.bound.as_ref().ok_or_else(|| {
            RunsetError::InvalidState("start() called with no command bound".to_string())
        })?;

        let ctx = SubmitContext {
            runset_name: self.runset_name.clone(),
            stdout_path: bound.stdout_path.clone(),
            stderr_path: bound.stderr_path.clone(),
        };

        let runlog = bound.runner.submit(&bound.cmd, &ctx).await?;
        Ok(self.runlog.insert(runlog))
    }

    /// Run the bound runner's status protocol against the stored run log.
    pub async fn status(&self) -> Result<Option<TerminalState>> {
        let bound = self.bound.as_ref().ok_or_else(|| {
            RunsetError::InvalidState("status() called with no command bound".to_string())
        })?;
        let runlog = self.runlog.as_ref().ok_or_else(|| {
            RunsetError::InvalidState(
                "status() called before start() produced a run log".to_string(),
            )
        })?;

        bound.runner.check_status(runlog).await
    }

    /// The run log produced by a successful `start()`, if any.
    pub fn runlog(&self) -> Option<&RunLog> {
        self.runlog.as_ref()
    }
}
