// src/exec/direct.rs

//! Baseline backend: run the command as a local detached process.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::process::Stdio;
use std::sync::{Arc, Mutex};

use time::OffsetDateTime;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::command::Command;
use crate::errors::{Result, RunsetError};
use crate::exec::barrier::{BarrierPolicy, runset_len, wait_until_visible};
use crate::exec::runner::{Runner, SubmitContext};
use crate::exec::{append_runlog, shell_command};
use crate::runlog::{RunLog, short_hostname};
use crate::store::RunStore;
use crate::types::{RunnerKind, TerminalState};

/// Runner that spawns commands as local child processes.
///
/// The OS pid becomes the job identifier. A background waiter records each
/// child's exit code in an in-process registry, which the status protocol
/// consults to classify finished jobs.
pub struct DirectRunner {
    store: Arc<dyn RunStore>,
    policy: BarrierPolicy,
    exits: Arc<Mutex<HashMap<u32, i32>>>,
}

impl DirectRunner {
    pub fn new(store: Arc<dyn RunStore>, policy: BarrierPolicy) -> Self {
        Self {
            store,
            policy,
            exits: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl Runner for DirectRunner {
    fn kind(&self) -> RunnerKind {
        RunnerKind::Direct
    }

    fn submit<'a>(
        &'a self,
        cmd: &'a Command,
        ctx: &'a SubmitContext,
    ) -> Pin<Box<dyn Future<Output = Result<RunLog>> + Send + 'a>> {
        let store = Arc::clone(&self.store);
        let exits = Arc::clone(&self.exits);
        let policy = self.policy;
        let cmd_text = cmd.text().to_string();
        let ctx = ctx.clone();

        Box::pin(async move {
            let prev_len = runset_len(store.as_ref(), &ctx.runset_name)?;
            let (err_tx, err_rx) = oneshot::channel();

            // Detached submission: spawn + persist run in their own task so
            // the caller only synchronizes through the store.
            {
                let store = Arc::clone(&store);
                let ctx = ctx.clone();
                tokio::spawn(async move {
                    if let Err(err) = spawn_and_persist(store, exits, cmd_text, &ctx).await {
                        warn!(runset = %ctx.runset_name, error = %err, "direct submission failed");
                        let _ = err_tx.send(err);
                    }
                });
            }

            let runs =
                wait_until_visible(store, &ctx.runset_name, prev_len + 1, err_rx, policy).await?;
            runs.last().cloned().ok_or_else(|| {
                RunsetError::PersistenceUnavailable(format!(
                    "run set '{}' is empty after submission",
                    ctx.runset_name
                ))
            })
        })
    }

    fn check_status<'a>(
        &'a self,
        runlog: &'a RunLog,
    ) -> Pin<Box<dyn Future<Output = Result<Option<TerminalState>>> + Send + 'a>> {
        Box::pin(async move {
            let pid: u32 = runlog.job_id.parse().map_err(|_| {
                RunsetError::InvalidState(format!(
                    "run log job id '{}' is not a local pid",
                    runlog.job_id
                ))
            })?;

            if let Some(code) = self.exits.lock().unwrap().get(&pid).copied() {
                return Ok(Some(classify_exit(code)));
            }

            if pid_alive(pid) {
                return Ok(None);
            }

            // Dead pid with no recorded exit condition (e.g. the run log was
            // created by another process). Indeterminate, not terminal.
            debug!(pid, "process gone but exit condition unknown");
            Ok(None)
        })
    }
}

/// Spawn the child with redirected output, persist its run log, and keep a
/// waiter around to record the eventual exit code.
async fn spawn_and_persist(
    store: Arc<dyn RunStore>,
    exits: Arc<Mutex<HashMap<u32, i32>>>,
    cmd_text: String,
    ctx: &SubmitContext,
) -> Result<()> {
    let stdout = create_output_file(&ctx.stdout_path)?;
    let stderr = create_output_file(&ctx.stderr_path)?;

    let mut command = shell_command(&cmd_text);
    command
        .stdout(Stdio::from(stdout))
        .stderr(Stdio::from(stderr));

    let mut child = command
        .spawn()
        .map_err(|err| RunsetError::Submission(format!("spawning '{cmd_text}': {err}")))?;

    let pid = child.id().ok_or_else(|| {
        RunsetError::Submission(format!("'{cmd_text}' exited before its pid was captured"))
    })?;

    info!(pid, cmd = %cmd_text, "spawned local process");

    tokio::spawn(async move {
        match child.wait().await {
            Ok(status) => {
                let code = status.code().unwrap_or(-1);
                debug!(pid, code, "local process exited");
                exits.lock().unwrap().insert(pid, code);
            }
            Err(err) => warn!(pid, error = %err, "waiting on local process failed"),
        }
    });

    let runlog = RunLog {
        job_id: pid.to_string(),
        cmd: cmd_text,
        start_time: OffsetDateTime::now_utc(),
        hostname: short_hostname(),
        stdout_path: ctx.stdout_path.clone(),
        stderr_path: ctx.stderr_path.clone(),
        runner: RunnerKind::Direct,
    };

    append_runlog(store.as_ref(), &ctx.runset_name, runlog)
}

fn create_output_file(path: &std::path::Path) -> Result<std::fs::File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(std::fs::File::create(path)?)
}

fn classify_exit(code: i32) -> TerminalState {
    if code == 0 {
        TerminalState::Completed
    } else {
        TerminalState::Failed
    }
}

#[cfg(unix)]
fn pid_alive(pid: u32) -> bool {
    // Signal 0 probes for existence without delivering anything.
    unsafe { libc::kill(pid as libc::pid_t, 0) == 0 }
}

#[cfg(not(unix))]
fn pid_alive(_pid: u32) -> bool {
    false
}
