// src/exec/slurm.rs

//! Scheduler-backed runner: submits through the external batch tools and
//! derives status from the live queue and the accounting history.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use time::OffsetDateTime;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::command::{Command, NoSubmitOptions};
use crate::errors::{Result, RunsetError};
use crate::exec::barrier::{BarrierPolicy, runset_len, wait_until_visible};
use crate::exec::runner::{Runner, SubmitContext};
use crate::exec::slurm_cli::SlurmClient;
use crate::exec::{DirectRunner, append_runlog};
use crate::runlog::{RunLog, short_hostname};
use crate::store::RunStore;
use crate::types::{RunnerKind, TerminalState, TerminalVocab};

/// Runner that submits jobs to an external batch scheduler.
///
/// Non-submitting commands (help/usage flavors, per the [`NoSubmitOptions`]
/// registry) never reach the scheduler: both protocols delegate to the inner
/// [`DirectRunner`] for them.
pub struct SlurmRunner {
    store: Arc<dyn RunStore>,
    client: Arc<dyn SlurmClient>,
    direct: DirectRunner,
    nosubmit: NoSubmitOptions,
    vocab: TerminalVocab,
    policy: BarrierPolicy,
}

impl SlurmRunner {
    pub fn new(
        store: Arc<dyn RunStore>,
        client: Arc<dyn SlurmClient>,
        policy: BarrierPolicy,
    ) -> Self {
        let direct = DirectRunner::new(Arc::clone(&store), policy);
        Self {
            store,
            client,
            direct,
            nosubmit: NoSubmitOptions::default(),
            vocab: TerminalVocab::default(),
            policy,
        }
    }

    pub fn with_nosubmit_options(mut self, nosubmit: NoSubmitOptions) -> Self {
        self.nosubmit = nosubmit;
        self
    }

    pub fn with_terminal_vocab(mut self, vocab: TerminalVocab) -> Self {
        self.vocab = vocab;
        self
    }

    /// Two-tier status query for a scheduler job id.
    ///
    /// Any non-empty live-queue token means the job is still under the
    /// scheduler's management, so it is not terminal regardless of which
    /// sub-state is reported. Only once the queue no longer knows the job is
    /// accounting consulted for a final state.
    async fn scheduler_status(&self, job_id: &str) -> Result<Option<TerminalState>> {
        let queue = self.client.queue_state(job_id).await?;
        if !queue.trim().is_empty() {
            debug!(job_id, state = %queue.trim(), "job still in live queue");
            return Ok(None);
        }

        let acct = self.client.accounting_state(job_id).await?;
        let classified = self.vocab.classify(&acct);
        debug!(job_id, raw = %acct.trim(), ?classified, "accounting state");
        Ok(classified)
    }
}

impl Runner for SlurmRunner {
    fn kind(&self) -> RunnerKind {
        RunnerKind::Slurm
    }

    fn submit<'a>(
        &'a self,
        cmd: &'a Command,
        ctx: &'a SubmitContext,
    ) -> Pin<Box<dyn Future<Output = Result<RunLog>> + Send + 'a>> {
        // Help/usage flavors are purely local operations.
        if cmd.is_non_submitting(&self.nosubmit) {
            debug!(cmd = %cmd.text(), "non-submitting command; using direct runner");
            return self.direct.submit(cmd, ctx);
        }

        let store = Arc::clone(&self.store);
        let client = Arc::clone(&self.client);
        let policy = self.policy;
        let cmd_text = cmd.text().to_string();
        let ctx = ctx.clone();

        Box::pin(async move {
            let prev_len = runset_len(store.as_ref(), &ctx.runset_name)?;
            let (err_tx, err_rx) = oneshot::channel();

            {
                let store = Arc::clone(&store);
                let ctx = ctx.clone();
                tokio::spawn(async move {
                    if let Err(err) = submit_and_persist(store, client, cmd_text, &ctx).await {
                        warn!(runset = %ctx.runset_name, error = %err, "scheduler submission failed");
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
        // Non-submitting runs were never sent to the scheduler; their job id
        // is a pid and the baseline protocol applies.
        if self.nosubmit.matches(&runlog.cmd) {
            return self.direct.check_status(runlog);
        }

        Box::pin(self.scheduler_status(&runlog.job_id))
    }
}

/// Detached half of the submission protocol: external submit, job id
/// extraction, run log construction, persistence. A failed submission
/// persists nothing.
async fn submit_and_persist(
    store: Arc<dyn RunStore>,
    client: Arc<dyn SlurmClient>,
    cmd_text: String,
    ctx: &SubmitContext,
) -> Result<()> {
    let output = client.submit(&cmd_text).await?;

    // Any error-channel content is a hard submission failure.
    if !output.stderr.trim().is_empty() {
        return Err(RunsetError::Submission(format!(
            "sbatch submission failed: {}",
            output.stderr.trim()
        )));
    }

    let job_id = extract_job_id(&output.stdout).ok_or_else(|| {
        RunsetError::Submission(format!(
            "no job id in submit output: {:?}",
            output.stdout
        ))
    })?;

    info!(job_id, cmd = %cmd_text, "job submitted to scheduler");

    let runlog = RunLog {
        job_id: job_id.to_string(),
        cmd: cmd_text,
        start_time: OffsetDateTime::now_utc(),
        hostname: short_hostname(),
        stdout_path: ctx.stdout_path.clone(),
        stderr_path: ctx.stderr_path.clone(),
        runner: RunnerKind::Slurm,
    };

    append_runlog(store.as_ref(), &ctx.runset_name, runlog)
}

/// Extract the scheduler-assigned job id from submit stdout.
///
/// Structural contract with the external tool: the id is the final
/// whitespace-delimited token (`"Submitted batch job 884213\n"`). If the
/// tool's output format ever changes, this is the one place to revisit.
pub fn extract_job_id(stdout: &str) -> Option<&str> {
    stdout.split_whitespace().last()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_id_is_the_final_token() {
        assert_eq!(
            extract_job_id("Submitted batch job 884213\n"),
            Some("884213")
        );
        assert_eq!(extract_job_id("884213"), Some("884213"));
        assert_eq!(extract_job_id("\n"), None);
        assert_eq!(extract_job_id(""), None);
    }
}
