// src/exec/barrier.rs

//! Poll-until-visible synchronization between the detached submission task
//! and the caller.
//!
//! Submission runs external-submit → parse-job-id → build RunLog → persist in
//! a detached Tokio task so the caller is not blocked on the external tool's
//! latency. The caller nonetheless needs a fully persisted record before it
//! can poll status, so it blocks here until the expected run-set length is
//! retrievable. "Record not yet present" and transient retrieval failures are
//! retriable; hard submission failures arrive over the oneshot channel and
//! surface immediately.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::time::{Instant, sleep};
use tracing::debug;

use crate::errors::{Result, RunsetError};
use crate::runlog::RunSet;
use crate::store::RunStore;

/// Bounds for the barrier loop.
#[derive(Debug, Clone, Copy)]
pub struct BarrierPolicy {
    /// Delay between retrieval attempts.
    pub poll_interval: Duration,
    /// Upper bound on total waiting before the barrier fails with
    /// [`RunsetError::PersistenceUnavailable`]. Keeps the caller from
    /// blocking forever if the detached task dies before persisting.
    pub max_wait: Duration,
}

impl Default for BarrierPolicy {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(200),
            max_wait: Duration::from_secs(30),
        }
    }
}

/// Number of run logs currently persisted under `runset_name` (zero if the
/// run set does not exist yet).
pub(crate) fn runset_len(store: &dyn RunStore, runset_name: &str) -> Result<usize> {
    match store.load(runset_name) {
        Ok(runs) => Ok(runs.len()),
        Err(RunsetError::RunSetNotFound(_)) => Ok(0),
        Err(err) => Err(err),
    }
}

/// Block until `runset_name` holds at least `min_len` run logs, a submission
/// error arrives on `err_rx`, or the policy's `max_wait` elapses.
pub(crate) async fn wait_until_visible(
    store: Arc<dyn RunStore>,
    runset_name: &str,
    min_len: usize,
    mut err_rx: oneshot::Receiver<RunsetError>,
    policy: BarrierPolicy,
) -> Result<RunSet> {
    let started = Instant::now();

    loop {
        // A hard submission failure beats any store state: nothing will be
        // persisted for it, so waiting further is pointless.
        if let Ok(err) = err_rx.try_recv() {
            return Err(err);
        }

        match store.load(runset_name) {
            Ok(runs) if runs.len() >= min_len => return Ok(runs),
            Ok(runs) => {
                debug!(
                    runset = runset_name,
                    have = runs.len(),
                    want = min_len,
                    "run set visible but record not yet appended"
                );
            }
            Err(RunsetError::RunSetNotFound(_)) => {
                debug!(runset = runset_name, "run set not yet present");
            }
            Err(err) => {
                // Transient store trouble; retriable within the same loop.
                debug!(runset = runset_name, error = %err, "retrieval failed; retrying");
            }
        }

        if started.elapsed() >= policy.max_wait {
            return Err(RunsetError::PersistenceUnavailable(format!(
                "run set '{runset_name}' did not become retrievable within {:?}",
                policy.max_wait
            )));
        }

        sleep(policy.poll_interval).await;
    }
}
