// src/exec/mod.rs

//! Job submission and status-tracking layer.
//!
//! - [`runner`] defines the `Runner` trait both backends implement, and the
//!   resolved `SubmitContext` the handler passes in.
//! - [`direct`] runs commands as local detached processes (pid job ids).
//! - [`slurm`] submits to the external batch scheduler and derives status
//!   from the live queue and accounting history.
//! - [`slurm_cli`] is the trait boundary to the scheduler's CLI tools, so
//!   tests can script responses instead of shelling out.
//! - [`barrier`] implements the poll-until-visible synchronization between
//!   the detached submission task and the caller.
//! - [`handler`] is the caller-facing `RunHandler`.

use tokio::process::Command as TokioCommand;

use crate::errors::Result;
use crate::runlog::RunLog;
use crate::store::RunStore;

pub mod barrier;
pub mod direct;
pub mod handler;
pub mod runner;
pub mod slurm;
pub mod slurm_cli;

pub use barrier::BarrierPolicy;
pub use direct::DirectRunner;
pub use handler::RunHandler;
pub use runner::{Runner, SubmitContext};
pub use slurm::{SlurmRunner, extract_job_id};
pub use slurm_cli::{SchedulerOutput, SlurmCli, SlurmClient};

/// Build a shell command appropriate for the platform.
pub(crate) fn shell_command(text: &str) -> TokioCommand {
    if cfg!(windows) {
        let mut c = TokioCommand::new("cmd");
        c.arg("/C").arg(text);
        c
    } else {
        let mut c = TokioCommand::new("sh");
        c.arg("-c").arg(text);
        c
    }
}

/// Append one run log to a run set, treating an absent run set as empty.
///
/// Runs inside the detached submission task; the store assumes at most one
/// concurrent writer per run-set name.
pub(crate) fn append_runlog(
    store: &dyn RunStore,
    runset_name: &str,
    runlog: RunLog,
) -> Result<()> {
    let mut runs = match store.load(runset_name) {
        Ok(runs) => runs,
        Err(crate::errors::RunsetError::RunSetNotFound(_)) => Vec::new(),
        Err(err) => return Err(err),
    };
    runs.push(runlog);
    store.save(runset_name, &runs)
}
