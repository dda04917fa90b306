// src/exec/slurm_cli.rs

//! Boundary to the external scheduler tools.
//!
//! The scheduler's CLI programs are invoked as opaque external operations;
//! this module only pins down their load-bearing shapes: submit output
//! carries the job id as its final token, the live-queue query returns a
//! state token or empty output, and the accounting query returns a state
//! token or empty output when the record has not propagated yet.

use std::future::Future;
use std::pin::Pin;

use tracing::debug;

use crate::errors::{Result, RunsetError};
use crate::exec::shell_command;

/// Captured output channels of one external scheduler operation.
#[derive(Debug, Clone)]
pub struct SchedulerOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Trait abstracting the scheduler's external CLI operations.
///
/// Production code uses [`SlurmCli`]; tests supply a scripted fake.
pub trait SlurmClient: Send + Sync {
    /// Run the submit operation (the command text itself is the `sbatch`
    /// invocation) and capture both output channels.
    fn submit<'a>(
        &'a self,
        cmd_text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<SchedulerOutput>> + Send + 'a>>;

    /// Query the live queue for the job; empty output means the job has left
    /// the queue.
    fn queue_state<'a>(
        &'a self,
        job_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>>;

    /// Query accounting for the final recorded state of the job's primary
    /// execution step.
    fn accounting_state<'a>(
        &'a self,
        job_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>>;
}

/// Real client shelling out to the scheduler CLI tools.
#[derive(Debug, Clone, Default)]
pub struct SlurmCli;

impl SlurmCli {
    async fn run_shell(text: String) -> Result<SchedulerOutput> {
        debug!(cmd = %text, "running scheduler command");

        let output = shell_command(&text).output().await.map_err(|err| {
            RunsetError::Submission(format!("failed to run '{text}': {err}"))
        })?;

        Ok(SchedulerOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

impl SlurmClient for SlurmCli {
    fn submit<'a>(
        &'a self,
        cmd_text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<SchedulerOutput>> + Send + 'a>> {
        Box::pin(Self::run_shell(cmd_text.to_string()))
    }

    fn queue_state<'a>(
        &'a self,
        job_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>> {
        let check = format!("squeue -j {job_id} --format=%T -h");
        Box::pin(async move {
            let out = Self::run_shell(check).await?;
            Ok(out.stdout.trim().to_string())
        })
    }

    fn accounting_state<'a>(
        &'a self,
        job_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>> {
        // `.batch` scopes the query to the job's primary execution step.
        let check = format!("sacct -j {job_id}.batch --format=State -n");
        Box::pin(async move {
            let out = Self::run_shell(check).await?;
            Ok(out.stdout.trim().to_string())
        })
    }
}
