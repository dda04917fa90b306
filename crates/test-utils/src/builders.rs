#![allow(dead_code)]

use std::path::PathBuf;

use runset::runlog::RunLog;
use runset::types::RunnerKind;
use time::OffsetDateTime;
use time::macros::datetime;

/// Builder for `RunLog` to simplify test setup.
pub struct RunLogBuilder {
    log: RunLog,
}

impl RunLogBuilder {
    pub fn new(job_id: &str) -> Self {
        Self {
            log: RunLog {
                job_id: job_id.to_string(),
                cmd: "sbatch job.sh".to_string(),
                start_time: datetime!(2026-08-23 12:00:00 UTC),
                hostname: "node01".to_string(),
                stdout_path: PathBuf::from("job.out"),
                stderr_path: PathBuf::from("job.err"),
                runner: RunnerKind::Slurm,
            },
        }
    }

    pub fn cmd(mut self, cmd: &str) -> Self {
        self.log.cmd = cmd.to_string();
        self
    }

    pub fn runner(mut self, runner: RunnerKind) -> Self {
        self.log.runner = runner;
        self
    }

    pub fn start_time(mut self, time: OffsetDateTime) -> Self {
        self.log.start_time = time;
        self
    }

    pub fn hostname(mut self, hostname: &str) -> Self {
        self.log.hostname = hostname.to_string();
        self
    }

    pub fn build(self) -> RunLog {
        self.log
    }
}
