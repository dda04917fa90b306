// src/runlog.rs

//! Durable records of submitted work.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::types::RunnerKind;

/// Immutable record describing one submitted unit of work.
///
/// Created exactly once, inside a runner's submission protocol, after the
/// external submission call has returned successfully; persisted immediately;
/// never mutated thereafter. Status is derived on demand by re-querying the
/// backend scheduler/OS, not stored here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunLog {
    /// Opaque job identifier: a local pid for the direct backend, a
    /// scheduler-assigned id for the scheduler backend.
    pub job_id: String,

    /// The original command text, exactly as submitted.
    pub cmd: String,

    /// Submission time.
    #[serde(with = "time::serde::rfc3339")]
    pub start_time: OffsetDateTime,

    /// First DNS label of the originating host.
    pub hostname: String,

    /// Resolved stdout file path.
    pub stdout_path: PathBuf,

    /// Resolved stderr file path.
    pub stderr_path: PathBuf,

    /// Which runner variant created this record.
    pub runner: RunnerKind,
}

/// An ordered sequence of run logs sharing a caller-chosen name; the unit of
/// persistence. Append-only from the caller's perspective.
pub type RunSet = Vec<RunLog>;

/// First DNS label of the local hostname, as recorded on run logs.
pub fn short_hostname() -> String {
    let name = hostname::get()
        .map(|h| h.to_string_lossy().into_owned())
        .unwrap_or_else(|_| "localhost".to_string());
    name.split('.').next().unwrap_or("localhost").to_string()
}
