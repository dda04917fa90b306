// src/store/mod.rs

//! Durable run-set persistence.
//!
//! The runners never touch the filesystem directly; they go through the
//! [`RunStore`] trait so tests can swap in the in-memory implementation from
//! [`mock`]. Production code uses [`FileStore`], which keeps one TOML
//! document per run set under a store directory.

use std::fmt::Debug;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::errors::{Result, RunsetError};
use crate::runlog::{RunLog, RunSet};

pub mod mock;

pub use mock::MemoryStore;

/// Abstract persistence backend for run sets.
///
/// The store exclusively owns the durable run-set storage; runners and
/// handlers hold only transient references during a single submission or
/// status-check cycle. All mutation is append-style: a new run set, or a run
/// log appended to an existing one, never in-place edits.
pub trait RunStore: Send + Sync + Debug {
    /// Persist the full sequence of run logs under the given run-set name.
    fn save(&self, runset_name: &str, runs: &[RunLog]) -> Result<()>;

    /// Retrieve the full sequence as persisted.
    ///
    /// Fails with [`RunsetError::RunSetNotFound`] if no run set exists under
    /// that name.
    fn load(&self, runset_name: &str) -> Result<RunSet>;

    /// Default stdout file path for jobs that declare none.
    fn default_stdout_path(&self) -> PathBuf;

    /// Default stderr file path for jobs that declare none.
    fn default_stderr_path(&self) -> PathBuf;

    /// The run-set name used when the caller does not choose one.
    fn current_runset_name(&self) -> String;
}

/// On-disk shape of one run set.
#[derive(Debug, Serialize, Deserialize)]
struct RunSetFile {
    runs: Vec<RunLog>,
}

/// Store implementation that keeps each run set as `<dir>/<name>.toml`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
    runset_name: String,
}

impl FileStore {
    /// Create a store rooted at `dir` with a timestamp-derived default
    /// run-set name.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let runset_name = format!("runset_{}", OffsetDateTime::now_utc().unix_timestamp());
        Self {
            dir: dir.into(),
            runset_name,
        }
    }

    /// Override the default run-set name.
    pub fn with_runset_name(mut self, name: impl Into<String>) -> Self {
        self.runset_name = name.into();
        self
    }

    fn runset_path(&self, runset_name: &str) -> PathBuf {
        self.dir.join(format!("{runset_name}.toml"))
    }
}

impl RunStore for FileStore {
    fn save(&self, runset_name: &str, runs: &[RunLog]) -> Result<()> {
        let path = self.runset_path(runset_name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating store dir {:?}", parent))?;
        }

        let doc = toml::to_string_pretty(&RunSetFile {
            runs: runs.to_vec(),
        })?;

        // Write to a temp file and rename so a concurrent barrier reader
        // never observes a torn document.
        let tmp = path.with_extension("toml.tmp");
        fs::write(&tmp, doc).with_context(|| format!("writing run set to {:?}", tmp))?;
        fs::rename(&tmp, &path)
            .with_context(|| format!("publishing run set at {:?}", path))?;
        Ok(())
    }

    fn load(&self, runset_name: &str) -> Result<RunSet> {
        let path = self.runset_path(runset_name);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(RunsetError::RunSetNotFound(runset_name.to_string()));
            }
            Err(err) => return Err(err.into()),
        };

        let file: RunSetFile = toml::from_str(&contents)?;
        Ok(file.runs)
    }

    fn default_stdout_path(&self) -> PathBuf {
        self.dir.join(format!("{}.out", self.runset_name))
    }

    fn default_stderr_path(&self) -> PathBuf {
        self.dir.join(format!("{}.err", self.runset_name))
    }

    fn current_runset_name(&self) -> String {
        self.runset_name.clone()
    }
}
