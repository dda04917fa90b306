// src/store/mock.rs

//! In-memory `RunStore` used in tests.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::anyhow;

use crate::errors::{Result, RunsetError};
use crate::runlog::{RunLog, RunSet};
use crate::store::RunStore;

#[derive(Debug, Default)]
struct Inner {
    sets: HashMap<String, RunSet>,
    /// Number of upcoming `load` calls that fail with a transient error.
    fail_loads: usize,
    /// When set, `save` silently discards writes (simulates a crashed
    /// submission path for barrier timeout tests).
    drop_saves: bool,
}

/// In-memory store, cloneable and shareable across tasks.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
    runset_name: String,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner::default())),
            runset_name: "testset".to_string(),
        }
    }

    pub fn with_runset_name(mut self, name: impl Into<String>) -> Self {
        self.runset_name = name.into();
        self
    }

    /// Make the next `n` `load` calls fail with a transient error.
    pub fn fail_next_loads(&self, n: usize) {
        self.inner.lock().unwrap().fail_loads = n;
    }

    /// Discard all subsequent saves.
    pub fn drop_saves(&self, drop: bool) {
        self.inner.lock().unwrap().drop_saves = drop;
    }
}

impl RunStore for MemoryStore {
    fn save(&self, runset_name: &str, runs: &[RunLog]) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        if inner.drop_saves {
            return Ok(());
        }
        inner.sets.insert(runset_name.to_string(), runs.to_vec());
        Ok(())
    }

    fn load(&self, runset_name: &str) -> Result<RunSet> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_loads > 0 {
            inner.fail_loads -= 1;
            return Err(RunsetError::Other(anyhow!("simulated transient failure")));
        }
        inner
            .sets
            .get(runset_name)
            .cloned()
            .ok_or_else(|| RunsetError::RunSetNotFound(runset_name.to_string()))
    }

    fn default_stdout_path(&self) -> PathBuf {
        std::env::temp_dir().join(format!("{}.out", self.runset_name))
    }

    fn default_stderr_path(&self) -> PathBuf {
        std::env::temp_dir().join(format!("{}.err", self.runset_name))
    }

    fn current_runset_name(&self) -> String {
        self.runset_name.clone()
    }
}
