// src/config/model.rs

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::command::NoSubmitOptions;
use crate::exec::BarrierPolicy;
use crate::types::TerminalVocab;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [store]
/// dir = ".runset"
/// runset = "nightly"
///
/// [submit]
/// poll_interval_ms = 200
/// max_wait_ms = 30000
///
/// [slurm]
/// nosubmit_options = ["help", "usage", "test-only", "version"]
///
/// [slurm.extra_terminal_aliases]
/// OUT_OF_MEMORY = "FAILED"
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub store: StoreSection,

    #[serde(default)]
    pub submit: SubmitSection,

    #[serde(default)]
    pub slurm: SlurmSection,
}

/// `[store]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreSection {
    /// Directory holding the run-set documents and default output files.
    #[serde(default = "default_store_dir")]
    pub dir: PathBuf,

    /// Run-set name to use when the caller does not choose one; if absent, a
    /// timestamp-derived name is generated per store instance.
    #[serde(default)]
    pub runset: Option<String>,
}

fn default_store_dir() -> PathBuf {
    PathBuf::from(".runset")
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            dir: default_store_dir(),
            runset: None,
        }
    }
}

/// `[submit]` section: bounds for the synchronization barrier.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitSection {
    /// Delay between retrieval attempts while waiting for the detached
    /// submission task's record to become visible.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Upper bound on total barrier waiting before giving up.
    #[serde(default = "default_max_wait_ms")]
    pub max_wait_ms: u64,
}

fn default_poll_interval_ms() -> u64 {
    200
}

fn default_max_wait_ms() -> u64 {
    30_000
}

impl Default for SubmitSection {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            max_wait_ms: default_max_wait_ms(),
        }
    }
}

/// `[slurm]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct SlurmSection {
    /// Option names (without the `--` prefix) that mark a command as
    /// non-submitting.
    #[serde(default = "default_nosubmit_options")]
    pub nosubmit_options: Vec<String>,

    /// Additional accounting tokens aliased onto the fixed terminal states,
    /// e.g. `OUT_OF_MEMORY = "FAILED"`.
    #[serde(default)]
    pub extra_terminal_aliases: BTreeMap<String, String>,
}

fn default_nosubmit_options() -> Vec<String> {
    ["help", "usage", "test-only", "version"]
        .into_iter()
        .map(str::to_string)
        .collect()
}

impl Default for SlurmSection {
    fn default() -> Self {
        Self {
            nosubmit_options: default_nosubmit_options(),
            extra_terminal_aliases: BTreeMap::new(),
        }
    }
}

/// Validated configuration.
///
/// Construct via `TryFrom<RawConfigFile>` (see `validate.rs`), which checks
/// the barrier bounds and resolves terminal aliases up front.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    store: StoreSection,
    submit: SubmitSection,
    slurm: SlurmSection,
    vocab: TerminalVocab,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        store: StoreSection,
        submit: SubmitSection,
        slurm: SlurmSection,
        vocab: TerminalVocab,
    ) -> Self {
        Self {
            store,
            submit,
            slurm,
            vocab,
        }
    }

    pub fn store_dir(&self) -> &PathBuf {
        &self.store.dir
    }

    pub fn runset_name(&self) -> Option<&str> {
        self.store.runset.as_deref()
    }

    pub fn barrier_policy(&self) -> BarrierPolicy {
        BarrierPolicy {
            poll_interval: Duration::from_millis(self.submit.poll_interval_ms),
            max_wait: Duration::from_millis(self.submit.max_wait_ms),
        }
    }

    pub fn nosubmit_options(&self) -> NoSubmitOptions {
        NoSubmitOptions::new(self.slurm.nosubmit_options.iter().cloned())
    }

    pub fn terminal_vocab(&self) -> TerminalVocab {
        self.vocab.clone()
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self::new_unchecked(
            StoreSection::default(),
            SubmitSection::default(),
            SlurmSection::default(),
            TerminalVocab::default(),
        )
    }
}
