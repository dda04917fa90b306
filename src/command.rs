// src/command.rs

//! Immutable shell command values and the non-submitting option registry.

use std::path::{Path, PathBuf};

use crate::errors::{Result, RunsetError};

/// The literal text of a shell invocation plus backend-specific submission
/// options.
///
/// Immutable once constructed. Declared stdout/stderr paths (mirroring
/// `sbatch --output` / `--error`) take precedence over any caller-supplied
/// overrides when the command is bound to a handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    text: String,
    stdout_path: Option<PathBuf>,
    stderr_path: Option<PathBuf>,
}

impl Command {
    /// Create a command from its literal invocation text.
    ///
    /// Fails with [`RunsetError::InvalidCommand`] if the text is empty or
    /// blank.
    pub fn new(text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(RunsetError::InvalidCommand(
                "command text must not be empty".to_string(),
            ));
        }
        Ok(Self {
            text,
            stdout_path: None,
            stderr_path: None,
        })
    }

    /// Declare the stdout file the submitted job will write to.
    pub fn with_stdout(mut self, path: impl Into<PathBuf>) -> Self {
        self.stdout_path = Some(path.into());
        self
    }

    /// Declare the stderr file the submitted job will write to.
    pub fn with_stderr(mut self, path: impl Into<PathBuf>) -> Self {
        self.stderr_path = Some(path.into());
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn stdout_path(&self) -> Option<&Path> {
        self.stdout_path.as_deref()
    }

    pub fn stderr_path(&self) -> Option<&Path> {
        self.stderr_path.as_deref()
    }

    /// Whether this command must bypass external submission entirely.
    pub fn is_non_submitting(&self, opts: &NoSubmitOptions) -> bool {
        opts.matches(&self.text)
    }
}

/// Fixed registry of option names that mark a command as non-submitting.
///
/// Such invocations (help/usage/dry-run flavors) are handled as purely local
/// operations and must never reach the scheduler's submit path. The registry
/// is consulted verbatim by both backends, on the command text at submission
/// time and on the recorded command text at status time.
#[derive(Debug, Clone)]
pub struct NoSubmitOptions(Vec<String>);

impl Default for NoSubmitOptions {
    fn default() -> Self {
        Self(
            ["help", "usage", "test-only", "version"]
                .into_iter()
                .map(str::to_string)
                .collect(),
        )
    }
}

impl NoSubmitOptions {
    pub fn new(options: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self(options.into_iter().map(Into::into).collect())
    }

    /// Whether the given command text carries any registered bypass option.
    pub fn matches(&self, text: &str) -> bool {
        self.0.iter().any(|opt| text.contains(&format!("--{opt}")))
    }
}
