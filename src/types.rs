// src/types.rs

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which execution backend created a run log.
///
/// Stored on every [`crate::runlog::RunLog`] so that a run set can be
/// re-inspected later with the right status protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunnerKind {
    /// Local detached process; job id is an OS pid.
    Direct,
    /// External batch scheduler; job id is scheduler-assigned.
    Slurm,
}

impl fmt::Display for RunnerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunnerKind::Direct => write!(f, "direct"),
            RunnerKind::Slurm => write!(f, "slurm"),
        }
    }
}

/// Terminal state of a job, derived on each status query.
///
/// Live sub-states (pending, running, suspending, ...) are deliberately not
/// represented: a job that is still under the scheduler's management reports
/// `None` from the status protocols and the caller re-polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TerminalState {
    Cancelled,
    Completed,
    Failed,
    Timeout,
    NodeFail,
    SpecialExit,
}

impl TerminalState {
    /// The scheduler's accounting token for this state.
    pub fn as_token(&self) -> &'static str {
        match self {
            TerminalState::Cancelled => "CANCELLED",
            TerminalState::Completed => "COMPLETED",
            TerminalState::Failed => "FAILED",
            TerminalState::Timeout => "TIMEOUT",
            TerminalState::NodeFail => "NODE_FAIL",
            TerminalState::SpecialExit => "SPECIAL_EXIT",
        }
    }
}

impl fmt::Display for TerminalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_token())
    }
}

impl FromStr for TerminalState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "CANCELLED" => Ok(TerminalState::Cancelled),
            "COMPLETED" => Ok(TerminalState::Completed),
            "FAILED" => Ok(TerminalState::Failed),
            "TIMEOUT" => Ok(TerminalState::Timeout),
            "NODE_FAIL" => Ok(TerminalState::NodeFail),
            "SPECIAL_EXIT" => Ok(TerminalState::SpecialExit),
            other => Err(format!("unrecognized terminal state: {other}")),
        }
    }
}

/// Mapping from accounting tokens to terminal states.
///
/// Defaults to the six canonical tokens mapping to themselves. Scheduler
/// versions that emit additional terminal tokens can alias them onto an
/// existing state via `[slurm.extra_terminal_aliases]` in the config;
/// aliases never introduce new terminal states.
#[derive(Debug, Clone)]
pub struct TerminalVocab {
    tokens: HashMap<String, TerminalState>,
}

impl Default for TerminalVocab {
    fn default() -> Self {
        let mut tokens = HashMap::new();
        for state in [
            TerminalState::Cancelled,
            TerminalState::Completed,
            TerminalState::Failed,
            TerminalState::Timeout,
            TerminalState::NodeFail,
            TerminalState::SpecialExit,
        ] {
            tokens.insert(state.as_token().to_string(), state);
        }
        Self { tokens }
    }
}

impl TerminalVocab {
    /// Add an alias token resolving to an existing terminal state.
    pub fn with_alias(mut self, token: impl Into<String>, state: TerminalState) -> Self {
        self.tokens.insert(token.into(), state);
        self
    }

    /// Classify raw accounting output.
    ///
    /// Only the first whitespace-delimited token is considered, so suffixed
    /// forms like `"CANCELLED by 0"` resolve to `CANCELLED`. Empty or
    /// unrecognized output yields `None`: the terminal record may not have
    /// propagated to accounting yet, and indeterminacy must never be
    /// reported as a terminal state.
    pub fn classify(&self, raw: &str) -> Option<TerminalState> {
        let token = raw.split_whitespace().next()?;
        self.tokens.get(token).copied()
    }
}
