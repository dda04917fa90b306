// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{Result, RunsetError};
use crate::types::{TerminalState, TerminalVocab};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::RunsetError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_submit_section(&raw)?;
        validate_nosubmit_options(&raw)?;
        let vocab = build_terminal_vocab(&raw)?;
        Ok(ConfigFile::new_unchecked(
            raw.store, raw.submit, raw.slurm, vocab,
        ))
    }
}

fn validate_submit_section(raw: &RawConfigFile) -> Result<()> {
    if raw.submit.poll_interval_ms == 0 {
        return Err(RunsetError::ConfigError(
            "[submit].poll_interval_ms must be >= 1 (got 0)".to_string(),
        ));
    }
    if raw.submit.max_wait_ms < raw.submit.poll_interval_ms {
        return Err(RunsetError::ConfigError(format!(
            "[submit].max_wait_ms ({}) must be >= poll_interval_ms ({})",
            raw.submit.max_wait_ms, raw.submit.poll_interval_ms
        )));
    }
    Ok(())
}

fn validate_nosubmit_options(raw: &RawConfigFile) -> Result<()> {
    for opt in raw.slurm.nosubmit_options.iter() {
        if opt.trim().is_empty() {
            return Err(RunsetError::ConfigError(
                "[slurm].nosubmit_options must not contain empty names".to_string(),
            ));
        }
        if opt.starts_with('-') {
            return Err(RunsetError::ConfigError(format!(
                "[slurm].nosubmit_options entries are bare option names, got '{opt}'"
            )));
        }
    }
    Ok(())
}

fn build_terminal_vocab(raw: &RawConfigFile) -> Result<TerminalVocab> {
    let mut vocab = TerminalVocab::default();
    for (token, target) in raw.slurm.extra_terminal_aliases.iter() {
        if token.trim().is_empty() {
            return Err(RunsetError::ConfigError(
                "[slurm.extra_terminal_aliases] keys must not be empty".to_string(),
            ));
        }
        let state: TerminalState = target.parse().map_err(|err| {
            RunsetError::ConfigError(format!(
                "[slurm.extra_terminal_aliases] '{token}' maps to invalid state: {err}"
            ))
        })?;
        vocab = vocab.with_alias(token.clone(), state);
    }
    Ok(vocab)
}
