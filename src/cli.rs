// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Command-line arguments for `runset`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "runset",
    version,
    about = "Submit shell commands locally or to a batch scheduler and track their status.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// A missing file means defaults; default path: `Runset.toml` in the
    /// current working directory.
    #[arg(long, value_name = "PATH", default_value = "Runset.toml")]
    pub config: String,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `RUNSET_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Clone, Subcommand)]
pub enum CliCommand {
    /// Submit a command; returns once its run log is persisted and queryable.
    Submit {
        /// Which execution backend submits the command.
        #[arg(long, value_enum, default_value_t = RunnerArg::Direct)]
        runner: RunnerArg,

        /// Run set to append the run log to (default: the store's current
        /// run set).
        #[arg(long, value_name = "NAME")]
        runset: Option<String>,

        /// Stdout file override (command-declared paths still win).
        #[arg(long, value_name = "PATH")]
        stdout: Option<PathBuf>,

        /// Stderr file override (command-declared paths still win).
        #[arg(long, value_name = "PATH")]
        stderr: Option<PathBuf>,

        /// The command text to run.
        #[arg(
            required = true,
            trailing_var_arg = true,
            allow_hyphen_values = true,
            value_name = "CMD"
        )]
        cmd: Vec<String>,
    },

    /// Derive and print the current status of every run log in a run set.
    Status {
        #[arg(long, value_name = "NAME")]
        runset: Option<String>,
    },

    /// List the run logs persisted in a run set.
    List {
        #[arg(long, value_name = "NAME")]
        runset: Option<String>,
    },
}

/// Execution backend as exposed on the CLI.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum RunnerArg {
    /// Local detached process.
    Direct,
    /// External batch scheduler.
    Slurm,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
