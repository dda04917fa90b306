// src/lib.rs

pub mod cli;
pub mod command;
pub mod config;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod runlog;
pub mod store;
pub mod types;

use std::sync::Arc;

use crate::cli::{CliArgs, CliCommand, RunnerArg};
use crate::command::Command;
use crate::config::ConfigFile;
use crate::errors::Result;
use crate::exec::{DirectRunner, RunHandler, Runner, SlurmCli, SlurmRunner};
use crate::runlog::RunLog;
use crate::store::{FileStore, RunStore};
use crate::types::RunnerKind;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - the file-backed run store
/// - the chosen runner backend
/// - the subcommand itself
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = config::load_or_default(&args.config)?;
    let store = build_store(&cfg);

    match args.command {
        CliCommand::Submit {
            runner,
            runset,
            stdout,
            stderr,
            cmd,
        } => {
            let command = Command::new(cmd.join(" "))?;
            let runner = build_runner(runner, &cfg, Arc::clone(&store));

            let mut handler = RunHandler::new(Arc::clone(&store), runset);
            handler.bind_command(command, runner, stdout, stderr);

            let job_id = handler.start().await?.job_id.clone();
            println!(
                "submitted job {} to run set '{}'",
                job_id,
                handler.runset_name()
            );
            Ok(())
        }

        CliCommand::Status { runset } => {
            let name = runset.unwrap_or_else(|| store.current_runset_name());
            let runs = store.load(&name)?;

            let direct = build_runner(RunnerArg::Direct, &cfg, Arc::clone(&store));
            let slurm = build_runner(RunnerArg::Slurm, &cfg, Arc::clone(&store));

            for log in &runs {
                let runner = match log.runner {
                    RunnerKind::Direct => &direct,
                    RunnerKind::Slurm => &slurm,
                };
                let status = runner.check_status(log).await?;
                let shown = status
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "(not terminal yet)".to_string());
                println!("{}\t{}\t{}", log.job_id, shown, log.cmd);
            }
            Ok(())
        }

        CliCommand::List { runset } => {
            let name = runset.unwrap_or_else(|| store.current_runset_name());
            let runs = store.load(&name)?;
            for log in &runs {
                print_runlog(log);
            }
            Ok(())
        }
    }
}

fn build_store(cfg: &ConfigFile) -> Arc<dyn RunStore> {
    let mut store = FileStore::new(cfg.store_dir());
    if let Some(name) = cfg.runset_name() {
        store = store.with_runset_name(name);
    }
    Arc::new(store)
}

fn build_runner(arg: RunnerArg, cfg: &ConfigFile, store: Arc<dyn RunStore>) -> Arc<dyn Runner> {
    match arg {
        RunnerArg::Direct => Arc::new(DirectRunner::new(store, cfg.barrier_policy())),
        RunnerArg::Slurm => Arc::new(
            SlurmRunner::new(store, Arc::new(SlurmCli), cfg.barrier_policy())
                .with_nosubmit_options(cfg.nosubmit_options())
                .with_terminal_vocab(cfg.terminal_vocab()),
        ),
    }
}

fn print_runlog(log: &RunLog) {
    println!("- job {} ({})", log.job_id, log.runner);
    println!("    cmd: {}", log.cmd);
    println!("    started: {} on {}", log.start_time, log.hostname);
    println!("    stdout: {}", log.stdout_path.display());
    println!("    stderr: {}", log.stderr_path.display());
}
