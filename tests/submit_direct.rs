// tests/submit_direct.rs

//! Direct backend end to end against the real file store: spawn, persist,
//! redirect output, classify the exit condition.

use std::sync::Arc;
use std::time::Duration;

use runset::command::Command;
use runset::exec::{BarrierPolicy, DirectRunner, RunHandler};
use runset::store::{FileStore, RunStore};
use runset::types::{RunnerKind, TerminalState};

use runset_test_utils::{init_tracing, with_timeout};

fn fast_policy() -> BarrierPolicy {
    BarrierPolicy {
        poll_interval: Duration::from_millis(10),
        max_wait: Duration::from_secs(3),
    }
}

async fn wait_terminal(handler: &RunHandler) -> TerminalState {
    with_timeout(async {
        loop {
            if let Some(state) = handler.status().await.unwrap() {
                return state;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await
}

#[tokio::test]
async fn echo_completes_and_its_output_lands_in_the_declared_file() {
    init_tracing();

    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileStore::new(dir.path()).with_runset_name("work"));
    let runner = Arc::new(DirectRunner::new(store.clone(), fast_policy()));

    let stdout_path = dir.path().join("echo.out");
    let mut handler = RunHandler::new(store.clone(), None);
    handler.bind_command(
        Command::new("echo hello").unwrap(),
        runner,
        Some(stdout_path.clone()),
        None,
    );

    let runlog = handler.start().await.unwrap().clone();
    assert_eq!(runlog.runner, RunnerKind::Direct);
    assert!(!runlog.job_id.is_empty());
    assert!(runlog.job_id.parse::<u32>().is_ok());
    assert_eq!(runlog.stdout_path, stdout_path);

    // Barrier contract: persisted and retrievable before start() returned.
    let runs = store.load("work").unwrap();
    assert_eq!(runs, vec![runlog]);

    assert_eq!(wait_terminal(&handler).await, TerminalState::Completed);

    let out = std::fs::read_to_string(&stdout_path).unwrap();
    assert_eq!(out.trim(), "hello");
}

#[tokio::test]
async fn nonzero_exit_classifies_as_failed() {
    init_tracing();

    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileStore::new(dir.path()).with_runset_name("work"));
    let runner = Arc::new(DirectRunner::new(store.clone(), fast_policy()));

    let mut handler = RunHandler::new(store.clone(), None);
    handler.bind_command(Command::new("exit 3").unwrap(), runner, None, None);
    handler.start().await.unwrap();

    assert_eq!(wait_terminal(&handler).await, TerminalState::Failed);
}

#[tokio::test]
async fn command_declared_paths_win_over_overrides() {
    init_tracing();

    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileStore::new(dir.path()).with_runset_name("work"));
    let runner = Arc::new(DirectRunner::new(store.clone(), fast_policy()));

    let declared = dir.path().join("declared.out");
    let overridden = dir.path().join("override.out");

    let mut handler = RunHandler::new(store.clone(), None);
    handler.bind_command(
        Command::new("echo precedence").unwrap().with_stdout(&declared),
        runner,
        Some(overridden.clone()),
        None,
    );

    let runlog = handler.start().await.unwrap().clone();
    assert_eq!(runlog.stdout_path, declared);

    wait_terminal(&handler).await;
    assert_eq!(
        std::fs::read_to_string(&declared).unwrap().trim(),
        "precedence"
    );
    assert!(!overridden.exists());
}

#[tokio::test]
async fn terminal_status_is_stable_across_repeated_polls() {
    init_tracing();

    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileStore::new(dir.path()).with_runset_name("work"));
    let runner = Arc::new(DirectRunner::new(store.clone(), fast_policy()));

    let mut handler = RunHandler::new(store.clone(), None);
    handler.bind_command(Command::new("true").unwrap(), runner, None, None);
    handler.start().await.unwrap();

    let first = wait_terminal(&handler).await;
    // Monotonicity: once terminal, it never changes or reverts to None.
    for _ in 0..5 {
        assert_eq!(handler.status().await.unwrap(), Some(first));
    }
}

#[tokio::test]
async fn handler_rejects_use_before_bind_and_start() {
    init_tracing();

    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileStore::new(dir.path()));
    let runner = Arc::new(DirectRunner::new(store.clone(), fast_policy()));

    let mut handler = RunHandler::new(store.clone(), None);
    assert!(handler.start().await.is_err());

    handler.bind_command(Command::new("true").unwrap(), runner, None, None);
    assert!(handler.status().await.is_err());
}
