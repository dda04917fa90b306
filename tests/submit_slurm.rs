// tests/submit_slurm.rs

//! Scheduler-backed submission: job id extraction, persistence, and the
//! synchronization barrier as observed through `RunHandler::start()`.

use std::sync::Arc;
use std::time::Duration;

use runset::command::Command;
use runset::errors::RunsetError;
use runset::exec::{BarrierPolicy, RunHandler, Runner, SlurmRunner};
use runset::store::{MemoryStore, RunStore};
use runset::types::RunnerKind;

use runset_test_utils::fake_slurm::FakeSlurmClient;
use runset_test_utils::init_tracing;

fn fast_policy() -> BarrierPolicy {
    BarrierPolicy {
        poll_interval: Duration::from_millis(10),
        max_wait: Duration::from_secs(3),
    }
}

fn slurm_runner(store: &MemoryStore, client: &FakeSlurmClient) -> Arc<dyn Runner> {
    Arc::new(SlurmRunner::new(
        Arc::new(store.clone()),
        Arc::new(client.clone()),
        fast_policy(),
    ))
}

#[tokio::test]
async fn successful_submission_persists_exactly_one_runlog() {
    init_tracing();

    let store = MemoryStore::new();
    let client = FakeSlurmClient::new("Submitted batch job 884213\n", "");
    let runner = slurm_runner(&store, &client);

    let mut handler = RunHandler::new(Arc::new(store.clone()), None);
    handler.bind_command(
        Command::new("sbatch job.sh").unwrap(),
        runner,
        None,
        None,
    );

    let runlog = handler.start().await.unwrap().clone();
    assert_eq!(runlog.job_id, "884213");
    assert_eq!(runlog.cmd, "sbatch job.sh");
    assert_eq!(runlog.runner, RunnerKind::Slurm);
    assert!(!runlog.hostname.is_empty());

    // Barrier contract: the record is retrievable the moment start() returns.
    let runs = store.load("testset").unwrap();
    assert_eq!(runs, vec![runlog]);

    assert_eq!(client.submit_calls(), vec!["sbatch job.sh".to_string()]);
}

#[tokio::test]
async fn error_channel_output_fails_submission_and_persists_nothing() {
    init_tracing();

    let store = MemoryStore::new();
    let client = FakeSlurmClient::new("", "sbatch: error: invalid partition");
    let runner = slurm_runner(&store, &client);

    let mut handler = RunHandler::new(Arc::new(store.clone()), None);
    handler.bind_command(Command::new("sbatch job.sh").unwrap(), runner, None, None);

    let err = handler.start().await.unwrap_err();
    match err {
        RunsetError::Submission(msg) => {
            assert!(msg.contains("sbatch submission failed"), "got: {msg}");
            assert!(msg.contains("invalid partition"), "got: {msg}");
        }
        other => panic!("expected Submission error, got {other:?}"),
    }

    // No partial records on failure.
    assert!(matches!(
        store.load("testset"),
        Err(RunsetError::RunSetNotFound(_))
    ));
    assert!(handler.runlog().is_none());
}

#[tokio::test]
async fn empty_submit_output_is_a_submission_error() {
    init_tracing();

    let store = MemoryStore::new();
    let client = FakeSlurmClient::new("\n", "");
    let runner = slurm_runner(&store, &client);

    let mut handler = RunHandler::new(Arc::new(store.clone()), None);
    handler.bind_command(Command::new("sbatch job.sh").unwrap(), runner, None, None);

    assert!(matches!(
        handler.start().await,
        Err(RunsetError::Submission(_))
    ));
}

#[tokio::test]
async fn sequential_submissions_append_to_the_run_set() {
    init_tracing();

    let store = MemoryStore::new();
    let client = FakeSlurmClient::new("Submitted batch job 100\n", "");
    let runner = slurm_runner(&store, &client);

    let mut handler = RunHandler::new(Arc::new(store.clone()), None);

    handler.bind_command(Command::new("sbatch a.sh").unwrap(), runner.clone(), None, None);
    handler.start().await.unwrap();

    handler.bind_command(Command::new("sbatch b.sh").unwrap(), runner, None, None);
    handler.start().await.unwrap();

    let runs = store.load("testset").unwrap();
    assert_eq!(runs.len(), 2);
    assert_eq!(runs[0].cmd, "sbatch a.sh");
    assert_eq!(runs[1].cmd, "sbatch b.sh");
    // Timestamps are monotonic non-decreasing within a run set.
    assert!(runs[0].start_time <= runs[1].start_time);
}

#[tokio::test]
async fn dropped_saves_fail_the_barrier_with_persistence_unavailable() {
    init_tracing();

    let store = MemoryStore::new();
    store.drop_saves(true);
    let client = FakeSlurmClient::default();
    let runner = Arc::new(SlurmRunner::new(
        Arc::new(store.clone()),
        Arc::new(client),
        BarrierPolicy {
            poll_interval: Duration::from_millis(10),
            max_wait: Duration::from_millis(100),
        },
    ));

    let mut handler = RunHandler::new(Arc::new(store.clone()), None);
    handler.bind_command(Command::new("sbatch job.sh").unwrap(), runner, None, None);

    assert!(matches!(
        handler.start().await,
        Err(RunsetError::PersistenceUnavailable(_))
    ));
}
