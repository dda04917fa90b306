// tests/status_slurm.rs

//! Two-tier status protocol: live queue first, accounting only once the job
//! has left the queue, indeterminacy reported as `None`.

use std::sync::Arc;
use std::time::Duration;

use runset::exec::{BarrierPolicy, Runner, SlurmRunner};
use runset::store::MemoryStore;
use runset::types::{TerminalState, TerminalVocab};

use runset_test_utils::builders::RunLogBuilder;
use runset_test_utils::fake_slurm::FakeSlurmClient;
use runset_test_utils::init_tracing;

fn runner_with(client: &FakeSlurmClient) -> SlurmRunner {
    SlurmRunner::new(
        Arc::new(MemoryStore::new()),
        Arc::new(client.clone()),
        BarrierPolicy {
            poll_interval: Duration::from_millis(10),
            max_wait: Duration::from_secs(1),
        },
    )
}

#[tokio::test]
async fn live_queue_state_is_not_terminal() {
    init_tracing();

    let client = FakeSlurmClient::default();
    client.set_queue_state("RUNNING");
    let runner = runner_with(&client);

    let log = RunLogBuilder::new("884213").build();
    assert_eq!(runner.check_status(&log).await.unwrap(), None);

    // Accounting must not be consulted while the job is still queued.
    assert_eq!(client.queue_calls(), vec!["884213".to_string()]);
    assert!(client.accounting_calls().is_empty());
}

#[tokio::test]
async fn all_live_substates_report_none() {
    init_tracing();

    let client = FakeSlurmClient::default();
    let runner = runner_with(&client);
    let log = RunLogBuilder::new("884213").build();

    for state in ["PENDING", "RUNNING", "SUSPENDED", "COMPLETING"] {
        client.set_queue_state(state);
        assert_eq!(
            runner.check_status(&log).await.unwrap(),
            None,
            "live sub-state {state} must not be terminal"
        );
    }
}

#[tokio::test]
async fn accounting_state_classifies_after_queue_retires_the_job() {
    init_tracing();

    let client = FakeSlurmClient::default();
    client.set_queue_state("");
    client.set_accounting_state("COMPLETED");
    let runner = runner_with(&client);

    let log = RunLogBuilder::new("884213").build();
    assert_eq!(
        runner.check_status(&log).await.unwrap(),
        Some(TerminalState::Completed)
    );
    assert_eq!(client.accounting_calls(), vec!["884213".to_string()]);
}

#[tokio::test]
async fn suffixed_accounting_tokens_classify_on_the_first_token() {
    init_tracing();

    let client = FakeSlurmClient::default();
    client.set_queue_state("");
    client.set_accounting_state("CANCELLED by 0");
    let runner = runner_with(&client);

    let log = RunLogBuilder::new("884213").build();
    assert_eq!(
        runner.check_status(&log).await.unwrap(),
        Some(TerminalState::Cancelled)
    );
}

#[tokio::test]
async fn missing_or_garbled_accounting_is_indeterminate_not_terminal() {
    init_tracing();

    let client = FakeSlurmClient::default();
    client.set_queue_state("");
    let runner = runner_with(&client);
    let log = RunLogBuilder::new("884213").build();

    for garbled in ["", "   ", "sacct: error", "UNKNOWN_STATE"] {
        client.set_accounting_state(garbled);
        assert_eq!(
            runner.check_status(&log).await.unwrap(),
            None,
            "accounting output {garbled:?} must not fabricate a terminal state"
        );
    }
}

#[tokio::test]
async fn status_is_idempotent_under_unchanged_external_state() {
    init_tracing();

    let client = FakeSlurmClient::default();
    client.set_queue_state("");
    client.set_accounting_state("TIMEOUT");
    let runner = runner_with(&client);
    let log = RunLogBuilder::new("884213").build();

    let first = runner.check_status(&log).await.unwrap();
    assert_eq!(first, Some(TerminalState::Timeout));
    for _ in 0..3 {
        assert_eq!(runner.check_status(&log).await.unwrap(), first);
    }
}

#[tokio::test]
async fn configured_aliases_map_extra_tokens_onto_fixed_states() {
    init_tracing();

    let client = FakeSlurmClient::default();
    client.set_queue_state("");
    client.set_accounting_state("OUT_OF_MEMORY");
    let runner = runner_with(&client).with_terminal_vocab(
        TerminalVocab::default().with_alias("OUT_OF_MEMORY", TerminalState::Failed),
    );

    let log = RunLogBuilder::new("884213").build();
    assert_eq!(
        runner.check_status(&log).await.unwrap(),
        Some(TerminalState::Failed)
    );
}
