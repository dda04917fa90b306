use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use runset::errors::Result;
use runset::exec::{SchedulerOutput, SlurmClient};

#[derive(Debug)]
struct Inner {
    submit_stdout: String,
    submit_stderr: String,
    queue_state: String,
    accounting_state: String,
    submit_calls: Vec<String>,
    queue_calls: Vec<String>,
    accounting_calls: Vec<String>,
}

/// A scripted scheduler client that:
/// - records every submit/queue/accounting call it receives
/// - answers from configurable canned responses, adjustable mid-test.
#[derive(Debug, Clone)]
pub struct FakeSlurmClient {
    inner: Arc<Mutex<Inner>>,
}

impl Default for FakeSlurmClient {
    fn default() -> Self {
        Self::new("Submitted batch job 884213\n", "")
    }
}

impl FakeSlurmClient {
    pub fn new(submit_stdout: impl Into<String>, submit_stderr: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                submit_stdout: submit_stdout.into(),
                submit_stderr: submit_stderr.into(),
                queue_state: String::new(),
                accounting_state: String::new(),
                submit_calls: Vec::new(),
                queue_calls: Vec::new(),
                accounting_calls: Vec::new(),
            })),
        }
    }

    /// Set what the live-queue query returns (empty = job left the queue).
    pub fn set_queue_state(&self, state: impl Into<String>) {
        self.inner.lock().unwrap().queue_state = state.into();
    }

    /// Set what the accounting query returns.
    pub fn set_accounting_state(&self, state: impl Into<String>) {
        self.inner.lock().unwrap().accounting_state = state.into();
    }

    pub fn submit_calls(&self) -> Vec<String> {
        self.inner.lock().unwrap().submit_calls.clone()
    }

    pub fn queue_calls(&self) -> Vec<String> {
        self.inner.lock().unwrap().queue_calls.clone()
    }

    pub fn accounting_calls(&self) -> Vec<String> {
        self.inner.lock().unwrap().accounting_calls.clone()
    }
}

impl SlurmClient for FakeSlurmClient {
    fn submit<'a>(
        &'a self,
        cmd_text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<SchedulerOutput>> + Send + 'a>> {
        let inner = Arc::clone(&self.inner);
        let cmd_text = cmd_text.to_string();
        Box::pin(async move {
            let mut guard = inner.lock().unwrap();
            guard.submit_calls.push(cmd_text);
            Ok(SchedulerOutput {
                stdout: guard.submit_stdout.clone(),
                stderr: guard.submit_stderr.clone(),
            })
        })
    }

    fn queue_state<'a>(
        &'a self,
        job_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>> {
        let inner = Arc::clone(&self.inner);
        let job_id = job_id.to_string();
        Box::pin(async move {
            let mut guard = inner.lock().unwrap();
            guard.queue_calls.push(job_id);
            Ok(guard.queue_state.clone())
        })
    }

    fn accounting_state<'a>(
        &'a self,
        job_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>> {
        let inner = Arc::clone(&self.inner);
        let job_id = job_id.to_string();
        Box::pin(async move {
            let mut guard = inner.lock().unwrap();
            guard.accounting_calls.push(job_id);
            Ok(guard.accounting_state.clone())
        })
    }
}
