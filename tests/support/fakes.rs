// ABOUTME: In-memory implementations of the runner, object store, and CDN seams.
// ABOUTME: Record every call so tests can assert on exact interactions.

use async_trait::async_trait;
use nonempty::NonEmpty;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

use skylift::cdn::{CdnClient, CdnError};
use skylift::infra::{CommandRunner, InfraCommandResult, Invocation};
use skylift::release::Interrupt;
use skylift::sync::{ObjectStore, PutRequest, StoreError};
use skylift::types::{DistributionId, InvalidationId};

/// Scripted engine. Unscripted calls succeed with empty output.
#[derive(Default)]
pub struct ScriptedRunner {
    responses: Mutex<VecDeque<io::Result<InfraCommandResult>>>,
    calls: Mutex<Vec<Invocation>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the result of the next call.
    pub fn then(self, exit_code: i32, stdout: &str, stderr: &str) -> Self {
        self.responses.lock().push_back(Ok(InfraCommandResult {
            exit_code: Some(exit_code),
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
        }));
        self
    }

    pub fn then_ok(self) -> Self {
        self.then(0, "", "")
    }

    /// Queue a spawn failure for the next call.
    pub fn then_missing_binary(self) -> Self {
        self.responses
            .lock()
            .push_back(Err(io::Error::from(io::ErrorKind::NotFound)));
        self
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().clone()
    }

    /// First argument of each call (init, plan, apply, ...).
    pub fn subcommands(&self) -> Vec<String> {
        self.calls
            .lock()
            .iter()
            .map(|c| c.args.first().cloned().unwrap_or_default())
            .collect()
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, invocation: &Invocation) -> io::Result<InfraCommandResult> {
        self.calls.lock().push(invocation.clone());
        self.responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| {
                Ok(InfraCommandResult {
                    exit_code: Some(0),
                    ..Default::default()
                })
            })
    }
}

/// Interrupt fired by the test itself. Clones share one request.
#[derive(Clone)]
pub struct ManualInterrupt {
    tx: Arc<watch::Sender<bool>>,
}

impl ManualInterrupt {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }
}

#[async_trait]
impl Interrupt for ManualInterrupt {
    fn is_requested(&self) -> bool {
        *self.tx.borrow()
    }

    async fn requested(&self) {
        let mut rx = self.tx.subscribe();
        let _ = rx.wait_for(|fired| *fired).await;
    }
}

/// Runner that fires an interrupt as soon as the engine is started, then
/// behaves like the wrapped runner after `delay`.
pub struct InterruptingRunner {
    pub inner: ScriptedRunner,
    pub interrupt: ManualInterrupt,
    pub delay: Duration,
    finished: Mutex<usize>,
}

impl InterruptingRunner {
    pub fn new(inner: ScriptedRunner, interrupt: ManualInterrupt, delay: Duration) -> Self {
        Self {
            inner,
            interrupt,
            delay,
            finished: Mutex::new(0),
        }
    }

    /// Engine calls that ran to completion.
    pub fn finished(&self) -> usize {
        *self.finished.lock()
    }
}

#[async_trait]
impl CommandRunner for InterruptingRunner {
    async fn run(&self, invocation: &Invocation) -> io::Result<InfraCommandResult> {
        self.interrupt.trigger();
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let result = self.inner.run(invocation).await;
        *self.finished.lock() += 1;
        result
    }
}

/// Object store keeping every put in memory.
#[derive(Default)]
pub struct MemoryStore {
    puts: Mutex<Vec<PutRequest>>,
    fail_key: Option<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject puts for `key`.
    pub fn failing_on(key: &str) -> Self {
        Self {
            puts: Mutex::new(Vec::new()),
            fail_key: Some(key.to_string()),
        }
    }

    pub fn puts(&self) -> Vec<PutRequest> {
        self.puts.lock().clone()
    }

    pub fn put_count(&self) -> usize {
        self.puts.lock().len()
    }

    pub fn get(&self, key: &str) -> Option<PutRequest> {
        self.puts
            .lock()
            .iter()
            .find(|p| p.key.as_str() == key)
            .cloned()
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn put(&self, request: PutRequest) -> Result<(), StoreError> {
        if self.fail_key.as_deref() == Some(request.key.as_str()) {
            return Err(StoreError::Request("access denied".to_string()));
        }
        self.puts.lock().push(request);
        Ok(())
    }
}

/// One recorded invalidation call.
#[derive(Debug, Clone)]
pub struct InvalidationCall {
    pub distribution: String,
    pub caller_reference: String,
    pub paths: Vec<String>,
}

/// CDN recording every invalidation.
#[derive(Default)]
pub struct RecordingCdn {
    calls: Mutex<Vec<InvalidationCall>>,
    fail: bool,
}

impl RecordingCdn {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn calls(&self) -> Vec<InvalidationCall> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl CdnClient for RecordingCdn {
    async fn create_invalidation(
        &self,
        distribution: &DistributionId,
        caller_reference: &str,
        paths: &NonEmpty<String>,
    ) -> Result<InvalidationId, CdnError> {
        self.calls.lock().push(InvalidationCall {
            distribution: distribution.to_string(),
            caller_reference: caller_reference.to_string(),
            paths: paths.iter().cloned().collect(),
        });
        if self.fail {
            return Err(CdnError::Request("throttled".to_string()));
        }
        Ok(InvalidationId::new(format!("I{}", self.calls.lock().len())))
    }
}
