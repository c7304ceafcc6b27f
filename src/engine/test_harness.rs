use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::{Engine, EngineError, EngineFactory, EngineOptions};

/// Call record shared between a mock engine and the test that owns it.
#[derive(Default)]
pub struct EngineCalls {
    pub updates: Mutex<Vec<(Duration, Vec<PathBuf>)>>,
    pub update_attempts: AtomicU32,
    pub run_count: AtomicU32,
    pub stop_count: AtomicU32,
    pub running: AtomicBool,
}

impl EngineCalls {
    pub fn update_count(&self) -> usize {
        self.updates.lock().unwrap().len()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

pub struct MockEngine {
    calls: Arc<EngineCalls>,
    fail_update: bool,
}

#[async_trait]
impl Engine for MockEngine {
    async fn update(&self, interval: Duration, rule_files: &[PathBuf]) -> Result<(), EngineError> {
        self.calls.update_attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail_update {
            return Err(EngineError::Reload("injected update failure".into()));
        }
        self.calls
            .updates
            .lock()
            .unwrap()
            .push((interval, rule_files.to_vec()));
        Ok(())
    }

    fn run(&self) {
        self.calls.run_count.fetch_add(1, Ordering::SeqCst);
        self.calls.running.store(true, Ordering::SeqCst);
    }

    fn stop(&self) {
        self.calls.stop_count.fetch_add(1, Ordering::SeqCst);
        self.calls.running.store(false, Ordering::SeqCst);
    }
}

/// Factory producing recording mock engines, one `EngineCalls` per created
/// instance in creation order. Failure injection covers the two error paths
/// the reloader distinguishes: creation and update.
#[derive(Default)]
pub struct MockEngineFactory {
    pub created: Mutex<Vec<Arc<EngineCalls>>>,
    fail_update: AtomicBool,
    fail_creates_after: Mutex<Option<u32>>,
}

impl MockEngineFactory {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Every engine created after the first `n` fails at creation time.
    pub fn fail_creates_after(&self, n: u32) {
        *self.fail_creates_after.lock().unwrap() = Some(n);
    }

    /// All engines created from now on fail every `update` call.
    pub fn fail_updates(&self, fail: bool) {
        self.fail_update.store(fail, Ordering::SeqCst);
    }

    pub fn created_count(&self) -> usize {
        self.created.lock().unwrap().len()
    }

    pub fn calls(&self, index: usize) -> Arc<EngineCalls> {
        self.created.lock().unwrap()[index].clone()
    }
}

impl EngineFactory for MockEngineFactory {
    fn create(&self, _opts: EngineOptions) -> Result<Box<dyn Engine>, EngineError> {
        let mut created = self.created.lock().unwrap();
        if let Some(limit) = *self.fail_creates_after.lock().unwrap() {
            if created.len() as u32 >= limit {
                return Err(EngineError::Create("injected create failure".into()));
            }
        }
        let calls = Arc::new(EngineCalls::default());
        created.push(calls.clone());
        Ok(Box::new(MockEngine {
            calls,
            fail_update: self.fail_update.load(Ordering::SeqCst),
        }))
    }
}

struct NullQuery;

#[async_trait]
impl super::QuerySource for NullQuery {
    async fn query(
        &self,
        _expr: &str,
        _at: chrono::DateTime<chrono::Utc>,
    ) -> Result<super::Vector, crate::query::QueryError> {
        Ok(Vec::new())
    }
}

struct NullSink;

#[async_trait]
impl super::AlertSink for NullSink {
    async fn notify(&self, _expr: &str, _alerts: &[super::Alert]) {}
}

/// Options wired to no-op callbacks, for driving a mock engine directly.
pub fn noop_options() -> EngineOptions {
    EngineOptions {
        query: Arc::new(NullQuery),
        notify: Arc::new(NullSink),
        outage_tolerance: super::OUTAGE_TOLERANCE,
        for_grace_period: super::FOR_GRACE_PERIOD,
        resend_delay: super::RESEND_DELAY,
        shutdown: tokio_util::sync::CancellationToken::new(),
    }
}
