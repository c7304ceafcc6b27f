mod alert;
mod vector;
pub mod test_harness;

pub use alert::{Alert, AlertState};
pub use vector::{Labels, Sample, Vector};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::query::QueryError;

/// How long the engine keeps restored alert state usable after an outage.
pub const OUTAGE_TOLERANCE: Duration = Duration::from_secs(60 * 60);
/// Minimum hold-duration grace applied to restored alerts.
pub const FOR_GRACE_PERIOD: Duration = Duration::from_secs(10 * 60);
/// Minimum delay before an unresolved alert is re-sent.
pub const RESEND_DELAY: Duration = Duration::from_secs(60);

/// Answers instant vector queries on behalf of the engine.
#[async_trait]
pub trait QuerySource: Send + Sync {
    async fn query(&self, expr: &str, at: DateTime<Utc>) -> Result<Vector, QueryError>;
}

/// Receives firing and resolved alerts from the engine. Delivery outcomes
/// are never reported back; the engine fires and forgets.
#[async_trait]
pub trait AlertSink: Send + Sync {
    async fn notify(&self, expr: &str, alerts: &[Alert]);
}

/// Everything an engine instance needs to evaluate one source: the query and
/// notify callbacks, process-wide tunables, and a cancellation token scoped
/// to that instance.
pub struct EngineOptions {
    pub query: Arc<dyn QuerySource>,
    pub notify: Arc<dyn AlertSink>,
    pub outage_tolerance: Duration,
    pub for_grace_period: Duration,
    pub resend_delay: Duration,
    pub shutdown: CancellationToken,
}

/// The contract of the external rule-evaluation engine. The engine owns
/// expression evaluation and alert state transitions; this crate only drives
/// it: `update` reloads rule-group files, `run` starts the background
/// evaluation schedule, `stop` halts it.
#[async_trait]
pub trait Engine: Send + Sync {
    async fn update(&self, interval: Duration, rule_files: &[PathBuf]) -> Result<(), EngineError>;
    fn run(&self);
    fn stop(&self);
}

/// Builds engine instances. Injected into the reloader so handle creation
/// stays testable without a real engine.
pub trait EngineFactory: Send + Sync {
    fn create(&self, opts: EngineOptions) -> Result<Box<dyn Engine>, EngineError>;
}

#[derive(Debug)]
pub enum EngineError {
    Create(String),
    Reload(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create(msg) => write!(f, "create engine: {msg}"),
            Self::Reload(msg) => write!(f, "reload rules: {msg}"),
        }
    }
}

impl std::error::Error for EngineError {}
