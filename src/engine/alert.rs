use chrono::{DateTime, Utc};

use super::Labels;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertState {
    Pending,
    Firing,
    Resolved,
}

/// An alert as produced by the evaluation engine. State transitions happen
/// inside the engine; this crate only carries the result to the gateway.
#[derive(Debug, Clone)]
pub struct Alert {
    pub state: AlertState,
    pub labels: Labels,
    pub annotations: Labels,
    pub value: f64,
    pub fired_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub valid_until: DateTime<Utc>,
}
