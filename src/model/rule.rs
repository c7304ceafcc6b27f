use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One alerting condition attached to a source. The effective expression is
/// `expr op value`, space-joined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Rule {
    #[serde(default)]
    pub id: i64,
    pub expr: String,
    pub op: String,
    pub value: String,
    /// Duration string the condition must hold before firing, passed through
    /// verbatim to the evaluation engine.
    #[serde(rename = "for", default)]
    #[sqlx(rename = "for")]
    pub for_duration: String,
    pub source_id: i64,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub create_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub update_time: Option<DateTime<Utc>>,
}

impl Rule {
    pub fn expression(&self) -> String {
        [self.expr.as_str(), self.op.as_str(), self.value.as_str()].join(" ")
    }
}
