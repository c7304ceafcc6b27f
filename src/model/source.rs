use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A named origin of metrics with its own backend address. A source with an
/// empty `url` is never schedulable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Source {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub create_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub update_time: Option<DateTime<Utc>>,
}

impl Source {
    /// Placeholder for a source id referenced by rules but missing from the
    /// store snapshot. Its empty url keeps it unschedulable.
    pub fn unknown(id: i64) -> Self {
        Self {
            id,
            name: String::new(),
            url: String::new(),
            create_time: None,
            update_time: None,
        }
    }

    pub fn schedulable(&self) -> bool {
        !self.url.is_empty()
    }
}
