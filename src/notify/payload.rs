use chrono::{DateTime, Utc};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Serialize;

use crate::engine::{Alert, Labels};

// Escape everything a query-string component must escape, keeping the
// unreserved characters readable.
const EXPR_ESCAPE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// One record of the wire payload the notification gateway receives.
#[derive(Debug, Serialize)]
pub struct GatewayAlert {
    pub labels: Labels,
    pub annotations: Labels,
    #[serde(rename = "startsAt")]
    pub starts_at: DateTime<Utc>,
    #[serde(rename = "endsAt")]
    pub ends_at: DateTime<Utc>,
    #[serde(rename = "generatorURL")]
    pub generator_url: String,
}

impl GatewayAlert {
    /// The synthetic `alertname` label carries the internal rule id and is
    /// stripped before the alert leaves this process. An unresolved alert
    /// gets its validity horizon as `endsAt`.
    pub fn from_alert(alert: &Alert, source_url: &str, expr: &str) -> Self {
        let mut labels = alert.labels.clone();
        labels.remove("alertname");
        Self {
            labels,
            annotations: alert.annotations.clone(),
            starts_at: alert.fired_at,
            ends_at: alert.resolved_at.unwrap_or(alert.valid_until),
            generator_url: format!("{}{}", source_url, table_link_for_expression(expr)),
        }
    }
}

/// Link to the expression on the source's own query UI.
pub fn table_link_for_expression(expr: &str) -> String {
    format!(
        "/graph?g0.expr={}&g0.tab=1",
        utf8_percent_encode(expr, EXPR_ESCAPE)
    )
}
