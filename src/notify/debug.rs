use async_trait::async_trait;

use crate::engine::{Alert, AlertSink};

/// Sink that only logs. Useful when wiring a fleet without a gateway.
pub struct LogSink;

#[async_trait]
impl AlertSink for LogSink {
    async fn notify(&self, expr: &str, alerts: &[Alert]) {
        for alert in alerts {
            tracing::debug!(
                query = expr,
                state = ?alert.state,
                value = alert.value,
                labels = ?alert.labels,
                annotations = ?alert.annotations,
                "send alert"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{AlertState, Labels};
    use chrono::{TimeZone, Utc};

    #[tokio::test]
    async fn logging_a_batch_never_fails() {
        let alert = Alert {
            state: AlertState::Resolved,
            labels: Labels::new(),
            annotations: Labels::new(),
            value: 1.0,
            fired_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            resolved_at: Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 1, 0).unwrap()),
            valid_until: Utc.with_ymd_and_hms(2024, 1, 1, 0, 5, 0).unwrap(),
        };
        LogSink.notify("up == 0", &[alert]).await;
    }
}
