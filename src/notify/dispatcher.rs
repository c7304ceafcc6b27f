use async_trait::async_trait;

use super::gateway::Gateway;
use super::payload::GatewayAlert;
use crate::engine::{Alert, AlertSink};

/// Converts an alert batch into the gateway wire payload and delivers it
/// with bounded effort: up to `retries` attempts, no backoff, and the final
/// outcome is only ever visible in the logs.
pub struct Dispatcher<G: Gateway> {
    gateway: G,
    retries: u32,
    source_url: String,
}

impl<G: Gateway> Dispatcher<G> {
    pub fn new(gateway: G, retries: u32, source_url: String) -> Self {
        Self {
            gateway,
            retries,
            source_url,
        }
    }

    pub async fn dispatch(&self, expr: &str, alerts: &[Alert]) {
        if alerts.is_empty() {
            return;
        }

        let payload: Vec<GatewayAlert> = alerts
            .iter()
            .map(|a| GatewayAlert::from_alert(a, &self.source_url, expr))
            .collect();
        let body = match serde_json::to_vec(&payload) {
            Ok(body) => body,
            Err(e) => {
                tracing::error!(error = %e, "encode alert payload failed");
                return;
            }
        };
        tracing::debug!(alerts = alerts.len(), "alert payload encoded");

        for attempt in 1..=self.retries {
            match self.gateway.push(&body).await {
                Ok(()) => {
                    tracing::debug!(attempt, "notify succeeded");
                    return;
                }
                Err(e) => tracing::error!(error = %e, attempt, "notify failed"),
            }
        }
    }
}

#[async_trait]
impl<G: Gateway> AlertSink for Dispatcher<G> {
    async fn notify(&self, expr: &str, alerts: &[Alert]) {
        self.dispatch(expr, alerts).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{AlertState, Labels};
    use crate::notify::DeliveryError;
    use chrono::{TimeZone, Utc};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    struct ScriptedGateway {
        attempts: AtomicU32,
        statuses: Mutex<Vec<u16>>,
        bodies: Mutex<Vec<Vec<u8>>>,
    }

    impl ScriptedGateway {
        fn new(statuses: Vec<u16>) -> Self {
            Self {
                attempts: AtomicU32::new(0),
                statuses: Mutex::new(statuses),
                bodies: Mutex::new(Vec::new()),
            }
        }

        fn attempts(&self) -> u32 {
            self.attempts.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Gateway for ScriptedGateway {
        async fn push(&self, body: &[u8]) -> Result<(), DeliveryError> {
            let n = self.attempts.fetch_add(1, Ordering::SeqCst) as usize;
            self.bodies.lock().unwrap().push(body.to_vec());
            let statuses = self.statuses.lock().unwrap();
            match statuses.get(n).copied().unwrap_or(200) {
                200 => Ok(()),
                code => Err(DeliveryError::Status(code)),
            }
        }
    }

    fn firing_alert() -> Alert {
        let mut labels = Labels::new();
        labels.insert("alertname".into(), "10".into());
        Alert {
            state: AlertState::Firing,
            labels,
            annotations: Labels::new(),
            value: 0.0,
            fired_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            resolved_at: None,
            valid_until: Utc.with_ymd_and_hms(2024, 1, 1, 0, 5, 0).unwrap(),
        }
    }

    fn dispatcher(statuses: Vec<u16>, retries: u32) -> Dispatcher<ScriptedGateway> {
        Dispatcher::new(
            ScriptedGateway::new(statuses),
            retries,
            "http://metrics-a".into(),
        )
    }

    #[tokio::test]
    async fn empty_batch_makes_no_network_call() {
        let d = dispatcher(vec![200], 3);
        d.dispatch("up == 0", &[]).await;
        assert_eq!(d.gateway.attempts(), 0);
    }

    #[tokio::test]
    async fn exhaustion_makes_exactly_retries_attempts() {
        let d = dispatcher(vec![500, 500, 500, 500], 3);
        d.dispatch("up == 0", &[firing_alert()]).await;
        assert_eq!(d.gateway.attempts(), 3);
    }

    #[tokio::test]
    async fn stops_after_first_success() {
        let d = dispatcher(vec![500, 500, 200, 200], 3);
        d.dispatch("up == 0", &[firing_alert()]).await;
        assert_eq!(d.gateway.attempts(), 3);
    }

    #[tokio::test]
    async fn first_attempt_success_makes_one_call() {
        let d = dispatcher(vec![200], 3);
        d.dispatch("up == 0", &[firing_alert()]).await;
        assert_eq!(d.gateway.attempts(), 1);
    }

    #[tokio::test]
    async fn body_is_a_json_array_of_payload_records() {
        let d = dispatcher(vec![200], 3);
        d.dispatch("up == 0", &[firing_alert()]).await;
        let bodies = d.gateway.bodies.lock().unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&bodies[0]).unwrap();
        let records = parsed.as_array().unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0]["labels"]
            .as_object()
            .unwrap()
            .get("alertname")
            .is_none());
        assert_eq!(
            records[0]["generatorURL"].as_str().unwrap(),
            "http://metrics-a/graph?g0.expr=up%20%3D%3D%200&g0.tab=1"
        );
    }
}
