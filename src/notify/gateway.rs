use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::fmt;
use std::time::Duration;

/// Per-attempt delivery timeout.
pub const ATTEMPT_TIMEOUT: Duration = Duration::from_secs(5);

/// One delivery attempt against the notification gateway.
#[async_trait]
pub trait Gateway: Send + Sync {
    async fn push(&self, body: &[u8]) -> Result<(), DeliveryError>;
}

#[derive(Debug)]
pub enum DeliveryError {
    Transport(reqwest::Error),
    Status(u16),
}

impl fmt::Display for DeliveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(e) => write!(f, "transport: {e}"),
            Self::Status(code) => write!(f, "gateway returned status {code}"),
        }
    }
}

impl std::error::Error for DeliveryError {}

/// HTTP gateway client. Authenticates with a `Token` header; only a 200
/// response counts as delivered.
pub struct HttpGateway {
    url: String,
    token: String,
    client: Client,
}

impl HttpGateway {
    pub fn new(url: String, token: String) -> Self {
        Self {
            url,
            token,
            client: Client::new(),
        }
    }
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn push(&self, body: &[u8]) -> Result<(), DeliveryError> {
        let resp = self
            .client
            .post(&self.url)
            .timeout(ATTEMPT_TIMEOUT)
            .header("Token", &self.token)
            .header("Content-Type", "application/json")
            .body(body.to_vec())
            .send()
            .await
            .map_err(DeliveryError::Transport)?;

        if resp.status() == StatusCode::OK {
            Ok(())
        } else {
            Err(DeliveryError::Status(resp.status().as_u16()))
        }
    }
}
