use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Shared configuration handed to every evaluator handle. Engine tunables
/// are process-wide constants in `crate::engine` and deliberately absent
/// here.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Config {
    pub gateway_url: String,
    #[serde(default = "default_notify_path")]
    pub gateway_notify_path: String,
    #[serde(default)]
    pub auth_token: String,
    #[serde(default = "default_notify_retries")]
    pub notify_retries: u32,
    #[serde(default = "default_reload_interval_secs")]
    pub reload_interval_secs: u64,
    #[serde(default = "default_evaluation_interval_secs")]
    pub evaluation_interval_secs: u64,
    /// Directory for transient rule documents. Defaults to the system temp
    /// directory.
    #[serde(default)]
    pub rules_dir: Option<PathBuf>,
}

impl Config {
    pub fn reload_interval(&self) -> Duration {
        Duration::from_secs(self.reload_interval_secs)
    }

    pub fn evaluation_interval(&self) -> Duration {
        Duration::from_secs(self.evaluation_interval_secs)
    }

    pub fn notify_url(&self) -> String {
        format!("{}{}", self.gateway_url, self.gateway_notify_path)
    }

    pub fn rules_dir(&self) -> PathBuf {
        self.rules_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gateway_url: "http://127.0.0.1:9093".into(),
            gateway_notify_path: default_notify_path(),
            auth_token: String::new(),
            notify_retries: default_notify_retries(),
            reload_interval_secs: default_reload_interval_secs(),
            evaluation_interval_secs: default_evaluation_interval_secs(),
            rules_dir: None,
        }
    }
}

fn default_notify_path() -> String {
    "/api/v1/alerts".into()
}

fn default_notify_retries() -> u32 {
    3
}

fn default_reload_interval_secs() -> u64 {
    60
}

fn default_evaluation_interval_secs() -> u64 {
    15
}
