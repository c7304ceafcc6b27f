use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::engine::{
    self, AlertSink, Engine, EngineError, EngineFactory, EngineOptions, QuerySource,
};
use crate::model::{Rule, Source};
use crate::notify::{Dispatcher, HttpGateway};
use crate::query::HttpQuerier;
use crate::ruledoc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagerState {
    Created,
    Running,
    Stopped,
}

/// Owns one source's evaluation engine instance: wires the query adapter and
/// notification dispatcher into the engine's callbacks and carries the
/// Created -> Running -> Stopped lifecycle. The reloader is the only caller
/// of `run`, `stop` and `update`.
pub struct Manager {
    source: Source,
    config: Config,
    engine: Box<dyn Engine>,
    state: ManagerState,
    rule_file: PathBuf,
}

impl Manager {
    pub fn new(
        source: Source,
        config: Config,
        factory: &dyn EngineFactory,
        shutdown: CancellationToken,
    ) -> Result<Self, EngineError> {
        let query: Arc<dyn QuerySource> = Arc::new(HttpQuerier::new(source.url.clone()));
        let gateway = HttpGateway::new(config.notify_url(), config.auth_token.clone());
        let notify: Arc<dyn AlertSink> = Arc::new(Dispatcher::new(
            gateway,
            config.notify_retries,
            source.url.clone(),
        ));

        let engine = factory.create(EngineOptions {
            query,
            notify,
            outage_tolerance: engine::OUTAGE_TOLERANCE,
            for_grace_period: engine::FOR_GRACE_PERIOD,
            resend_delay: engine::RESEND_DELAY,
            shutdown,
        })?;

        // Keyed by source id so a re-update overwrites rather than
        // accumulates files.
        let rule_file = config.rules_dir().join(format!("rule.{}.yml", source.id));

        Ok(Self {
            source,
            config,
            engine,
            state: ManagerState::Created,
            rule_file,
        })
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn state(&self) -> ManagerState {
        self.state
    }

    pub fn rule_file(&self) -> &PathBuf {
        &self.rule_file
    }

    /// Starts the engine's background evaluation. No-op unless freshly
    /// created; a stopped manager never restarts.
    pub fn run(&mut self) {
        if self.state != ManagerState::Created {
            return;
        }
        tracing::info!(source_id = self.source.id, "start rule manager");
        self.engine.run();
        self.state = ManagerState::Running;
    }

    pub fn stop(&mut self) {
        if self.state == ManagerState::Stopped {
            return;
        }
        tracing::info!(source_id = self.source.id, "stop rule manager");
        self.engine.stop();
        self.state = ManagerState::Stopped;
    }

    /// Rewrites the rule document and re-registers it with the engine. Safe
    /// to call every tick with unchanged rules.
    pub async fn update(&mut self, rules: &[Rule]) -> Result<(), UpdateError> {
        let content = ruledoc::render(rules).map_err(|e| {
            tracing::error!(error = %e, source_id = self.source.id, "render rule document failed");
            UpdateError::Render(e)
        })?;

        tokio::fs::write(&self.rule_file, &content).await.map_err(|e| {
            tracing::error!(error = %e, source_id = self.source.id, "write rule document failed");
            UpdateError::Io(e)
        })?;

        self.engine
            .update(
                self.config.evaluation_interval(),
                std::slice::from_ref(&self.rule_file),
            )
            .await
            .map_err(UpdateError::Engine)
    }
}

#[derive(Debug)]
pub enum UpdateError {
    Render(serde_yaml::Error),
    Io(std::io::Error),
    Engine(EngineError),
}

impl fmt::Display for UpdateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Render(e) => write!(f, "render: {e}"),
            Self::Io(e) => write!(f, "write rule document: {e}"),
            Self::Engine(e) => write!(f, "engine: {e}"),
        }
    }
}

impl std::error::Error for UpdateError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_harness::MockEngineFactory;
    use std::sync::atomic::Ordering;

    fn source(id: i64, url: &str) -> Source {
        let mut s = Source::unknown(id);
        s.url = url.into();
        s
    }

    fn rule(id: i64, source_id: i64) -> Rule {
        Rule {
            id,
            expr: "up".into(),
            op: "==".into(),
            value: "0".into(),
            for_duration: "5m".into(),
            source_id,
            summary: String::new(),
            description: String::new(),
            create_time: None,
            update_time: None,
        }
    }

    fn test_config(dir: &tempfile::TempDir) -> Config {
        Config {
            rules_dir: Some(dir.path().to_path_buf()),
            ..Config::default()
        }
    }

    #[tokio::test]
    async fn run_and_stop_are_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let factory = MockEngineFactory::new();
        let mut manager = Manager::new(
            source(1, "http://metrics-a"),
            test_config(&dir),
            factory.as_ref(),
            CancellationToken::new(),
        )
        .unwrap();

        assert_eq!(manager.state(), ManagerState::Created);
        manager.run();
        manager.run();
        assert_eq!(manager.state(), ManagerState::Running);

        manager.stop();
        manager.stop();
        assert_eq!(manager.state(), ManagerState::Stopped);

        let calls = factory.calls(0);
        assert_eq!(calls.run_count.load(Ordering::SeqCst), 1);
        assert_eq!(calls.stop_count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn stopped_manager_never_restarts() {
        let dir = tempfile::tempdir().unwrap();
        let factory = MockEngineFactory::new();
        let mut manager = Manager::new(
            source(1, "http://metrics-a"),
            test_config(&dir),
            factory.as_ref(),
            CancellationToken::new(),
        )
        .unwrap();

        manager.stop();
        manager.run();
        assert_eq!(manager.state(), ManagerState::Stopped);
        assert_eq!(factory.calls(0).run_count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn update_writes_document_and_reloads_engine() {
        let dir = tempfile::tempdir().unwrap();
        let factory = MockEngineFactory::new();
        let mut manager = Manager::new(
            source(7, "http://metrics-a"),
            test_config(&dir),
            factory.as_ref(),
            CancellationToken::new(),
        )
        .unwrap();

        manager.update(&[rule(10, 7)]).await.unwrap();

        let path = dir.path().join("rule.7.yml");
        assert_eq!(manager.rule_file(), &path);
        let written = std::fs::read(&path).unwrap();
        assert_eq!(written, ruledoc::render(&[rule(10, 7)]).unwrap());

        let calls = factory.calls(0);
        let updates = calls.updates.lock().unwrap();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].0, Config::default().evaluation_interval());
        assert_eq!(updates[0].1, vec![path]);
    }

    #[tokio::test]
    async fn repeated_update_overwrites_same_file() {
        let dir = tempfile::tempdir().unwrap();
        let factory = MockEngineFactory::new();
        let mut manager = Manager::new(
            source(7, "http://metrics-a"),
            test_config(&dir),
            factory.as_ref(),
            CancellationToken::new(),
        )
        .unwrap();

        manager.update(&[rule(10, 7)]).await.unwrap();
        let first = std::fs::read(manager.rule_file()).unwrap();
        manager.update(&[rule(10, 7)]).await.unwrap();
        let second = std::fs::read(manager.rule_file()).unwrap();

        assert_eq!(first, second);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn engine_reload_failure_surfaces_as_update_error() {
        let dir = tempfile::tempdir().unwrap();
        let factory = MockEngineFactory::new();
        factory.fail_updates(true);
        let mut manager = Manager::new(
            source(7, "http://metrics-a"),
            test_config(&dir),
            factory.as_ref(),
            CancellationToken::new(),
        )
        .unwrap();

        let err = manager.update(&[rule(10, 7)]).await.unwrap_err();
        assert!(matches!(err, UpdateError::Engine(_)));
        // the document itself was still written
        assert!(manager.rule_file().exists());
    }

    #[tokio::test]
    async fn unwritable_rules_dir_surfaces_as_io_error() {
        let factory = MockEngineFactory::new();
        let config = Config {
            rules_dir: Some(PathBuf::from("/nonexistent/rulesync-test")),
            ..Config::default()
        };
        let mut manager = Manager::new(
            source(7, "http://metrics-a"),
            config,
            factory.as_ref(),
            CancellationToken::new(),
        )
        .unwrap();

        let err = manager.update(&[rule(10, 7)]).await.unwrap_err();
        assert!(matches!(err, UpdateError::Io(_)));
    }
}
