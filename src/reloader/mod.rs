use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::engine::{EngineError, EngineFactory};
use crate::manager::Manager;
use crate::model::{Rule, Source, SourceRuleSet};
use crate::store::{Store, StoreError};

/// The control loop. Polls desired state from the store and converges the
/// set of live managers to it, one strictly sequential tick at a time. Sole
/// owner of the manager collection and sole caller of manager lifecycle
/// operations.
pub struct Reloader {
    config: Config,
    store: Arc<dyn Store>,
    factory: Arc<dyn EngineFactory>,
    managers: Vec<Manager>,
    shutdown: CancellationToken,
}

#[derive(Debug)]
pub enum ReloadError {
    Store(StoreError),
    CreateManager(EngineError),
}

impl fmt::Display for ReloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Store(e) => write!(f, "read desired state: {e}"),
            Self::CreateManager(e) => write!(f, "create manager: {e}"),
        }
    }
}

impl std::error::Error for ReloadError {}

impl Reloader {
    pub fn new(
        config: Config,
        store: Arc<dyn Store>,
        factory: Arc<dyn EngineFactory>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            config,
            store,
            factory,
            managers: Vec::new(),
            shutdown,
        }
    }

    pub fn managers(&self) -> &[Manager] {
        &self.managers
    }

    /// Ticks until cancelled, then tears every manager down. Failed ticks
    /// are logged and retried on the next interval.
    pub async fn run(&mut self) {
        loop {
            if let Err(e) = self.tick().await {
                tracing::error!(error = %e, "reconciliation tick failed");
            }
            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                _ = tokio::time::sleep(self.config.reload_interval()) => {}
            }
        }
        self.stop_all();
    }

    /// Stops and drops every live manager.
    pub fn stop_all(&mut self) {
        for manager in &mut self.managers {
            manager.stop();
        }
        self.managers.clear();
    }

    /// One reconciliation pass. Store-read failure aborts the tick before
    /// anything is touched; manager-creation failure aborts the remainder of
    /// the tick; per-source update failures only skip that source.
    pub async fn tick(&mut self) -> Result<(), ReloadError> {
        tracing::debug!("reconciliation tick started");
        let desired = self.desired_state().await?;

        // Deletion pass: partition the live set before mutating anything. An
        // empty desired url can never match, so a source whose url was
        // cleared always loses its manager here.
        let live = std::mem::take(&mut self.managers);
        let (keep, gone): (Vec<_>, Vec<_>) = live
            .into_iter()
            .partition(|m| desired.iter().any(|d| matches(m.source(), &d.source)));
        self.managers = keep;
        for mut manager in gone {
            tracing::info!(
                source_id = manager.source().id,
                source_url = %manager.source().url,
                "source no longer desired, stopping manager"
            );
            manager.stop();
        }

        // Convergence pass.
        for set in &desired {
            if !set.source.schedulable() {
                tracing::error!(source_id = set.source.id, "source url is empty, skipping");
                continue;
            }

            let pos = self
                .managers
                .iter()
                .position(|m| matches(m.source(), &set.source));
            let pos = match pos {
                Some(pos) => pos,
                None => {
                    let mut manager = Manager::new(
                        set.source.clone(),
                        self.config.clone(),
                        self.factory.as_ref(),
                        self.shutdown.child_token(),
                    )
                    .map_err(|e| {
                        tracing::error!(
                            error = %e,
                            source_id = set.source.id,
                            source_url = %set.source.url,
                            "create manager failed"
                        );
                        ReloadError::CreateManager(e)
                    })?;
                    manager.run();
                    self.managers.push(manager);
                    self.managers.len() - 1
                }
            };

            match self.managers[pos].update(&set.rules).await {
                Ok(()) => tracing::info!(
                    source_id = set.source.id,
                    source_url = %set.source.url,
                    rules = set.rules.len(),
                    "rules updated"
                ),
                Err(e) => tracing::error!(
                    error = %e,
                    source_id = set.source.id,
                    source_url = %set.source.url,
                    "update rules failed"
                ),
            }
        }

        tracing::debug!("reconciliation tick finished");
        Ok(())
    }

    /// Snapshot of the store grouped per source. A source with zero rules is
    /// simply absent; a rule whose source row is missing gets an
    /// unschedulable placeholder so the convergence pass logs and skips it.
    async fn desired_state(&self) -> Result<Vec<SourceRuleSet>, ReloadError> {
        let rules = self.store.list_rules().await.map_err(ReloadError::Store)?;
        let sources = self.store.list_sources().await.map_err(ReloadError::Store)?;
        tracing::debug!(
            rules = rules.len(),
            sources = sources.len(),
            "desired state loaded"
        );

        let mut grouped: BTreeMap<i64, Vec<Rule>> = BTreeMap::new();
        for rule in rules {
            grouped.entry(rule.source_id).or_default().push(rule);
        }

        Ok(grouped
            .into_iter()
            .map(|(source_id, rules)| {
                let source = sources
                    .iter()
                    .find(|s| s.id == source_id)
                    .cloned()
                    .unwrap_or_else(|| Source::unknown(source_id));
                SourceRuleSet { source, rules }
            })
            .collect())
    }
}

fn matches(live: &Source, desired: &Source) -> bool {
    live.id == desired.id && live.url == desired.url && desired.schedulable()
}
