use async_trait::async_trait;
use dashmap::DashMap;

use super::{Store, StoreError};
use crate::model::{Rule, Source};

/// In-memory store keyed by id. Backs tests and embedders that manage
/// desired state without a database.
#[derive(Default)]
pub struct MemoryStore {
    rules: DashMap<i64, Rule>,
    sources: DashMap<i64, Source>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_rule(&self, rule: Rule) {
        self.rules.insert(rule.id, rule);
    }

    pub fn insert_source(&self, source: Source) {
        self.sources.insert(source.id, source);
    }

    pub fn delete_rule(&self, id: i64) -> bool {
        self.rules.remove(&id).is_some()
    }

    pub fn delete_source(&self, id: i64) -> bool {
        self.sources.remove(&id).is_some()
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn list_rules(&self) -> Result<Vec<Rule>, StoreError> {
        let mut rules: Vec<Rule> = self.rules.iter().map(|r| r.value().clone()).collect();
        rules.sort_by_key(|r| r.id);
        Ok(rules)
    }

    async fn list_sources(&self) -> Result<Vec<Source>, StoreError> {
        let mut sources: Vec<Source> = self.sources.iter().map(|s| s.value().clone()).collect();
        sources.sort_by_key(|s| s.id);
        Ok(sources)
    }
}
