mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use std::fmt;

use crate::model::{Rule, Source};

/// Read access to the desired state. The reloader takes a snapshot through
/// this trait at the start of every tick; the storage engine behind it is
/// whatever the embedder injects.
#[async_trait]
pub trait Store: Send + Sync {
    async fn list_rules(&self) -> Result<Vec<Rule>, StoreError>;
    async fn list_sources(&self) -> Result<Vec<Source>, StoreError>;
}

#[derive(Debug)]
pub enum StoreError {
    Database(sqlx::Error),
    Unavailable(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Database(e) => write!(f, "database: {e}"),
            Self::Unavailable(msg) => write!(f, "store unavailable: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        Self::Database(e)
    }
}
