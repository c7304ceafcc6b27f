use sqlx::PgPool;

use super::{Store, StoreError};
use crate::model::{Rule, Source};

const RULE_COLUMNS: &str =
    r#"id, expr, op, value, "for", source_id, summary, description, create_time, update_time"#;
const SOURCE_COLUMNS: &str = "id, name, url, create_time, update_time";

/// Postgres-backed rule and source store.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert_rule(&self, rule: &Rule) -> Result<i64, StoreError> {
        let (id,): (i64,) = sqlx::query_as(
            r#"INSERT INTO t_rule (expr, op, value, "for", source_id, summary, description, create_time, update_time)
               VALUES ($1, $2, $3, $4, $5, $6, $7, now(), now())
               RETURNING id"#,
        )
        .bind(&rule.expr)
        .bind(&rule.op)
        .bind(&rule.value)
        .bind(&rule.for_duration)
        .bind(rule.source_id)
        .bind(&rule.summary)
        .bind(&rule.description)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    pub async fn update_rule(&self, rule: &Rule) -> Result<(), StoreError> {
        sqlx::query(
            r#"UPDATE t_rule
               SET expr = $1, op = $2, value = $3, "for" = $4, source_id = $5,
                   summary = $6, description = $7, update_time = now()
               WHERE id = $8"#,
        )
        .bind(&rule.expr)
        .bind(&rule.op)
        .bind(&rule.value)
        .bind(&rule.for_duration)
        .bind(rule.source_id)
        .bind(&rule.summary)
        .bind(&rule.description)
        .bind(rule.id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn delete_rule(&self, id: i64) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM t_rule WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn insert_source(&self, source: &Source) -> Result<i64, StoreError> {
        let (id,): (i64,) = sqlx::query_as(
            "INSERT INTO t_source (name, url, create_time, update_time)
             VALUES ($1, $2, now(), now())
             RETURNING id",
        )
        .bind(&source.name)
        .bind(&source.url)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    pub async fn update_source(&self, source: &Source) -> Result<(), StoreError> {
        sqlx::query("UPDATE t_source SET name = $1, url = $2, update_time = now() WHERE id = $3")
            .bind(&source.name)
            .bind(&source.url)
            .bind(source.id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn delete_source(&self, id: i64) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM t_source WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl Store for PgStore {
    async fn list_rules(&self) -> Result<Vec<Rule>, StoreError> {
        let rules = sqlx::query_as::<_, Rule>(&format!("SELECT {RULE_COLUMNS} FROM t_rule ORDER BY id"))
            .fetch_all(&self.pool)
            .await?;
        Ok(rules)
    }

    async fn list_sources(&self) -> Result<Vec<Source>, StoreError> {
        let sources =
            sqlx::query_as::<_, Source>(&format!("SELECT {SOURCE_COLUMNS} FROM t_source ORDER BY id"))
                .fetch_all(&self.pool)
                .await?;
        Ok(sources)
    }
}
