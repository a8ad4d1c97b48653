use std::str::FromStr;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use cadence_config::{
  TaskDefinition, TaskDefinitionId, Workflow, WorkflowId, WorkflowTrigger, WorkflowTriggerId,
};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::types::Json;
use tracing::debug;

use crate::{StoreError, TaskDefinitionStore, WorkflowStore, WorkflowTriggerStore};

/// SQLite-based store implementation.
///
/// Each entity is kept as a JSON body next to the columns that make up its
/// key, so the schema does not change when entity fields do.
pub struct SqliteStore {
  pool: SqlitePool,
}

impl SqliteStore {
  /// Create a new SQLite store with the given connection pool.
  pub fn new(pool: SqlitePool) -> Self {
    Self { pool }
  }

  /// Open (creating if missing) the database at `url` and run migrations.
  ///
  /// In-memory databases are limited to a single connection, since every
  /// connection would otherwise see its own empty database.
  pub async fn connect(url: &str) -> Result<Self, StoreError> {
    let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
    let max_connections = if url.contains(":memory:") { 1 } else { 5 };
    let pool = SqlitePoolOptions::new()
      .max_connections(max_connections)
      .connect_with(options)
      .await?;

    debug!(url, "opened sqlite store");
    let store = Self::new(pool);
    store.migrate().await?;
    Ok(store)
  }

  /// Run database migrations.
  pub async fn migrate(&self) -> Result<(), StoreError> {
    sqlx::migrate!("./migrations").run(&self.pool).await?;
    Ok(())
  }
}

/// Map a unique-key violation to `AlreadyExists`.
fn insert_error(err: sqlx::Error, key: impl ToString) -> StoreError {
  if let sqlx::Error::Database(db) = &err
    && db.is_unique_violation()
  {
    return StoreError::AlreadyExists(key.to_string());
  }
  StoreError::Database(err)
}

/// Parse a stored JSON body. A corrupt row surfaces as `Serialization`.
fn decode<T: DeserializeOwned>(body: &str) -> Result<T, StoreError> {
  Ok(serde_json::from_str(body)?)
}

fn ensure_updated(rows_affected: u64, key: impl ToString) -> Result<(), StoreError> {
  if rows_affected == 0 {
    return Err(StoreError::NotFound(key.to_string()));
  }
  Ok(())
}

#[async_trait]
impl TaskDefinitionStore for SqliteStore {
  async fn store(&self, definition: &TaskDefinition) -> Result<(), StoreError> {
    sqlx::query("INSERT INTO task_definitions (name, body) VALUES (?, ?)")
      .bind(&definition.name)
      .bind(Json(definition))
      .execute(&self.pool)
      .await
      .map_err(|e| insert_error(e, definition.id()))?;

    Ok(())
  }

  async fn load_all(&self) -> Result<Vec<TaskDefinition>, StoreError> {
    let rows: Vec<(String,)> =
      sqlx::query_as("SELECT body FROM task_definitions ORDER BY name ASC")
        .fetch_all(&self.pool)
        .await?;

    rows.iter().map(|(body,)| decode(body)).collect()
  }

  async fn load(&self, id: &TaskDefinitionId) -> Result<Option<TaskDefinition>, StoreError> {
    let row: Option<(String,)> =
      sqlx::query_as("SELECT body FROM task_definitions WHERE name = ?")
        .bind(&id.name)
        .fetch_optional(&self.pool)
        .await?;

    row.map(|(body,)| decode(&body)).transpose()
  }

  async fn update(&self, definition: &TaskDefinition) -> Result<(), StoreError> {
    let result = sqlx::query("UPDATE task_definitions SET body = ? WHERE name = ?")
      .bind(Json(definition))
      .bind(&definition.name)
      .execute(&self.pool)
      .await?;

    ensure_updated(result.rows_affected(), definition.id())
  }

  async fn delete(&self, id: &TaskDefinitionId) -> Result<(), StoreError> {
    sqlx::query("DELETE FROM task_definitions WHERE name = ?")
      .bind(&id.name)
      .execute(&self.pool)
      .await?;

    Ok(())
  }
}

#[async_trait]
impl WorkflowStore for SqliteStore {
  async fn store(&self, workflow: &Workflow) -> Result<(), StoreError> {
    sqlx::query("INSERT INTO workflows (namespace, name, body) VALUES (?, ?, ?)")
      .bind(&workflow.namespace)
      .bind(&workflow.name)
      .bind(Json(workflow))
      .execute(&self.pool)
      .await
      .map_err(|e| insert_error(e, workflow.id()))?;

    Ok(())
  }

  async fn load_all(&self, namespace: &str) -> Result<Vec<Workflow>, StoreError> {
    let rows: Vec<(String,)> =
      sqlx::query_as("SELECT body FROM workflows WHERE namespace = ? ORDER BY name ASC")
        .bind(namespace)
        .fetch_all(&self.pool)
        .await?;

    rows.iter().map(|(body,)| decode(body)).collect()
  }

  async fn load(&self, id: &WorkflowId) -> Result<Option<Workflow>, StoreError> {
    let row: Option<(String,)> =
      sqlx::query_as("SELECT body FROM workflows WHERE namespace = ? AND name = ?")
        .bind(&id.namespace)
        .bind(&id.name)
        .fetch_optional(&self.pool)
        .await?;

    row.map(|(body,)| decode(&body)).transpose()
  }

  async fn update(&self, workflow: &Workflow) -> Result<(), StoreError> {
    let result = sqlx::query("UPDATE workflows SET body = ? WHERE namespace = ? AND name = ?")
      .bind(Json(workflow))
      .bind(&workflow.namespace)
      .bind(&workflow.name)
      .execute(&self.pool)
      .await?;

    ensure_updated(result.rows_affected(), workflow.id())
  }

  async fn delete(&self, id: &WorkflowId) -> Result<(), StoreError> {
    sqlx::query("DELETE FROM workflows WHERE namespace = ? AND name = ?")
      .bind(&id.namespace)
      .bind(&id.name)
      .execute(&self.pool)
      .await?;

    Ok(())
  }
}

#[async_trait]
impl WorkflowTriggerStore for SqliteStore {
  async fn store(&self, trigger: &WorkflowTrigger) -> Result<(), StoreError> {
    sqlx::query(
      r#"
            INSERT INTO workflow_triggers (namespace, workflow, name, body)
            VALUES (?, ?, ?, ?)
            "#,
    )
    .bind(&trigger.namespace)
    .bind(&trigger.workflow)
    .bind(&trigger.name)
    .bind(Json(trigger))
    .execute(&self.pool)
    .await
    .map_err(|e| insert_error(e, trigger.id()))?;

    Ok(())
  }

  async fn load_all(&self, namespace: &str) -> Result<Vec<WorkflowTrigger>, StoreError> {
    let rows: Vec<(String,)> = sqlx::query_as(
      r#"
            SELECT body FROM workflow_triggers
            WHERE namespace = ?
            ORDER BY workflow ASC, name ASC
            "#,
    )
    .bind(namespace)
    .fetch_all(&self.pool)
    .await?;

    rows.iter().map(|(body,)| decode(body)).collect()
  }

  async fn load_by_workflow(
    &self,
    workflow: &str,
    namespace: &str,
  ) -> Result<Vec<WorkflowTrigger>, StoreError> {
    let rows: Vec<(String,)> = sqlx::query_as(
      r#"
            SELECT body FROM workflow_triggers
            WHERE namespace = ? AND workflow = ?
            ORDER BY name ASC
            "#,
    )
    .bind(namespace)
    .bind(workflow)
    .fetch_all(&self.pool)
    .await?;

    rows.iter().map(|(body,)| decode(body)).collect()
  }

  async fn load(&self, id: &WorkflowTriggerId) -> Result<Option<WorkflowTrigger>, StoreError> {
    let row: Option<(String,)> = sqlx::query_as(
      r#"
            SELECT body FROM workflow_triggers
            WHERE namespace = ? AND workflow = ? AND name = ?
            "#,
    )
    .bind(&id.namespace)
    .bind(&id.workflow)
    .bind(&id.name)
    .fetch_optional(&self.pool)
    .await?;

    row.map(|(body,)| decode(&body)).transpose()
  }

  async fn update(&self, trigger: &WorkflowTrigger) -> Result<(), StoreError> {
    let result = sqlx::query(
      r#"
            UPDATE workflow_triggers SET body = ?
            WHERE namespace = ? AND workflow = ? AND name = ?
            "#,
    )
    .bind(Json(trigger))
    .bind(&trigger.namespace)
    .bind(&trigger.workflow)
    .bind(&trigger.name)
    .execute(&self.pool)
    .await?;

    ensure_updated(result.rows_affected(), trigger.id())
  }

  async fn delete(&self, id: &WorkflowTriggerId) -> Result<(), StoreError> {
    sqlx::query("DELETE FROM workflow_triggers WHERE namespace = ? AND workflow = ? AND name = ?")
      .bind(&id.namespace)
      .bind(&id.workflow)
      .bind(&id.name)
      .execute(&self.pool)
      .await?;

    Ok(())
  }
}
