//! Integration tests for the SQLite store backend.

use cadence_config::{
  Schedule, StoreConfig, TaskDefinition, TaskDefinitionId, Workflow, WorkflowId, WorkflowTask,
  WorkflowTrigger, WorkflowTriggerId,
};
use cadence_store::{SqliteStore, StoreError, StoreRegistry, Stores};
use std::sync::Arc;

async fn memory_stores() -> Stores {
  let store = SqliteStore::connect("sqlite::memory:")
    .await
    .expect("failed to open sqlite store");
  Stores::from_shared(Arc::new(store))
}

fn cron(expression: &str) -> Schedule {
  Schedule::Cron {
    expression: expression.to_string(),
    timezone: None,
  }
}

#[tokio::test]
async fn test_workflow_round_trip_keeps_task_order() {
  let stores = memory_stores().await;
  let workflow = Workflow::new("etl", "acme")
    .with_task(WorkflowTask::new("extract", "shell"))
    .with_task(WorkflowTask::new("transform", "shell").depends_on("extract"))
    .with_task(WorkflowTask::new("load", "shell").depends_on("transform").disabled());

  stores.workflows.store(&workflow).await.unwrap();

  let loaded = stores
    .workflows
    .load(&WorkflowId::new("etl", "acme"))
    .await
    .unwrap()
    .expect("workflow should exist");
  assert_eq!(loaded, workflow);
}

#[tokio::test]
async fn test_duplicate_keys_conflict() {
  let stores = memory_stores().await;

  let workflow = Workflow::new("etl", "acme");
  stores.workflows.store(&workflow).await.unwrap();
  let err = stores.workflows.store(&workflow).await.unwrap_err();
  assert!(matches!(err, StoreError::AlreadyExists(key) if key == "acme/etl"));

  let definition = TaskDefinition::new("shell", "shell");
  stores.task_definitions.store(&definition).await.unwrap();
  let err = stores.task_definitions.store(&definition).await.unwrap_err();
  assert!(matches!(err, StoreError::AlreadyExists(_)));

  let trigger = WorkflowTrigger::new("nightly", "etl", "acme", cron("0 0 2 * * ?"));
  stores.triggers.store(&trigger).await.unwrap();
  let err = stores.triggers.store(&trigger).await.unwrap_err();
  assert!(matches!(err, StoreError::AlreadyExists(key) if key == "acme/etl/nightly"));
}

#[tokio::test]
async fn test_update_and_delete() {
  let stores = memory_stores().await;

  let err = stores
    .workflows
    .update(&Workflow::new("etl", "acme"))
    .await
    .unwrap_err();
  assert!(matches!(err, StoreError::NotFound(_)));

  let mut definition = TaskDefinition::new("shell", "shell");
  stores.task_definitions.store(&definition).await.unwrap();
  definition.description = Some("runs a command".to_string());
  stores.task_definitions.update(&definition).await.unwrap();

  let id = TaskDefinitionId::new("shell");
  let loaded = stores.task_definitions.load(&id).await.unwrap().unwrap();
  assert_eq!(loaded.description.as_deref(), Some("runs a command"));

  stores.task_definitions.delete(&id).await.unwrap();
  assert!(stores.task_definitions.load(&id).await.unwrap().is_none());
  // Deleting again is not an error.
  stores.task_definitions.delete(&id).await.unwrap();
}

#[tokio::test]
async fn test_trigger_queries() {
  let stores = memory_stores().await;
  for (name, workflow) in [("b", "etl"), ("a", "etl"), ("c", "report")] {
    let trigger = WorkflowTrigger::new(name, workflow, "acme", cron("0 * * * * ?"));
    stores.triggers.store(&trigger).await.unwrap();
  }
  let other = WorkflowTrigger::new("a", "etl", "globex", cron("0 * * * * ?"));
  stores.triggers.store(&other).await.unwrap();

  let names: Vec<String> = stores
    .triggers
    .load_by_workflow("etl", "acme")
    .await
    .unwrap()
    .into_iter()
    .map(|t| t.name)
    .collect();
  assert_eq!(names, vec!["a", "b"]);
  assert_eq!(stores.triggers.load_all("acme").await.unwrap().len(), 3);

  let mut trigger = stores
    .triggers
    .load(&WorkflowTriggerId::new("a", "etl", "acme"))
    .await
    .unwrap()
    .unwrap();
  trigger.enabled = false;
  stores.triggers.update(&trigger).await.unwrap();
  let reloaded = stores.triggers.load(&trigger.id()).await.unwrap().unwrap();
  assert!(!reloaded.enabled);

  stores.triggers.delete(&trigger.id()).await.unwrap();
  assert_eq!(
    stores
      .triggers
      .load_by_workflow("etl", "acme")
      .await
      .unwrap()
      .len(),
    1
  );
}

#[tokio::test]
async fn test_file_database_persists_across_reopen() {
  let dir = tempfile::tempdir().unwrap();
  let url = format!("sqlite://{}", dir.path().join("cadence.db").display());
  let config = StoreConfig::new("sqlite").with_options(serde_json::json!({ "url": url }));
  let registry = StoreRegistry::default();

  {
    let stores = registry.open(&config).await.unwrap();
    stores.workflows.store(&Workflow::new("etl", "acme")).await.unwrap();
  }

  let stores = registry.open(&config).await.unwrap();
  let workflows = stores.workflows.load_all("acme").await.unwrap();
  assert_eq!(workflows.len(), 1);
  assert_eq!(workflows[0].name, "etl");
}

#[tokio::test]
async fn test_corrupt_body_is_a_serialization_error() {
  let pool = sqlx::sqlite::SqlitePoolOptions::new()
    .max_connections(1)
    .connect("sqlite::memory:")
    .await
    .unwrap();
  let store = SqliteStore::new(pool.clone());
  store.migrate().await.unwrap();

  sqlx::query("INSERT INTO workflows (namespace, name, body) VALUES ('acme', 'etl', '{\"name\":')")
    .execute(&pool)
    .await
    .unwrap();

  let stores = Stores::from_shared(Arc::new(store));
  let err = stores
    .workflows
    .load(&WorkflowId::new("etl", "acme"))
    .await
    .unwrap_err();
  assert!(matches!(err, StoreError::Serialization(_)));

  let err = stores.workflows.load_all("acme").await.unwrap_err();
  assert!(matches!(err, StoreError::Serialization(_)));
}
