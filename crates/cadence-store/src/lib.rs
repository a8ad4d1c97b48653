//! Cadence Store
//!
//! This crate provides the storage traits and implementations for task
//! definitions, workflows and workflow triggers.
//!
//! The traits are deliberately narrow: they persist and load whole entities
//! by key and never enforce cross-entity rules. Referential rules (a trigger
//! must not outlive its workflow, a workflow's tasks must reference existing
//! definitions) are upheld by the services in `cadence-scheduler`.
//!
//! Backends are selected at startup through the [`StoreRegistry`], which maps
//! a backend name from [`StoreConfig`](cadence_config::StoreConfig) to a
//! constructor:
//! - `memory`: [`MemoryStore`], process local
//! - `sqlite`: [`SqliteStore`], persisted through sqlx

mod memory;
mod registry;
mod sqlite;

pub use memory::MemoryStore;
pub use registry::{StoreConstructor, StoreRegistry};
pub use sqlite::SqliteStore;

use std::sync::Arc;

use async_trait::async_trait;
use cadence_config::{
  TaskDefinition, TaskDefinitionId, Workflow, WorkflowId, WorkflowTrigger, WorkflowTriggerId,
};

/// Error type for storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
  /// A record with the same key already exists.
  #[error("already exists: {0}")]
  AlreadyExists(String),

  /// The record to update was not found.
  #[error("not found: {0}")]
  NotFound(String),

  /// A database error occurred.
  #[error("database error: {0}")]
  Database(#[from] sqlx::Error),

  /// Running schema migrations failed.
  #[error("migration error: {0}")]
  Migrate(#[from] sqlx::migrate::MigrateError),

  /// A stored record could not be (de)serialized.
  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),

  /// No constructor is registered for the configured backend.
  #[error("unknown store backend: {0}")]
  UnknownBackend(String),

  /// The backend options are invalid.
  #[error("invalid store configuration: {0}")]
  InvalidConfig(String),
}

/// Storage for task definitions.
#[async_trait]
pub trait TaskDefinitionStore: Send + Sync {
  /// Persist a new definition. Fails with `AlreadyExists` on a duplicate name.
  async fn store(&self, definition: &TaskDefinition) -> Result<(), StoreError>;

  /// Load every definition, ordered by name.
  async fn load_all(&self) -> Result<Vec<TaskDefinition>, StoreError>;

  /// Load a definition by key.
  async fn load(&self, id: &TaskDefinitionId) -> Result<Option<TaskDefinition>, StoreError>;

  /// Overwrite an existing definition. Fails with `NotFound` if absent.
  async fn update(&self, definition: &TaskDefinition) -> Result<(), StoreError>;

  /// Remove a definition. Removing a missing definition is not an error.
  async fn delete(&self, id: &TaskDefinitionId) -> Result<(), StoreError>;
}

/// Storage for workflows.
#[async_trait]
pub trait WorkflowStore: Send + Sync {
  /// Persist a new workflow. Fails with `AlreadyExists` on a duplicate key.
  async fn store(&self, workflow: &Workflow) -> Result<(), StoreError>;

  /// Load every workflow in a namespace, ordered by name.
  async fn load_all(&self, namespace: &str) -> Result<Vec<Workflow>, StoreError>;

  /// Load a workflow by key.
  async fn load(&self, id: &WorkflowId) -> Result<Option<Workflow>, StoreError>;

  /// Overwrite an existing workflow. Fails with `NotFound` if absent.
  async fn update(&self, workflow: &Workflow) -> Result<(), StoreError>;

  /// Remove a workflow. Removing a missing workflow is not an error.
  async fn delete(&self, id: &WorkflowId) -> Result<(), StoreError>;
}

/// Storage for workflow triggers.
#[async_trait]
pub trait WorkflowTriggerStore: Send + Sync {
  /// Persist a new trigger. Fails with `AlreadyExists` on a duplicate key.
  async fn store(&self, trigger: &WorkflowTrigger) -> Result<(), StoreError>;

  /// Load every trigger in a namespace, ordered by workflow then name.
  async fn load_all(&self, namespace: &str) -> Result<Vec<WorkflowTrigger>, StoreError>;

  /// Load the triggers of one workflow, ordered by name.
  async fn load_by_workflow(
    &self,
    workflow: &str,
    namespace: &str,
  ) -> Result<Vec<WorkflowTrigger>, StoreError>;

  /// Load a trigger by key.
  async fn load(&self, id: &WorkflowTriggerId) -> Result<Option<WorkflowTrigger>, StoreError>;

  /// Overwrite an existing trigger. Fails with `NotFound` if absent.
  async fn update(&self, trigger: &WorkflowTrigger) -> Result<(), StoreError>;

  /// Remove a trigger. Removing a missing trigger is not an error.
  async fn delete(&self, id: &WorkflowTriggerId) -> Result<(), StoreError>;
}

/// Handles to the three stores of one backend.
#[derive(Clone)]
pub struct Stores {
  pub task_definitions: Arc<dyn TaskDefinitionStore>,
  pub workflows: Arc<dyn WorkflowStore>,
  pub triggers: Arc<dyn WorkflowTriggerStore>,
}

impl Stores {
  /// Use one backend instance for all three stores.
  pub fn from_shared<S>(store: Arc<S>) -> Self
  where
    S: TaskDefinitionStore + WorkflowStore + WorkflowTriggerStore + 'static,
  {
    Self {
      task_definitions: store.clone(),
      workflows: store.clone(),
      triggers: store,
    }
  }

  /// A fresh in-memory backend.
  pub fn in_memory() -> Self {
    Self::from_shared(Arc::new(MemoryStore::new()))
  }
}
