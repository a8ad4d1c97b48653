use std::sync::Arc;

use cadence_config::{TaskDefinition, TaskDefinitionId};
use cadence_store::TaskDefinitionStore;
use tracing::debug;

use crate::error::SchedulerError;

/// Task definition CRUD. Definitions are global, not namespaced.
pub struct TaskDefinitionService {
  definitions: Arc<dyn TaskDefinitionStore>,
}

impl TaskDefinitionService {
  pub fn new(definitions: Arc<dyn TaskDefinitionStore>) -> Self {
    Self { definitions }
  }

  pub async fn add(&self, definition: &TaskDefinition) -> Result<(), SchedulerError> {
    self.definitions.store(definition).await?;
    debug!(definition = %definition.id(), task_type = %definition.task_type, "task definition added");
    Ok(())
  }

  pub async fn get_all(&self) -> Result<Vec<TaskDefinition>, SchedulerError> {
    Ok(self.definitions.load_all().await?)
  }

  pub async fn get(&self, id: &TaskDefinitionId) -> Result<Option<TaskDefinition>, SchedulerError> {
    Ok(self.definitions.load(id).await?)
  }

  pub async fn update(&self, definition: &TaskDefinition) -> Result<(), SchedulerError> {
    self.definitions.update(definition).await?;
    debug!(definition = %definition.id(), "task definition updated");
    Ok(())
  }

  /// Workflows referencing the definition are left as they are; they fail
  /// validation on their next update.
  pub async fn delete(&self, id: &TaskDefinitionId) -> Result<(), SchedulerError> {
    self.definitions.delete(id).await?;
    debug!(definition = %id, "task definition deleted");
    Ok(())
  }
}
