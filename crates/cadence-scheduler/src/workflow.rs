use std::sync::Arc;

use cadence_config::{Workflow, WorkflowId};
use cadence_store::WorkflowStore;
use tracing::{debug, info, instrument, warn};

use crate::error::SchedulerError;
use crate::lock::WorkflowLocks;
use crate::trigger::TriggerLifecycle;
use crate::validation::WorkflowValidator;

/// Workflow lifecycle: validated writes and cascading deletion.
pub struct WorkflowService {
  validator: WorkflowValidator,
  workflows: Arc<dyn WorkflowStore>,
  triggers: Arc<dyn TriggerLifecycle>,
  locks: Arc<WorkflowLocks>,
}

impl WorkflowService {
  pub fn new(
    validator: WorkflowValidator,
    workflows: Arc<dyn WorkflowStore>,
    triggers: Arc<dyn TriggerLifecycle>,
    locks: Arc<WorkflowLocks>,
  ) -> Self {
    Self {
      validator,
      workflows,
      triggers,
      locks,
    }
  }

  /// Validate without persisting. Returns the execution order.
  pub async fn validate(&self, workflow: &Workflow) -> Result<Vec<String>, SchedulerError> {
    self.validator.validate(workflow).await
  }

  pub async fn add(&self, workflow: &Workflow) -> Result<(), SchedulerError> {
    let id = workflow.id();
    debug!(workflow = %id, "received request to add workflow");
    let _guard = self.locks.lock(&id).await;

    self.validator.validate(workflow).await?;
    self.workflows.store(workflow).await?;

    info!(workflow = %id, tasks = workflow.tasks.len(), "workflow added");
    Ok(())
  }

  pub async fn get_all(&self, namespace: &str) -> Result<Vec<Workflow>, SchedulerError> {
    debug!(namespace, "received request to list workflows");
    Ok(self.workflows.load_all(namespace).await?)
  }

  pub async fn get(&self, id: &WorkflowId) -> Result<Option<Workflow>, SchedulerError> {
    debug!(workflow = %id, "received request to get workflow");
    Ok(self.workflows.load(id).await?)
  }

  /// Replace a stored workflow after re-validating it in full.
  pub async fn update(&self, workflow: &Workflow) -> Result<(), SchedulerError> {
    let id = workflow.id();
    debug!(workflow = %id, "received request to update workflow");
    let _guard = self.locks.lock(&id).await;

    self.validator.validate(workflow).await?;
    self.workflows.update(workflow).await?;

    info!(workflow = %id, tasks = workflow.tasks.len(), "workflow updated");
    Ok(())
  }

  /// Delete every trigger of the workflow, then the workflow itself.
  ///
  /// Triggers are removed one at a time in name order. The first failure
  /// aborts the cascade: triggers already removed stay removed and the
  /// workflow is kept, so the call can be retried.
  #[instrument(name = "workflow_delete", skip_all, fields(workflow = %id))]
  pub async fn delete(&self, id: &WorkflowId) -> Result<(), SchedulerError> {
    debug!("received request to delete workflow");
    let _guard = self.locks.lock(id).await;

    let triggers = self
      .triggers
      .list_by_workflow(&id.name, &id.namespace)
      .await?;

    for trigger in &triggers {
      if let Err(e) = self.triggers.delete(trigger).await {
        warn!(trigger = %trigger.id(), error = %e, "trigger deletion failed, keeping workflow");
        return Err(SchedulerError::TriggerDeletionFailed {
          trigger: trigger.id(),
          source: Box::new(e),
        });
      }
    }

    self.workflows.delete(id).await?;
    info!(triggers = triggers.len(), "workflow deleted");
    Ok(())
  }
}
