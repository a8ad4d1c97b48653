use cadence_config::{WorkflowId, WorkflowTriggerId};
use cadence_store::StoreError;

use crate::job::JobSchedulerError;

/// Errors returned by the scheduler services.
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
  /// A task references a task definition that does not exist.
  #[error("missing task definition with name {name}")]
  MissingTaskDefinition { name: String },

  /// A `depends_on` entry does not name an enabled task of the workflow.
  #[error("missing task {name}")]
  MissingDependency { name: String },

  /// Two tasks of one workflow share a name.
  #[error("duplicate task {name}")]
  DuplicateTask { name: String },

  /// The enabled tasks' dependencies form a cycle through `witness`.
  #[error("invalid workflow contains cyclic dependency through task {witness}")]
  CyclicDependency { witness: String },

  /// Removing one of a workflow's triggers failed; the workflow was kept.
  #[error("failed to delete trigger {trigger}: {source}")]
  TriggerDeletionFailed {
    trigger: WorkflowTriggerId,
    #[source]
    source: Box<SchedulerError>,
  },

  #[error("workflow not found: {workflow}")]
  WorkflowNotFound { workflow: WorkflowId },

  #[error("trigger not found: {trigger}")]
  TriggerNotFound { trigger: WorkflowTriggerId },

  /// The job scheduler rejected a (de)registration.
  #[error("job scheduler error: {0}")]
  Schedule(#[from] JobSchedulerError),

  /// The underlying store failed.
  #[error("store error: {0}")]
  Store(#[from] StoreError),
}

impl SchedulerError {
  /// Whether this is a structural problem with a submitted workflow, as
  /// opposed to an infrastructure fault.
  pub fn is_validation(&self) -> bool {
    matches!(
      self,
      SchedulerError::MissingTaskDefinition { .. }
        | SchedulerError::MissingDependency { .. }
        | SchedulerError::DuplicateTask { .. }
        | SchedulerError::CyclicDependency { .. }
    )
  }
}
