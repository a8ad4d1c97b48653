use std::sync::Arc;

use cadence_store::Stores;

use crate::definition::TaskDefinitionService;
use crate::job::JobScheduler;
use crate::lock::WorkflowLocks;
use crate::trigger::WorkflowTriggerService;
use crate::validation::WorkflowValidator;
use crate::workflow::WorkflowService;

/// The three services wired over one set of stores.
///
/// The workflow and trigger services share one [`WorkflowLocks`], and the
/// workflow service deletes triggers through the trigger service.
#[derive(Clone)]
pub struct SchedulerServices {
  pub task_definitions: Arc<TaskDefinitionService>,
  pub workflows: Arc<WorkflowService>,
  pub triggers: Arc<WorkflowTriggerService>,
}

impl SchedulerServices {
  pub fn new(stores: Stores, jobs: Arc<dyn JobScheduler>) -> Self {
    let locks = Arc::new(WorkflowLocks::new());

    let task_definitions = Arc::new(TaskDefinitionService::new(stores.task_definitions.clone()));
    let triggers = Arc::new(WorkflowTriggerService::new(
      stores.triggers,
      stores.workflows.clone(),
      jobs,
      locks.clone(),
    ));
    let workflows = Arc::new(WorkflowService::new(
      WorkflowValidator::new(stores.task_definitions),
      stores.workflows,
      triggers.clone(),
      locks,
    ));

    Self {
      task_definitions,
      workflows,
      triggers,
    }
  }
}
