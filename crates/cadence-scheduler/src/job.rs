use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use cadence_config::{Schedule, WorkflowTrigger, WorkflowTriggerId};

/// Error type for job scheduler operations.
#[derive(Debug, thiserror::Error)]
pub enum JobSchedulerError {
  #[error("job already scheduled: {0}")]
  AlreadyScheduled(WorkflowTriggerId),

  #[error("job scheduler unavailable: {0}")]
  Unavailable(String),
}

/// The engine that fires triggers at wall-clock time.
///
/// Cadence only registers and deregisters jobs; firing them and running the
/// workflow is the engine's business.
#[async_trait]
pub trait JobScheduler: Send + Sync {
  /// Register a job for an enabled trigger.
  async fn schedule(&self, trigger: &WorkflowTrigger) -> Result<(), JobSchedulerError>;

  /// Deregister the job of a trigger.
  ///
  /// Returns whether a job was registered. Deregistering an unknown job is
  /// not an error, so retries after a partial failure are safe.
  async fn unschedule(&self, id: &WorkflowTriggerId) -> Result<bool, JobSchedulerError>;
}

/// Job scheduler that only records what is registered.
///
/// Used when no wall-clock engine is attached, and in tests.
#[derive(Debug, Default)]
pub struct InMemoryJobScheduler {
  jobs: Mutex<BTreeMap<WorkflowTriggerId, Schedule>>,
}

impl InMemoryJobScheduler {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_scheduled(&self, id: &WorkflowTriggerId) -> bool {
    self
      .jobs
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .contains_key(id)
  }

  /// Registered jobs, ordered by trigger key.
  pub fn scheduled(&self) -> Vec<WorkflowTriggerId> {
    self
      .jobs
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .keys()
      .cloned()
      .collect()
  }
}

#[async_trait]
impl JobScheduler for InMemoryJobScheduler {
  async fn schedule(&self, trigger: &WorkflowTrigger) -> Result<(), JobSchedulerError> {
    let mut jobs = self.jobs.lock().unwrap_or_else(PoisonError::into_inner);
    let id = trigger.id();
    if jobs.contains_key(&id) {
      return Err(JobSchedulerError::AlreadyScheduled(id));
    }
    jobs.insert(id, trigger.schedule.clone());
    Ok(())
  }

  async fn unschedule(&self, id: &WorkflowTriggerId) -> Result<bool, JobSchedulerError> {
    let mut jobs = self.jobs.lock().unwrap_or_else(PoisonError::into_inner);
    Ok(jobs.remove(id).is_some())
  }
}
