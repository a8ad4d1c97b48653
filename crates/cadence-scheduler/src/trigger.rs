use std::sync::Arc;

use async_trait::async_trait;
use cadence_config::{WorkflowTrigger, WorkflowTriggerId};
use cadence_store::{WorkflowStore, WorkflowTriggerStore};
use tracing::{debug, error, info};

use crate::error::SchedulerError;
use crate::job::{JobScheduler, JobSchedulerError};
use crate::lock::WorkflowLocks;

/// What the workflow service needs from trigger management.
///
/// Implementations must not take the workflow lock; the caller holds it.
#[async_trait]
pub trait TriggerLifecycle: Send + Sync {
  /// Triggers of one workflow, ordered by trigger name.
  async fn list_by_workflow(
    &self,
    workflow: &str,
    namespace: &str,
  ) -> Result<Vec<WorkflowTrigger>, SchedulerError>;

  /// Deregister the trigger's job, then remove its record.
  ///
  /// If deregistration fails the record is kept. Deleting an already
  /// deleted trigger succeeds.
  async fn delete(&self, trigger: &WorkflowTrigger) -> Result<(), SchedulerError>;
}

/// Persists triggers and keeps the job scheduler in step with them.
pub struct WorkflowTriggerService {
  triggers: Arc<dyn WorkflowTriggerStore>,
  workflows: Arc<dyn WorkflowStore>,
  jobs: Arc<dyn JobScheduler>,
  locks: Arc<WorkflowLocks>,
}

impl WorkflowTriggerService {
  pub fn new(
    triggers: Arc<dyn WorkflowTriggerStore>,
    workflows: Arc<dyn WorkflowStore>,
    jobs: Arc<dyn JobScheduler>,
    locks: Arc<WorkflowLocks>,
  ) -> Self {
    Self {
      triggers,
      workflows,
      jobs,
      locks,
    }
  }

  /// Store a trigger and register its job if it is enabled.
  ///
  /// The workflow must exist. If registration fails the record is removed
  /// again and the scheduler error is returned.
  pub async fn add(&self, trigger: &WorkflowTrigger) -> Result<(), SchedulerError> {
    let id = trigger.id();
    debug!(trigger = %id, "received request to add trigger");

    let workflow = id.workflow_id();
    let _guard = self.locks.lock(&workflow).await;

    if self.workflows.load(&workflow).await?.is_none() {
      return Err(SchedulerError::WorkflowNotFound { workflow });
    }

    self.triggers.store(trigger).await?;

    if trigger.enabled
      && let Err(e) = self.jobs.schedule(trigger).await
    {
      error!(trigger = %id, error = %e, "failed to schedule trigger, removing it");
      if let Err(cleanup) = self.triggers.delete(&id).await {
        error!(trigger = %id, error = %cleanup, "failed to remove unscheduled trigger");
      }
      return Err(e.into());
    }

    info!(trigger = %id, enabled = trigger.enabled, "trigger added");
    Ok(())
  }

  pub async fn get(&self, id: &WorkflowTriggerId) -> Result<Option<WorkflowTrigger>, SchedulerError> {
    debug!(trigger = %id, "received request to get trigger");
    Ok(self.triggers.load(id).await?)
  }

  pub async fn get_all(&self, namespace: &str) -> Result<Vec<WorkflowTrigger>, SchedulerError> {
    debug!(namespace, "received request to list triggers");
    Ok(self.triggers.load_all(namespace).await?)
  }

  /// Pause or resume a trigger.
  ///
  /// Pausing deregisters the job and resuming registers it again. Setting
  /// the current state is a no-op. If the record cannot be updated the job
  /// change is reverted, and a resume that finds its job already registered
  /// succeeds, so a failed call can always be retried.
  pub async fn set_enabled(
    &self,
    id: &WorkflowTriggerId,
    enabled: bool,
  ) -> Result<WorkflowTrigger, SchedulerError> {
    debug!(trigger = %id, enabled, "received request to change trigger state");
    let _guard = self.locks.lock(&id.workflow_id()).await;

    let Some(mut trigger) = self.triggers.load(id).await? else {
      return Err(SchedulerError::TriggerNotFound {
        trigger: id.clone(),
      });
    };
    if trigger.enabled == enabled {
      return Ok(trigger);
    }

    trigger.enabled = enabled;
    self.apply_schedule(&trigger).await?;

    if let Err(e) = self.triggers.update(&trigger).await {
      error!(trigger = %id, error = %e, "failed to store trigger state, reverting job");
      trigger.enabled = !enabled;
      if let Err(revert) = self.apply_schedule(&trigger).await {
        error!(trigger = %id, error = %revert, "failed to revert job");
      }
      return Err(e.into());
    }

    info!(trigger = %id, enabled, "trigger state changed");
    Ok(trigger)
  }

  /// Register or deregister the job so it matches `trigger.enabled`.
  async fn apply_schedule(&self, trigger: &WorkflowTrigger) -> Result<(), SchedulerError> {
    if !trigger.enabled {
      self.jobs.unschedule(&trigger.id()).await?;
      return Ok(());
    }
    match self.jobs.schedule(trigger).await {
      Ok(()) | Err(JobSchedulerError::AlreadyScheduled(_)) => Ok(()),
      Err(e) => Err(e.into()),
    }
  }

  /// Delete a trigger by key.
  pub async fn delete(&self, id: &WorkflowTriggerId) -> Result<(), SchedulerError> {
    debug!(trigger = %id, "received request to delete trigger");
    let _guard = self.locks.lock(&id.workflow_id()).await;

    let Some(trigger) = self.triggers.load(id).await? else {
      return Err(SchedulerError::TriggerNotFound {
        trigger: id.clone(),
      });
    };
    self.remove(&trigger).await
  }

  async fn remove(&self, trigger: &WorkflowTrigger) -> Result<(), SchedulerError> {
    let id = trigger.id();
    let was_scheduled = self.jobs.unschedule(&id).await?;
    self.triggers.delete(&id).await?;

    info!(trigger = %id, was_scheduled, "trigger deleted");
    Ok(())
  }
}

#[async_trait]
impl TriggerLifecycle for WorkflowTriggerService {
  async fn list_by_workflow(
    &self,
    workflow: &str,
    namespace: &str,
  ) -> Result<Vec<WorkflowTrigger>, SchedulerError> {
    Ok(self.triggers.load_by_workflow(workflow, namespace).await?)
  }

  async fn delete(&self, trigger: &WorkflowTrigger) -> Result<(), SchedulerError> {
    self.remove(trigger).await
  }
}

#[cfg(test)]
mod tests {
  use std::sync::atomic::{AtomicBool, Ordering};

  use cadence_config::{Schedule, Workflow};
  use cadence_store::{StoreError, Stores};

  use super::*;
  use crate::job::InMemoryJobScheduler;

  /// Trigger store whose writes can be made to fail once.
  struct UnreliableTriggers {
    inner: Arc<dyn WorkflowTriggerStore>,
    fail_update: AtomicBool,
    fail_delete: AtomicBool,
  }

  impl UnreliableTriggers {
    fn new(inner: Arc<dyn WorkflowTriggerStore>) -> Self {
      Self {
        inner,
        fail_update: AtomicBool::new(false),
        fail_delete: AtomicBool::new(false),
      }
    }
  }

  #[async_trait]
  impl WorkflowTriggerStore for UnreliableTriggers {
    async fn store(&self, trigger: &WorkflowTrigger) -> Result<(), StoreError> {
      self.inner.store(trigger).await
    }

    async fn load_all(&self, namespace: &str) -> Result<Vec<WorkflowTrigger>, StoreError> {
      self.inner.load_all(namespace).await
    }

    async fn load_by_workflow(
      &self,
      workflow: &str,
      namespace: &str,
    ) -> Result<Vec<WorkflowTrigger>, StoreError> {
      self.inner.load_by_workflow(workflow, namespace).await
    }

    async fn load(&self, id: &WorkflowTriggerId) -> Result<Option<WorkflowTrigger>, StoreError> {
      self.inner.load(id).await
    }

    async fn update(&self, trigger: &WorkflowTrigger) -> Result<(), StoreError> {
      if self.fail_update.swap(false, Ordering::SeqCst) {
        return Err(StoreError::InvalidConfig("disk full".to_string()));
      }
      self.inner.update(trigger).await
    }

    async fn delete(&self, id: &WorkflowTriggerId) -> Result<(), StoreError> {
      if self.fail_delete.swap(false, Ordering::SeqCst) {
        return Err(StoreError::InvalidConfig("disk full".to_string()));
      }
      self.inner.delete(id).await
    }
  }

  async fn unreliable_fixture() -> (
    WorkflowTriggerService,
    Arc<UnreliableTriggers>,
    Arc<InMemoryJobScheduler>,
  ) {
    let stores = Stores::in_memory();
    stores
      .workflows
      .store(&Workflow::new("etl", "acme"))
      .await
      .unwrap();
    let triggers = Arc::new(UnreliableTriggers::new(stores.triggers.clone()));
    let jobs = Arc::new(InMemoryJobScheduler::new());
    let service = WorkflowTriggerService::new(
      triggers.clone(),
      stores.workflows.clone(),
      jobs.clone(),
      Arc::new(WorkflowLocks::new()),
    );
    (service, triggers, jobs)
  }

  struct Fixture {
    service: WorkflowTriggerService,
    jobs: Arc<InMemoryJobScheduler>,
    stores: Stores,
  }

  async fn fixture() -> Fixture {
    let stores = Stores::in_memory();
    stores
      .workflows
      .store(&Workflow::new("etl", "acme"))
      .await
      .unwrap();
    let jobs = Arc::new(InMemoryJobScheduler::new());
    let service = WorkflowTriggerService::new(
      stores.triggers.clone(),
      stores.workflows.clone(),
      jobs.clone(),
      Arc::new(WorkflowLocks::new()),
    );
    Fixture {
      service,
      jobs,
      stores,
    }
  }

  fn nightly() -> WorkflowTrigger {
    WorkflowTrigger::new(
      "nightly",
      "etl",
      "acme",
      Schedule::Cron {
        expression: "0 0 2 * * ?".to_string(),
        timezone: None,
      },
    )
  }

  #[tokio::test]
  async fn test_add_schedules_enabled_trigger() {
    let f = fixture().await;
    let trigger = nightly();

    f.service.add(&trigger).await.unwrap();

    assert!(f.jobs.is_scheduled(&trigger.id()));
    assert_eq!(f.service.get(&trigger.id()).await.unwrap(), Some(trigger));
  }

  #[tokio::test]
  async fn test_add_disabled_trigger_is_not_scheduled() {
    let f = fixture().await;
    let mut trigger = nightly();
    trigger.enabled = false;

    f.service.add(&trigger).await.unwrap();

    assert!(!f.jobs.is_scheduled(&trigger.id()));
    assert_eq!(f.service.get_all("acme").await.unwrap().len(), 1);
  }

  #[tokio::test]
  async fn test_add_for_missing_workflow() {
    let f = fixture().await;
    let mut trigger = nightly();
    trigger.workflow = "other".to_string();

    let err = f.service.add(&trigger).await.unwrap_err();
    assert!(matches!(err, SchedulerError::WorkflowNotFound { workflow } if workflow.name == "other"));
    assert!(f.stores.triggers.load(&trigger.id()).await.unwrap().is_none());
  }

  #[tokio::test]
  async fn test_schedule_failure_removes_record() {
    let f = fixture().await;
    let trigger = nightly();
    // Occupy the job slot so registration is rejected.
    f.jobs.schedule(&trigger).await.unwrap();

    let err = f.service.add(&trigger).await.unwrap_err();
    assert!(matches!(err, SchedulerError::Schedule(_)));
    assert!(f.service.get(&trigger.id()).await.unwrap().is_none());
  }

  #[tokio::test]
  async fn test_pause_and_resume() {
    let f = fixture().await;
    let trigger = nightly();
    f.service.add(&trigger).await.unwrap();

    let paused = f.service.set_enabled(&trigger.id(), false).await.unwrap();
    assert!(!paused.enabled);
    assert!(!f.jobs.is_scheduled(&trigger.id()));

    let again = f.service.set_enabled(&trigger.id(), false).await.unwrap();
    assert!(!again.enabled);

    let resumed = f.service.set_enabled(&trigger.id(), true).await.unwrap();
    assert!(resumed.enabled);
    assert!(f.jobs.is_scheduled(&trigger.id()));
    let stored = f.service.get(&trigger.id()).await.unwrap().unwrap();
    assert!(stored.enabled);
  }

  #[tokio::test]
  async fn test_delete() {
    let f = fixture().await;
    let trigger = nightly();
    f.service.add(&trigger).await.unwrap();

    f.service.delete(&trigger.id()).await.unwrap();
    assert!(!f.jobs.is_scheduled(&trigger.id()));
    assert!(f.service.get(&trigger.id()).await.unwrap().is_none());

    let err = f.service.delete(&trigger.id()).await.unwrap_err();
    assert!(matches!(err, SchedulerError::TriggerNotFound { .. }));
  }

  #[tokio::test]
  async fn test_lifecycle_delete_is_idempotent() {
    let f = fixture().await;
    let trigger = nightly();
    f.service.add(&trigger).await.unwrap();

    let lifecycle: &dyn TriggerLifecycle = &f.service;
    lifecycle.delete(&trigger).await.unwrap();
    lifecycle.delete(&trigger).await.unwrap();
    assert!(lifecycle.list_by_workflow("etl", "acme").await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn test_failed_resume_reverts_job_and_can_be_retried() {
    let (service, triggers, jobs) = unreliable_fixture().await;
    let mut trigger = nightly();
    trigger.enabled = false;
    service.add(&trigger).await.unwrap();

    triggers.fail_update.store(true, Ordering::SeqCst);
    let err = service.set_enabled(&trigger.id(), true).await.unwrap_err();
    assert!(matches!(err, SchedulerError::Store(_)));
    assert!(!jobs.is_scheduled(&trigger.id()));
    assert!(!service.get(&trigger.id()).await.unwrap().unwrap().enabled);

    let resumed = service.set_enabled(&trigger.id(), true).await.unwrap();
    assert!(resumed.enabled);
    assert!(jobs.is_scheduled(&trigger.id()));
  }

  #[tokio::test]
  async fn test_failed_pause_reverts_job_and_can_be_retried() {
    let (service, triggers, jobs) = unreliable_fixture().await;
    let trigger = nightly();
    service.add(&trigger).await.unwrap();

    triggers.fail_update.store(true, Ordering::SeqCst);
    service.set_enabled(&trigger.id(), false).await.unwrap_err();
    assert!(jobs.is_scheduled(&trigger.id()));
    assert!(service.get(&trigger.id()).await.unwrap().unwrap().enabled);

    service.set_enabled(&trigger.id(), false).await.unwrap();
    assert!(!jobs.is_scheduled(&trigger.id()));
  }

  #[tokio::test]
  async fn test_resume_with_job_already_registered() {
    let (service, _, jobs) = unreliable_fixture().await;
    let mut trigger = nightly();
    trigger.enabled = false;
    service.add(&trigger).await.unwrap();
    jobs.schedule(&trigger).await.unwrap();

    let resumed = service.set_enabled(&trigger.id(), true).await.unwrap();
    assert!(resumed.enabled);
    assert!(jobs.is_scheduled(&trigger.id()));
  }

  #[tokio::test]
  async fn test_schedule_failure_is_reported_when_cleanup_fails() {
    let (service, triggers, jobs) = unreliable_fixture().await;
    let trigger = nightly();
    jobs.schedule(&trigger).await.unwrap();

    triggers.fail_delete.store(true, Ordering::SeqCst);
    let err = service.add(&trigger).await.unwrap_err();
    assert!(matches!(err, SchedulerError::Schedule(JobSchedulerError::AlreadyScheduled(_))));
  }
}
