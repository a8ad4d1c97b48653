use serde::{Deserialize, Serialize};

use crate::id::{WorkflowId, WorkflowTriggerId};
use crate::property::Properties;

/// When a trigger fires.
///
/// Cadence does not interpret schedules itself; they are handed to the job
/// scheduler that owns wall-clock time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Schedule {
  /// Fire every `interval_ms`, optionally a bounded number of times.
  Simple {
    interval_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    repeat_count: Option<u32>,
  },
  /// Fire on a cron expression.
  Cron {
    expression: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    timezone: Option<String>,
  },
}

/// A named schedule binding for one workflow.
///
/// The trigger only references its workflow by name and namespace; it never
/// owns it, but it must never outlive it either.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowTrigger {
  pub name: String,
  pub workflow: String,
  pub namespace: String,
  pub schedule: Schedule,

  /// Disabled triggers are persisted but not registered with the scheduler.
  #[serde(default = "default_enabled")]
  pub enabled: bool,

  #[serde(default)]
  pub properties: Properties,
}

fn default_enabled() -> bool {
  true
}

impl WorkflowTrigger {
  pub fn new(
    name: impl Into<String>,
    workflow: impl Into<String>,
    namespace: impl Into<String>,
    schedule: Schedule,
  ) -> Self {
    Self {
      name: name.into(),
      workflow: workflow.into(),
      namespace: namespace.into(),
      schedule,
      enabled: true,
      properties: Properties::new(),
    }
  }

  pub fn id(&self) -> WorkflowTriggerId {
    WorkflowTriggerId::new(&self.name, &self.workflow, &self.namespace)
  }

  pub fn workflow_id(&self) -> WorkflowId {
    WorkflowId::new(&self.workflow, &self.namespace)
  }
}
