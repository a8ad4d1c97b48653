use std::fmt;

use serde::{Deserialize, Serialize};

/// Key of a task definition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskDefinitionId {
  pub name: String,
}

impl TaskDefinitionId {
  pub fn new(name: impl Into<String>) -> Self {
    Self { name: name.into() }
  }
}

impl fmt::Display for TaskDefinitionId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.name)
  }
}

/// Key of a workflow: unique per namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WorkflowId {
  pub namespace: String,
  pub name: String,
}

impl WorkflowId {
  pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      namespace: namespace.into(),
    }
  }
}

impl fmt::Display for WorkflowId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}/{}", self.namespace, self.name)
  }
}

/// Key of a workflow trigger: unique per workflow.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WorkflowTriggerId {
  pub namespace: String,
  pub workflow: String,
  pub name: String,
}

impl WorkflowTriggerId {
  pub fn new(
    name: impl Into<String>,
    workflow: impl Into<String>,
    namespace: impl Into<String>,
  ) -> Self {
    Self {
      name: name.into(),
      workflow: workflow.into(),
      namespace: namespace.into(),
    }
  }

  /// Key of the workflow this trigger belongs to.
  pub fn workflow_id(&self) -> WorkflowId {
    WorkflowId::new(&self.workflow, &self.namespace)
  }
}

impl fmt::Display for WorkflowTriggerId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}/{}/{}", self.namespace, self.workflow, self.name)
  }
}
