use serde::{Deserialize, Serialize};

use crate::id::TaskDefinitionId;
use crate::property::Properties;

/// A named, reusable unit of work configuration.
///
/// Workflow tasks reference definitions by name. The scheduler only checks
/// that a referenced definition exists; its contents are handed to the
/// executor untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDefinition {
  pub name: String,

  /// Executor kind, e.g. "shell" or "http".
  #[serde(rename = "type")]
  pub task_type: String,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,

  #[serde(default)]
  pub properties: Properties,
}

impl TaskDefinition {
  pub fn new(name: impl Into<String>, task_type: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      task_type: task_type.into(),
      description: None,
      properties: Properties::new(),
    }
  }

  pub fn id(&self) -> TaskDefinitionId {
    TaskDefinitionId::new(&self.name)
  }
}
