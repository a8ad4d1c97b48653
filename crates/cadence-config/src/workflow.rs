use serde::{Deserialize, Serialize};

use crate::id::WorkflowId;
use crate::property::Properties;

/// A namespaced DAG of tasks, scheduled as a unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
  pub name: String,
  pub namespace: String,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,

  /// Tasks in submission order. Order matters: it breaks ties when
  /// computing the execution order.
  #[serde(default)]
  pub tasks: Vec<WorkflowTask>,

  #[serde(default)]
  pub properties: Properties,
}

impl Workflow {
  pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      namespace: namespace.into(),
      description: None,
      tasks: Vec::new(),
      properties: Properties::new(),
    }
  }

  pub fn id(&self) -> WorkflowId {
    WorkflowId::new(&self.name, &self.namespace)
  }

  pub fn with_task(mut self, task: WorkflowTask) -> Self {
    self.tasks.push(task);
    self
  }

  /// Get a task by name.
  pub fn get_task(&self, name: &str) -> Option<&WorkflowTask> {
    self.tasks.iter().find(|t| t.name == name)
  }
}

/// One node of a workflow graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowTask {
  /// Unique within the owning workflow.
  pub name: String,

  /// Name of the task definition this task runs.
  pub task_definition_name: String,

  /// Names of tasks in the same workflow that must complete first.
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub depends_on: Vec<String>,

  #[serde(default = "default_enabled")]
  pub enabled: bool,

  #[serde(default)]
  pub properties: Properties,
}

fn default_enabled() -> bool {
  true
}

impl WorkflowTask {
  pub fn new(name: impl Into<String>, task_definition_name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      task_definition_name: task_definition_name.into(),
      depends_on: Vec::new(),
      enabled: true,
      properties: Properties::new(),
    }
  }

  pub fn depends_on(mut self, task: impl Into<String>) -> Self {
    self.depends_on.push(task.into());
    self
  }

  pub fn disabled(mut self) -> Self {
    self.enabled = false;
    self
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_workflow_defaults() {
    let json = r#"{
      "name": "etl",
      "namespace": "acme",
      "tasks": [
        {"name": "extract", "task_definition_name": "shell"},
        {"name": "load", "task_definition_name": "shell", "depends_on": ["extract"], "enabled": false}
      ]
    }"#;

    let workflow: Workflow = serde_json::from_str(json).unwrap();
    assert_eq!(workflow.id(), WorkflowId::new("etl", "acme"));
    assert_eq!(workflow.tasks.len(), 2);

    let extract = workflow.get_task("extract").unwrap();
    assert!(extract.enabled);
    assert!(extract.depends_on.is_empty());
    assert!(extract.properties.is_empty());

    let load = workflow.get_task("load").unwrap();
    assert!(!load.enabled);
    assert_eq!(load.depends_on, vec!["extract".to_string()]);
  }

  #[test]
  fn test_workflow_without_tasks() {
    let workflow: Workflow = serde_json::from_str(r#"{"name": "w", "namespace": "ns"}"#).unwrap();
    assert!(workflow.tasks.is_empty());
  }

  #[test]
  fn test_builder() {
    let workflow = Workflow::new("w", "ns")
      .with_task(WorkflowTask::new("a", "def"))
      .with_task(WorkflowTask::new("b", "def").depends_on("a").disabled());

    let b = workflow.get_task("b").unwrap();
    assert_eq!(b.depends_on, vec!["a".to_string()]);
    assert!(!b.enabled);
    assert!(workflow.get_task("c").is_none());
  }
}
