use std::collections::HashSet;
use std::sync::Arc;

use cadence_config::{TaskDefinitionId, Workflow, WorkflowTask};
use cadence_graph::TopologicalSort;
use cadence_store::TaskDefinitionStore;
use tracing::{debug, instrument};

use crate::error::SchedulerError;

/// Checks that a workflow is structurally valid before it is persisted.
pub struct WorkflowValidator {
  definitions: Arc<dyn TaskDefinitionStore>,
}

impl WorkflowValidator {
  pub fn new(definitions: Arc<dyn TaskDefinitionStore>) -> Self {
    Self { definitions }
  }

  /// Validate a workflow and return the execution order of its task graph.
  ///
  /// This process:
  /// 1. Resolves every task's definition, enabled or not
  /// 2. Checks dependency names and acyclicity (see [`check_dependencies`])
  #[instrument(name = "workflow_validate", skip_all, fields(workflow = %workflow.id()))]
  pub async fn validate(&self, workflow: &Workflow) -> Result<Vec<String>, SchedulerError> {
    for task in &workflow.tasks {
      let id = TaskDefinitionId::new(&task.task_definition_name);
      if self.definitions.load(&id).await?.is_none() {
        return Err(SchedulerError::MissingTaskDefinition {
          name: task.task_definition_name.clone(),
        });
      }
    }

    let order = check_dependencies(&workflow.tasks)?;
    debug!(tasks = workflow.tasks.len(), order = ?order, "workflow is valid");
    Ok(order)
  }
}

/// Check the dependency graph of a task list and return its execution order.
///
/// Only enabled tasks are registered as graph vertices and only they can be
/// named in `depends_on`; naming a disabled task fails with
/// `MissingDependency`. The `depends_on` lists of disabled tasks are still
/// checked, and a disabled task that depends on enabled tasks enters the
/// graph through those edges.
///
/// The returned order lists enabled tasks only. Ties are broken by task
/// position in the list.
pub fn check_dependencies(tasks: &[WorkflowTask]) -> Result<Vec<String>, SchedulerError> {
  let mut names = HashSet::new();
  let mut anchors = HashSet::new();
  let mut graph = TopologicalSort::new();

  for task in tasks {
    if !names.insert(task.name.as_str()) {
      return Err(SchedulerError::DuplicateTask {
        name: task.name.clone(),
      });
    }
    if task.enabled {
      anchors.insert(task.name.as_str());
      graph.add_vertex(task.name.as_str());
    }
  }

  for task in tasks {
    for dependency in &task.depends_on {
      let Some(&dependee) = anchors.get(dependency.as_str()) else {
        return Err(SchedulerError::MissingDependency {
          name: dependency.clone(),
        });
      };
      graph.add_edge(dependee, task.name.as_str());
    }
  }

  let order = graph
    .topological_order()
    .map_err(|cycle| SchedulerError::CyclicDependency {
      witness: cycle.into_vertex().to_string(),
    })?;

  Ok(
    order
      .iter()
      .filter(|name| anchors.contains(*name))
      .map(|name| name.to_string())
      .collect(),
  )
}
