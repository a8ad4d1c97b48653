use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use async_trait::async_trait;
use cadence_config::{
  TaskDefinition, TaskDefinitionId, Workflow, WorkflowId, WorkflowTrigger, WorkflowTriggerId,
};
use tokio::sync::RwLock;

use crate::{StoreError, TaskDefinitionStore, WorkflowStore, WorkflowTriggerStore};

/// In-memory store implementation.
///
/// Suitable for tests and single-process use. Records are kept in ordered
/// maps so listings come back sorted by key.
#[derive(Debug, Default)]
pub struct MemoryStore {
  definitions: RwLock<BTreeMap<TaskDefinitionId, TaskDefinition>>,
  workflows: RwLock<BTreeMap<WorkflowId, Workflow>>,
  triggers: RwLock<BTreeMap<WorkflowTriggerId, WorkflowTrigger>>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }
}

fn insert_new<K: Ord + ToString, V>(
  map: &mut BTreeMap<K, V>,
  key: K,
  value: V,
) -> Result<(), StoreError> {
  match map.entry(key) {
    Entry::Occupied(entry) => Err(StoreError::AlreadyExists(entry.key().to_string())),
    Entry::Vacant(entry) => {
      entry.insert(value);
      Ok(())
    }
  }
}

fn replace_existing<K: Ord + ToString, V>(
  map: &mut BTreeMap<K, V>,
  key: K,
  value: V,
) -> Result<(), StoreError> {
  match map.get_mut(&key) {
    Some(slot) => {
      *slot = value;
      Ok(())
    }
    None => Err(StoreError::NotFound(key.to_string())),
  }
}

#[async_trait]
impl TaskDefinitionStore for MemoryStore {
  async fn store(&self, definition: &TaskDefinition) -> Result<(), StoreError> {
    let mut definitions = self.definitions.write().await;
    insert_new(&mut definitions, definition.id(), definition.clone())
  }

  async fn load_all(&self) -> Result<Vec<TaskDefinition>, StoreError> {
    Ok(self.definitions.read().await.values().cloned().collect())
  }

  async fn load(&self, id: &TaskDefinitionId) -> Result<Option<TaskDefinition>, StoreError> {
    Ok(self.definitions.read().await.get(id).cloned())
  }

  async fn update(&self, definition: &TaskDefinition) -> Result<(), StoreError> {
    let mut definitions = self.definitions.write().await;
    replace_existing(&mut definitions, definition.id(), definition.clone())
  }

  async fn delete(&self, id: &TaskDefinitionId) -> Result<(), StoreError> {
    self.definitions.write().await.remove(id);
    Ok(())
  }
}

#[async_trait]
impl WorkflowStore for MemoryStore {
  async fn store(&self, workflow: &Workflow) -> Result<(), StoreError> {
    let mut workflows = self.workflows.write().await;
    insert_new(&mut workflows, workflow.id(), workflow.clone())
  }

  async fn load_all(&self, namespace: &str) -> Result<Vec<Workflow>, StoreError> {
    Ok(
      self
        .workflows
        .read()
        .await
        .values()
        .filter(|w| w.namespace == namespace)
        .cloned()
        .collect(),
    )
  }

  async fn load(&self, id: &WorkflowId) -> Result<Option<Workflow>, StoreError> {
    Ok(self.workflows.read().await.get(id).cloned())
  }

  async fn update(&self, workflow: &Workflow) -> Result<(), StoreError> {
    let mut workflows = self.workflows.write().await;
    replace_existing(&mut workflows, workflow.id(), workflow.clone())
  }

  async fn delete(&self, id: &WorkflowId) -> Result<(), StoreError> {
    self.workflows.write().await.remove(id);
    Ok(())
  }
}

#[async_trait]
impl WorkflowTriggerStore for MemoryStore {
  async fn store(&self, trigger: &WorkflowTrigger) -> Result<(), StoreError> {
    let mut triggers = self.triggers.write().await;
    insert_new(&mut triggers, trigger.id(), trigger.clone())
  }

  async fn load_all(&self, namespace: &str) -> Result<Vec<WorkflowTrigger>, StoreError> {
    Ok(
      self
        .triggers
        .read()
        .await
        .values()
        .filter(|t| t.namespace == namespace)
        .cloned()
        .collect(),
    )
  }

  async fn load_by_workflow(
    &self,
    workflow: &str,
    namespace: &str,
  ) -> Result<Vec<WorkflowTrigger>, StoreError> {
    Ok(
      self
        .triggers
        .read()
        .await
        .values()
        .filter(|t| t.namespace == namespace && t.workflow == workflow)
        .cloned()
        .collect(),
    )
  }

  async fn load(&self, id: &WorkflowTriggerId) -> Result<Option<WorkflowTrigger>, StoreError> {
    Ok(self.triggers.read().await.get(id).cloned())
  }

  async fn update(&self, trigger: &WorkflowTrigger) -> Result<(), StoreError> {
    let mut triggers = self.triggers.write().await;
    replace_existing(&mut triggers, trigger.id(), trigger.clone())
  }

  async fn delete(&self, id: &WorkflowTriggerId) -> Result<(), StoreError> {
    self.triggers.write().await.remove(id);
    Ok(())
  }
}
