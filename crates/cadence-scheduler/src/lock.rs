use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use cadence_config::WorkflowId;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Per-workflow async mutexes.
///
/// Every operation that changes a workflow or attaches something to it takes
/// the workflow's lock first, so such operations on one `(namespace, name)`
/// run one at a time while unrelated workflows proceed in parallel.
#[derive(Debug, Default)]
pub struct WorkflowLocks {
  slots: Mutex<HashMap<WorkflowId, Arc<AsyncMutex<()>>>>,
}

impl WorkflowLocks {
  pub fn new() -> Self {
    Self::default()
  }

  /// Wait for and take the lock of `id`. Released when the guard drops.
  pub async fn lock(&self, id: &WorkflowId) -> OwnedMutexGuard<()> {
    let slot = {
      let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
      // A slot only referenced by the map has no holder and no waiter.
      slots.retain(|_, slot| Arc::strong_count(slot) > 1);
      slots.entry(id.clone()).or_default().clone()
    };
    slot.lock_owned().await
  }

  /// Number of workflows with a held or awaited lock.
  pub fn active(&self) -> usize {
    self
      .slots
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .values()
      .filter(|slot| Arc::strong_count(slot) > 1)
      .count()
  }
}
