use std::fmt::Debug;

use thiserror::Error;

/// The graph contains at least one directed cycle.
///
/// Carries a vertex that lies on a cycle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cycle detected at vertex {0:?}")]
pub struct CycleDetected<T: Debug>(pub T);

impl<T: Debug> CycleDetected<T> {
  /// The vertex found on the cycle.
  pub fn vertex(&self) -> &T {
    &self.0
  }

  pub fn into_vertex(self) -> T {
    self.0
  }
}
