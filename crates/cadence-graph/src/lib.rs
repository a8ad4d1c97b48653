//! Cadence Graph
//!
//! A small, domain-free dependency graph. Vertices are registered in
//! insertion order and edges record "must run before" relations. The graph
//! answers two questions:
//!
//! - is it acyclic (taken as a whole, including disconnected components)?
//! - what is a deterministic topological order of its vertices?
//!
//! Ties between vertices that are ready at the same time are always broken by
//! insertion order, so the same sequence of `add_vertex`/`add_edge` calls
//! produces the same ordering on every run.

mod error;
mod graph;

pub use error::CycleDetected;
pub use graph::{Iter, TopologicalOrder, TopologicalSort};
