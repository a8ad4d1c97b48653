use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::fmt::Debug;
use std::hash::Hash;

use crate::error::CycleDetected;

/// Directed graph of "runs before" relations with Kahn-style ordering.
///
/// Vertices are identified by value and remembered in insertion order.
/// Internally every vertex is interned to its insertion index, and both
/// adjacency directions are kept as index lists.
#[derive(Debug, Clone)]
pub struct TopologicalSort<T> {
  /// Vertices in insertion order.
  vertices: Vec<T>,
  /// Vertex -> insertion index.
  index: HashMap<T, usize>,
  /// Insertion index -> downstream indices.
  successors: Vec<Vec<usize>>,
  /// Insertion index -> upstream indices.
  predecessors: Vec<Vec<usize>>,
}

impl<T> Default for TopologicalSort<T> {
  fn default() -> Self {
    Self {
      vertices: Vec::new(),
      index: HashMap::new(),
      successors: Vec::new(),
      predecessors: Vec::new(),
    }
  }
}

impl<T: Eq + Hash + Clone> TopologicalSort<T> {
  pub fn new() -> Self {
    Self::default()
  }

  /// Register a vertex. Adding a vertex twice is a no-op.
  pub fn add_vertex(&mut self, vertex: T) {
    self.intern(vertex);
  }

  /// Record that `from` must precede `to`, registering either vertex if needed.
  ///
  /// A self-edge (`from == to`) is accepted and forms a cycle of length one.
  pub fn add_edge(&mut self, from: T, to: T) {
    let from = self.intern(from);
    let to = self.intern(to);
    self.successors[from].push(to);
    self.predecessors[to].push(from);
  }

  /// Number of registered vertices.
  pub fn len(&self) -> usize {
    self.vertices.len()
  }

  pub fn is_empty(&self) -> bool {
    self.vertices.is_empty()
  }

  pub fn contains(&self, vertex: &T) -> bool {
    self.index.contains_key(vertex)
  }

  /// Whether the graph as a whole has no directed cycle.
  pub fn is_acyclic(&self) -> bool {
    self.find_cycle().is_none()
  }

  /// A topological order of all vertices.
  ///
  /// The returned value is lazy: vertices are produced as the ordering is
  /// walked, and it can be iterated any number of times. Fails iff
  /// [`is_acyclic`](Self::is_acyclic) is false.
  pub fn topological_order(&self) -> Result<TopologicalOrder<'_, T>, CycleDetected<T>>
  where
    T: Debug,
  {
    match self.find_cycle() {
      Some(witness) => Err(CycleDetected(self.vertices[witness].clone())),
      None => Ok(TopologicalOrder { graph: self }),
    }
  }

  fn intern(&mut self, vertex: T) -> usize {
    if let Some(&idx) = self.index.get(&vertex) {
      return idx;
    }
    let idx = self.vertices.len();
    self.index.insert(vertex.clone(), idx);
    self.vertices.push(vertex);
    self.successors.push(Vec::new());
    self.predecessors.push(Vec::new());
    idx
  }

  /// Drain a full Kahn pass and, if vertices are left over, return the
  /// index of one that sits on a cycle.
  fn find_cycle(&self) -> Option<usize> {
    let mut walk = Iter::new(self);
    let mut emitted = 0;
    while walk.next().is_some() {
      emitted += 1;
    }
    if emitted == self.vertices.len() {
      return None;
    }

    // Every leftover vertex still has an unemitted predecessor, so walking
    // upstream through leftovers must eventually revisit a vertex.
    let remaining = &walk.in_degree;
    let mut current = remaining.iter().position(|&d| d > 0)?;
    let mut seen = vec![false; self.vertices.len()];
    loop {
      if seen[current] {
        return Some(current);
      }
      seen[current] = true;
      current = *self.predecessors[current]
        .iter()
        .find(|&&p| remaining[p] > 0)?;
    }
  }
}

/// A validated, restartable topological ordering of a [`TopologicalSort`].
pub struct TopologicalOrder<'a, T> {
  graph: &'a TopologicalSort<T>,
}

impl<T> Clone for TopologicalOrder<'_, T> {
  fn clone(&self) -> Self {
    *self
  }
}

impl<T> Copy for TopologicalOrder<'_, T> {}

impl<'a, T: Eq + Hash + Clone> TopologicalOrder<'a, T> {
  /// Start a fresh walk over the ordering.
  pub fn iter(&self) -> Iter<'a, T> {
    Iter::new(self.graph)
  }

  /// Number of vertices the ordering yields.
  pub fn len(&self) -> usize {
    self.graph.len()
  }

  pub fn is_empty(&self) -> bool {
    self.graph.is_empty()
  }

  /// Collect the ordering into owned vertices.
  pub fn to_vec(&self) -> Vec<T> {
    self.iter().cloned().collect()
  }
}

impl<'a, T: Eq + Hash + Clone> IntoIterator for TopologicalOrder<'a, T> {
  type Item = &'a T;
  type IntoIter = Iter<'a, T>;

  fn into_iter(self) -> Self::IntoIter {
    self.iter()
  }
}

impl<'a, T: Eq + Hash + Clone> IntoIterator for &TopologicalOrder<'a, T> {
  type Item = &'a T;
  type IntoIter = Iter<'a, T>;

  fn into_iter(self) -> Self::IntoIter {
    self.iter()
  }
}

/// Lazy Kahn walk over a graph.
///
/// Ready vertices are released lowest insertion index first.
#[derive(Debug, Clone)]
pub struct Iter<'a, T> {
  graph: &'a TopologicalSort<T>,
  in_degree: Vec<usize>,
  ready: BinaryHeap<Reverse<usize>>,
}

impl<'a, T> Iter<'a, T> {
  fn new(graph: &'a TopologicalSort<T>) -> Self {
    let in_degree: Vec<usize> = graph.predecessors.iter().map(Vec::len).collect();
    let ready = in_degree
      .iter()
      .enumerate()
      .filter(|(_, d)| **d == 0)
      .map(|(idx, _)| Reverse(idx))
      .collect();
    Self {
      graph,
      in_degree,
      ready,
    }
  }
}

impl<'a, T> Iterator for Iter<'a, T> {
  type Item = &'a T;

  fn next(&mut self) -> Option<Self::Item> {
    let Reverse(idx) = self.ready.pop()?;
    for &succ in &self.graph.successors[idx] {
      self.in_degree[succ] -= 1;
      if self.in_degree[succ] == 0 {
        self.ready.push(Reverse(succ));
      }
    }
    Some(&self.graph.vertices[idx])
  }

  fn size_hint(&self) -> (usize, Option<usize>) {
    (self.ready.len(), Some(self.graph.vertices.len()))
  }
}
