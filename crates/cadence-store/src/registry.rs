use std::collections::HashMap;
use std::sync::Arc;

use cadence_config::StoreConfig;
use futures::future::BoxFuture;
use tracing::info;

use crate::{MemoryStore, SqliteStore, StoreError, Stores};

/// Builds the stores of one backend from its configuration.
pub type StoreConstructor = fn(&StoreConfig) -> BoxFuture<'_, Result<Stores, StoreError>>;

/// Table of named store backends.
///
/// The default registry knows `memory` and `sqlite`; embedders can register
/// further backends under their own names.
pub struct StoreRegistry {
  constructors: HashMap<String, StoreConstructor>,
}

impl StoreRegistry {
  /// A registry with no backends.
  pub fn empty() -> Self {
    Self {
      constructors: HashMap::new(),
    }
  }

  /// Register (or replace) a backend constructor.
  pub fn register(&mut self, backend: impl Into<String>, constructor: StoreConstructor) -> &mut Self {
    self.constructors.insert(backend.into(), constructor);
    self
  }

  /// Registered backend names, sorted.
  pub fn backends(&self) -> Vec<&str> {
    let mut names: Vec<&str> = self.constructors.keys().map(String::as_str).collect();
    names.sort_unstable();
    names
  }

  /// Open the backend named by `config.backend`.
  pub async fn open(&self, config: &StoreConfig) -> Result<Stores, StoreError> {
    let constructor = self
      .constructors
      .get(&config.backend)
      .ok_or_else(|| StoreError::UnknownBackend(config.backend.clone()))?;

    info!(backend = %config.backend, "opening store");
    constructor(config).await
  }
}

impl Default for StoreRegistry {
  fn default() -> Self {
    let mut registry = Self::empty();
    registry.register("memory", open_memory);
    registry.register("sqlite", open_sqlite);
    registry
  }
}

fn open_memory(_config: &StoreConfig) -> BoxFuture<'_, Result<Stores, StoreError>> {
  Box::pin(async { Ok(Stores::from_shared(Arc::new(MemoryStore::new()))) })
}

fn open_sqlite(config: &StoreConfig) -> BoxFuture<'_, Result<Stores, StoreError>> {
  Box::pin(async move {
    let url = config
      .option_str("url")
      .ok_or_else(|| StoreError::InvalidConfig("sqlite backend requires option 'url'".to_string()))?;
    let store = SqliteStore::connect(url).await?;
    Ok(Stores::from_shared(Arc::new(store)))
  })
}
