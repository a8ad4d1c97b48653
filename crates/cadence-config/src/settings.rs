//! Process configuration.
//!
//! ```json
//! {
//!   "store": {
//!     "backend": "sqlite",
//!     "options": { "url": "sqlite:///var/lib/cadence/cadence.db" }
//!   }
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Errors that can occur while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  #[error("failed to read config file {path}: {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to parse config file {path}: {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },
}

/// Top-level scheduler configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SchedulerConfig {
  #[serde(default)]
  pub store: StoreConfig,
}

impl SchedulerConfig {
  /// Read a JSON configuration file.
  pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
      path: path.to_path_buf(),
      source,
    })?;
    serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
      path: path.to_path_buf(),
      source,
    })
  }
}

/// Which store backend to open and how.
///
/// `backend` names a constructor registered with the store registry;
/// `options` is backend specific and passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
  pub backend: String,

  #[serde(default)]
  pub options: serde_json::Value,
}

impl StoreConfig {
  pub fn new(backend: impl Into<String>) -> Self {
    Self {
      backend: backend.into(),
      options: serde_json::Value::Null,
    }
  }

  pub fn with_options(mut self, options: serde_json::Value) -> Self {
    self.options = options;
    self
  }

  /// Read a string option.
  pub fn option_str(&self, key: &str) -> Option<&str> {
    self.options.get(key).and_then(|v| v.as_str())
  }
}

impl Default for StoreConfig {
  fn default() -> Self {
    Self::new("memory")
  }
}

#[cfg(test)]
mod tests {
  use std::io::Write;

  use super::*;

  #[test]
  fn test_default_is_memory() {
    let config: SchedulerConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(config.store.backend, "memory");
    assert!(config.store.options.is_null());
  }

  #[test]
  fn test_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
      file,
      r#"{{"store": {{"backend": "sqlite", "options": {{"url": "sqlite::memory:"}}}}}}"#
    )
    .unwrap();

    let config = SchedulerConfig::load(file.path()).unwrap();
    assert_eq!(config.store.backend, "sqlite");
    assert_eq!(config.store.option_str("url"), Some("sqlite::memory:"));
    assert_eq!(config.store.option_str("missing"), None);
  }

  #[test]
  fn test_load_missing_file() {
    let err = SchedulerConfig::load("/nonexistent/cadence.json").unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
  }

  #[test]
  fn test_load_invalid_json() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "not json").unwrap();
    let err = SchedulerConfig::load(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
  }
}
