use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Free-form key/value bag carried by definitions, workflows, tasks and triggers.
///
/// The scheduler core never interprets these; they are passed through to
/// whatever executes the work.
pub type Properties = BTreeMap<String, PropertyValue>;

/// A single property value.
///
/// Serialized untagged, so `{"retries": 3, "queue": "fast"}` round-trips as
/// plain JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
  Null,
  Bool(bool),
  Integer(i64),
  /// Integers above `i64::MAX`.
  Unsigned(u64),
  Float(f64),
  String(String),
  List(Vec<PropertyValue>),
  Map(Properties),
}

impl PropertyValue {
  pub fn as_str(&self) -> Option<&str> {
    match self {
      PropertyValue::String(s) => Some(s),
      _ => None,
    }
  }

  pub fn as_i64(&self) -> Option<i64> {
    match self {
      PropertyValue::Integer(i) => Some(*i),
      _ => None,
    }
  }

  pub fn as_list(&self) -> Option<&[PropertyValue]> {
    match self {
      PropertyValue::List(items) => Some(items),
      _ => None,
    }
  }

  pub fn is_null(&self) -> bool {
    matches!(self, PropertyValue::Null)
  }

  pub fn as_bool(&self) -> Option<bool> {
    match self {
      PropertyValue::Bool(b) => Some(*b),
      _ => None,
    }
  }
}

impl From<&str> for PropertyValue {
  fn from(value: &str) -> Self {
    PropertyValue::String(value.to_string())
  }
}

impl From<String> for PropertyValue {
  fn from(value: String) -> Self {
    PropertyValue::String(value)
  }
}

impl From<i64> for PropertyValue {
  fn from(value: i64) -> Self {
    PropertyValue::Integer(value)
  }
}

impl From<f64> for PropertyValue {
  fn from(value: f64) -> Self {
    PropertyValue::Float(value)
  }
}

impl From<bool> for PropertyValue {
  fn from(value: bool) -> Self {
    PropertyValue::Bool(value)
  }
}

impl From<Vec<PropertyValue>> for PropertyValue {
  fn from(value: Vec<PropertyValue>) -> Self {
    PropertyValue::List(value)
  }
}

impl From<Properties> for PropertyValue {
  fn from(value: Properties) -> Self {
    PropertyValue::Map(value)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_untagged_values() {
    let props: Properties = serde_json::from_str(
      r#"{"enabled": true, "retries": 3, "ratio": 0.5, "queue": "fast", "env": {"HOME": "/tmp"}}"#,
    )
    .unwrap();

    assert_eq!(props["enabled"], PropertyValue::Bool(true));
    assert_eq!(props["retries"].as_i64(), Some(3));
    assert_eq!(props["ratio"], PropertyValue::Float(0.5));
    assert_eq!(props["queue"].as_str(), Some("fast"));
    match &props["env"] {
      PropertyValue::Map(env) => assert_eq!(env["HOME"].as_str(), Some("/tmp")),
      other => panic!("expected map, got {:?}", other),
    }
  }

  #[test]
  fn test_serializes_as_plain_json() {
    let mut props = Properties::new();
    props.insert("retries".to_string(), 3i64.into());
    props.insert("queue".to_string(), "fast".into());

    let json = serde_json::to_value(&props).unwrap();
    assert_eq!(json, serde_json::json!({"queue": "fast", "retries": 3}));
  }

  #[test]
  fn test_lists_nulls_and_large_integers() {
    let props: Properties = serde_json::from_str(
      r#"{"hosts": ["a", "b"], "owner": null, "seed": 18446744073709551615, "nested": [[1], {"k": null}]}"#,
    )
    .unwrap();

    let hosts = props["hosts"].as_list().unwrap();
    assert_eq!(hosts, [PropertyValue::from("a"), PropertyValue::from("b")]);
    assert!(props["owner"].is_null());
    assert_eq!(props["seed"], PropertyValue::Unsigned(u64::MAX));
    assert!(matches!(&props["nested"], PropertyValue::List(items) if items.len() == 2));

    let json = serde_json::to_value(&props).unwrap();
    assert_eq!(json["hosts"], serde_json::json!(["a", "b"]));
    assert_eq!(json["owner"], serde_json::Value::Null);
    assert_eq!(json["seed"], serde_json::json!(u64::MAX));
  }
}
