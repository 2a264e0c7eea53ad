//! The default value table: (type name, parameter name) to a literal.

use serde_json::{Map, Value};

use super::store::Store;
use crate::error::{Error, Result};
use crate::loader::Layout;
use crate::value::TypeName;

pub const FILE_NAME: &str = "default_values.json";

/// Configured per-parameter default literals, persisted at
/// `etc/default_values.json` as `{type: {parameter: value}}`.
///
/// A configured default is shadowed by a caller-supplied argument and takes
/// precedence over the parameter's declared default.
pub struct DefaultValues {
  store: Store,
}

impl DefaultValues {
  pub fn in_memory() -> Self {
    Self {
      store: Store::in_memory(),
    }
  }

  pub fn open(layout: &Layout) -> Result<Self> {
    Ok(Self {
      store: Store::open(layout.config_file(FILE_NAME))?,
    })
  }

  pub fn add(&self, type_name: impl Into<TypeName>, parameter: impl Into<String>, value: Value) {
    let type_name = type_name.into();
    let mut entry = match self.store.get(type_name.as_str()) {
      Some(Value::Object(map)) => map,
      _ => Map::new(),
    };
    entry.insert(parameter.into(), value);
    self.store.set(type_name.as_str(), Value::Object(entry));
  }

  pub fn remove(&self, type_name: &TypeName, parameter: &str) -> bool {
    let Some(Value::Object(mut entry)) = self.store.get(type_name.as_str()) else {
      return false;
    };
    let removed = entry.remove(parameter).is_some();
    if removed {
      self.store.set(type_name.as_str(), Value::Object(entry));
    }
    removed
  }

  pub fn lookup(&self, type_name: &TypeName, parameter: &str) -> Option<Value> {
    match self.store.get(type_name.as_str()) {
      Some(Value::Object(entry)) => entry.get(parameter).cloned(),
      _ => None,
    }
  }

  /// Merges the `add-default-value` payload for one type: a JSON object of
  /// parameter-to-literal pairs, merged over any existing entry.
  pub fn merge_for(&self, type_name: impl Into<TypeName>, incoming: Map<String, Value>) -> Result<()> {
    let type_name = type_name.into();
    if incoming.is_empty() {
      return Err(Error::InvalidOperand(format!(
        "default values for {type_name} must be a non-empty JSON object"
      )));
    }
    for (parameter, value) in incoming {
      self.add(type_name.clone(), parameter, value);
    }
    Ok(())
  }

  pub fn clear(&self) {
    self.store.clear();
  }

  pub fn save(&self) -> Result<()> {
    self.store.save()
  }

  pub fn is_empty(&self) -> bool {
    self.store.is_empty()
  }
}
