//! The shared load-on-open / mutate-in-memory / save-on-demand core behind
//! every config store.

use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::loader::{FileLoader, JsonFile};

/// An untyped JSON-object store. The concrete stores wrap it with their
/// filename and a typed view of the mapping.
pub struct Store {
  path: Option<PathBuf>,
  loader: JsonFile,
  data: RwLock<Map<String, Value>>,
}

impl Store {
  /// A detached store with no backing file; `save` is a no-op.
  pub fn in_memory() -> Self {
    Self {
      path: None,
      loader: JsonFile::pretty(),
      data: RwLock::new(Map::new()),
    }
  }

  /// Opens a file-backed store. A missing file is an empty mapping; an
  /// existing file must hold a JSON object.
  pub fn open(path: PathBuf) -> Result<Self> {
    let loader = JsonFile::pretty();
    let data = if path.exists() {
      match loader.load(&path)? {
        Value::Object(map) => map,
        _ => {
          return Err(Error::Json {
            path,
            reason: "expected a JSON object at the top level".into(),
          });
        }
      }
    } else {
      Map::new()
    };

    Ok(Self {
      path: Some(path),
      loader,
      data: RwLock::new(data),
    })
  }

  pub fn path(&self) -> Option<&Path> {
    self.path.as_deref()
  }

  pub fn get(&self, key: &str) -> Option<Value> {
    self.data.read().get(key).cloned()
  }

  pub fn set(&self, key: impl Into<String>, value: Value) {
    self.data.write().insert(key.into(), value);
  }

  pub fn remove(&self, key: &str) -> Option<Value> {
    self.data.write().remove(key)
  }

  pub fn contains(&self, key: &str) -> bool {
    self.data.read().contains_key(key)
  }

  pub fn keys(&self) -> Vec<String> {
    self.data.read().keys().cloned().collect()
  }

  pub fn len(&self) -> usize {
    self.data.read().len()
  }

  pub fn is_empty(&self) -> bool {
    self.data.read().is_empty()
  }

  pub fn clear(&self) {
    self.data.write().clear();
  }

  /// Shallow per-key merge; incoming keys overwrite existing ones.
  pub fn merge(&self, incoming: Map<String, Value>) {
    let mut data = self.data.write();
    for (key, value) in incoming {
      data.insert(key, value);
    }
  }

  /// Writes the current mapping back to the backing file, if any.
  pub fn save(&self) -> Result<()> {
    let Some(path) = &self.path else {
      return Ok(());
    };
    let data = self.data.read().clone();
    self.loader.save(path, &Value::Object(data))
  }
}
