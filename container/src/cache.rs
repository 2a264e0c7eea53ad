//! The metadata cache: processed constructor descriptors per type name,
//! persisted as compact JSON and flushed best-effort when dropped.

use std::collections::HashMap;
use std::path::PathBuf;

use parking_lot::RwLock;
use serde_json::Value;
use tracing::warn;

use crate::error::Result;
use crate::loader::{FileLoader, JsonFile, Layout};
use crate::metadata::{ClassMetadata, DescriptorValue};
use crate::value::TypeName;

pub const FILE_NAME: &str = "classes.json";

/// `TypeName -> ClassMetadata`, backed by `var/cache/classes.json`.
///
/// An unreadable or structurally stale cache file is discarded with a warning
/// rather than failing the open; the cache is advisory state and is rebuilt on
/// demand.
pub struct ClassCache {
  path: Option<PathBuf>,
  loader: JsonFile,
  data: RwLock<HashMap<TypeName, ClassMetadata>>,
}

impl ClassCache {
  /// A detached cache with no backing file; `save` is a no-op.
  pub fn in_memory() -> Self {
    Self {
      path: None,
      loader: JsonFile::compact(),
      data: RwLock::new(HashMap::new()),
    }
  }

  pub fn open(layout: &Layout) -> Self {
    Self::open_file(layout.cache_file(FILE_NAME))
  }

  pub fn open_file(path: PathBuf) -> Self {
    let loader = JsonFile::compact();
    let data = if path.exists() {
      match loader
        .load(&path)
        .and_then(|value| {
          serde_json::from_value::<HashMap<TypeName, ClassMetadata>>(value).map_err(|e| {
            crate::error::Error::Json {
              path: path.clone(),
              reason: format!("stale cache structure: {e}"),
            }
          })
        }) {
        Ok(data) => data,
        Err(error) => {
          warn!(path = %path.display(), %error, "discarding unreadable metadata cache");
          HashMap::new()
        }
      }
    } else {
      HashMap::new()
    };

    Self {
      path: Some(path),
      loader,
      data: RwLock::new(data),
    }
  }

  pub fn retrieve(&self, name: &TypeName) -> Option<ClassMetadata> {
    self.data.read().get(name).cloned()
  }

  /// Stores processed metadata. Literal JSON arrays have their leaves
  /// coerced to strings so cached parameter values stay uniformly
  /// string-typed; scalar literals are stored untouched.
  pub fn store(&self, name: &TypeName, metadata: &ClassMetadata) {
    let coerced = metadata.clone().map(|mut descriptor| {
      if let DescriptorValue::Literal(value @ Value::Array(_)) = &mut descriptor.value {
        stringify_leaves(value);
      }
      descriptor
    });
    self.data.write().insert(name.clone(), coerced);
  }

  pub fn remove(&self, name: &TypeName) -> bool {
    self.data.write().remove(name).is_some()
  }

  pub fn clear(&self) {
    self.data.write().clear();
  }

  pub fn len(&self) -> usize {
    self.data.read().len()
  }

  pub fn is_empty(&self) -> bool {
    self.data.read().is_empty()
  }

  pub fn save(&self) -> Result<()> {
    let Some(path) = &self.path else {
      return Ok(());
    };
    let data = self.data.read().clone();
    let value = serde_json::to_value(data).map_err(|e| crate::error::Error::Json {
      path: path.clone(),
      reason: format!("cannot be encoded: {e}"),
    })?;
    self.loader.save(path, &value)
  }
}

impl Drop for ClassCache {
  fn drop(&mut self) {
    if let Err(error) = self.save() {
      warn!(%error, "failed to save metadata cache on drop");
    }
  }
}

/// Coerces every non-string leaf inside arrays and objects to its string
/// form; nulls become empty strings.
fn stringify_leaves(value: &mut Value) {
  match value {
    Value::Array(items) => {
      for item in items {
        stringify_leaves(item);
      }
    }
    Value::Object(entries) => {
      for (_, item) in entries {
        stringify_leaves(item);
      }
    }
    Value::String(_) => {}
    Value::Null => *value = Value::String(String::new()),
    ref other => {
      let text = other.to_string();
      *value = Value::String(text);
    }
  }
}
