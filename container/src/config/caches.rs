//! The cache short-name table driving `clear-cache`.

use serde_json::Value;

use super::store::Store;
use crate::error::{Error, Result};
use crate::loader::Layout;

pub const FILE_NAME: &str = "caches.json";

/// Maps a cache short-name (e.g. `"classes"`) to the cache file it controls,
/// relative to the cache directory. Persisted at `etc/caches.json`.
pub struct Caches {
  store: Store,
}

impl Caches {
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

  pub fn add(&self, name: impl Into<String>, file_name: impl Into<String>) {
    self.store.set(name, Value::String(file_name.into()));
  }

  /// The controlled file for a short-name, or [`Error::UnknownCacheType`].
  pub fn file_name(&self, name: &str) -> Result<String> {
    match self.store.get(name) {
      Some(Value::String(file_name)) => Ok(file_name),
      _ => Err(Error::UnknownCacheType(name.to_owned())),
    }
  }

  pub fn names(&self) -> Vec<String> {
    self.store.keys()
  }

  pub fn save(&self) -> Result<()> {
    self.store.save()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn unknown_short_name_is_an_error() {
    let caches = Caches::in_memory();
    caches.add("classes", "classes.json");

    assert_eq!(caches.file_name("classes").unwrap(), "classes.json");
    assert!(matches!(caches.file_name("sessions"), Err(Error::UnknownCacheType(_))));
  }
}
