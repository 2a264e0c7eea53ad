//! The config short-name table driving `clear-config`.

use serde_json::Value;

use super::store::Store;
use crate::error::{Error, Result};
use crate::loader::Layout;

pub const FILE_NAME: &str = "configs.json";

/// Maps a config short-name (e.g. `"rewrites"`) to the config file it
/// controls, relative to the etc directory. Persisted at `etc/configs.json`.
pub struct Configs {
  store: Store,
}

impl Configs {
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

  /// The controlled file for a short-name, or [`Error::UnknownConfigType`].
  pub fn file_name(&self, name: &str) -> Result<String> {
    match self.store.get(name) {
      Some(Value::String(file_name)) => Ok(file_name),
      _ => Err(Error::UnknownConfigType(name.to_owned())),
    }
  }

  pub fn names(&self) -> Vec<String> {
    self.store.keys()
  }

  pub fn save(&self) -> Result<()> {
    self.store.save()
  }
}
