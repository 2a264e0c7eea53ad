//! The set of environments `set-env` may select.

use serde_json::{json, Value};

use super::store::Store;
use crate::error::Result;
use crate::loader::Layout;

pub const FILE_NAME: &str = "environments.json";

/// Available environment names, persisted at `etc/environments.json`. The
/// object's keys are the environment names; the values are free-form
/// per-environment settings the engine does not interpret.
pub struct Environments {
  store: Store,
}

impl Environments {
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

  pub fn add(&self, name: impl Into<String>) {
    self.store.set(name, json!({}));
  }

  pub fn contains(&self, name: &str) -> bool {
    self.store.contains(name)
  }

  pub fn names(&self) -> Vec<String> {
    self.store.keys()
  }

  pub fn settings(&self, name: &str) -> Option<Value> {
    self.store.get(name)
  }

  pub fn save(&self) -> Result<()> {
    self.store.save()
  }
}
