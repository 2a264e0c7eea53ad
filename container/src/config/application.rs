//! Application-level settings, currently just the selected environment.

use serde_json::Value;

use super::environments::Environments;
use super::store::Store;
use crate::error::{Error, Result};
use crate::loader::Layout;

pub const FILE_NAME: &str = "application.json";

const ENV_KEY: &str = "env";

/// The application config, persisted at `etc/application.json`.
pub struct Application {
  store: Store,
}

impl Application {
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

  pub fn env(&self) -> Option<String> {
    match self.store.get(ENV_KEY) {
      Some(Value::String(env)) => Some(env),
      _ => None,
    }
  }

  /// Selects an environment. The name must be listed in the environments
  /// config; otherwise the error names the available ones.
  pub fn set_env(&self, env: &str, environments: &Environments) -> Result<()> {
    if !environments.contains(env) {
      return Err(Error::UnknownEnvironment {
        requested: env.to_owned(),
        available: environments.names().join(", "),
      });
    }
    self.store.set(ENV_KEY, Value::String(env.to_owned()));
    Ok(())
  }

  pub fn save(&self) -> Result<()> {
    self.store.save()
  }
}
