//! The rewrite table: requested type name to replacement type name.

use serde_json::{Map, Value};
use tracing::trace;

use super::store::Store;
use crate::error::{Error, Result};
use crate::loader::Layout;
use crate::value::TypeName;

pub const FILE_NAME: &str = "rewrites.json";

/// Configured type substitutions, persisted at `etc/rewrites.json`.
///
/// Exactly one level is applied per lookup; chains are only followed when the
/// table is queried again for the rewritten name.
pub struct Rewrites {
  store: Store,
}

impl Rewrites {
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

  pub fn add(&self, from: impl Into<TypeName>, to: impl Into<TypeName>) {
    let from = from.into();
    let to = to.into();
    self.store.set(from.as_str(), Value::String(to.as_str().to_owned()));
  }

  pub fn remove(&self, from: &TypeName) -> bool {
    self.store.remove(from.as_str()).is_some()
  }

  /// The configured replacement for `name`, if any. Keys and values are
  /// normalized type names.
  pub fn lookup(&self, name: &TypeName) -> Option<TypeName> {
    match self.store.get(name.as_str()) {
      Some(Value::String(target)) => Some(TypeName::new(target)),
      _ => None,
    }
  }

  /// One rewrite level: the replacement when configured, `name` otherwise.
  pub fn apply(&self, name: &TypeName) -> TypeName {
    match self.lookup(name) {
      Some(target) => {
        trace!(from = %name, to = %target, "applying rewrite");
        target
      }
      None => name.clone(),
    }
  }

  /// Merges a JSON object of `from: to` pairs, the `add-rewrite` payload.
  /// Every value must be a string naming a type.
  pub fn merge(&self, incoming: Map<String, Value>) -> Result<()> {
    let mut normalized = Map::new();
    for (from, to) in incoming {
      let Value::String(target) = to else {
        return Err(Error::InvalidOperand(format!(
          "rewrite target for {from} must be a type name string"
        )));
      };
      normalized.insert(
        TypeName::new(from).as_str().to_owned(),
        Value::String(TypeName::new(target).as_str().to_owned()),
      );
    }
    self.store.merge(normalized);
    Ok(())
  }

  pub fn clear(&self) {
    self.store.clear();
  }

  pub fn save(&self) -> Result<()> {
    self.store.save()
  }

  pub fn len(&self) -> usize {
    self.store.len()
  }

  pub fn is_empty(&self) -> bool {
    self.store.is_empty()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn apply_is_identity_without_an_entry() {
    let rewrites = Rewrites::in_memory();
    let name = TypeName::new("app::TestA");
    assert_eq!(rewrites.apply(&name), name);
  }

  #[test]
  fn apply_resolves_exactly_one_level() {
    let rewrites = Rewrites::in_memory();
    rewrites.add("app::A", "app::B");
    rewrites.add("app::B", "app::C");

    // One level per lookup, never transitive within a call.
    assert_eq!(rewrites.apply(&TypeName::new("app::A")), TypeName::new("app::B"));
  }

  #[test]
  fn keys_are_normalized() {
    let rewrites = Rewrites::in_memory();
    rewrites.add("::app::A", "::app::B");

    assert_eq!(rewrites.lookup(&TypeName::new("app::A")), Some(TypeName::new("app::B")));
  }

  #[test]
  fn merge_rejects_non_string_targets() {
    let rewrites = Rewrites::in_memory();
    let mut incoming = Map::new();
    incoming.insert("app::A".into(), serde_json::json!(5));

    assert!(matches!(rewrites.merge(incoming), Err(Error::InvalidOperand(_))));
    assert!(rewrites.is_empty());
  }
}
