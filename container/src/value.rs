//! The value currency of the engine: type names, constructed instances and
//! the arguments that flow into constructors.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// An opaque, fully-qualified, `::`-separated identifier for a constructible
/// type, e.g. `"app::mailer::Smtp"`.
///
/// A leading `::` (the absolute spelling) is stripped on construction and on
/// deserialization, so relative and absolute spellings of the same type
/// converge on one canonical form. Every table, cache, registry and resolver
/// key is a normalized `TypeName`, including keys restored from persisted
/// files.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct TypeName(String);

impl TypeName {
  pub fn new(name: impl AsRef<str>) -> Self {
    let name = name.as_ref();
    let normalized = name.strip_prefix("::").unwrap_or(name);
    Self(normalized.to_owned())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl From<&str> for TypeName {
  fn from(name: &str) -> Self {
    Self::new(name)
  }
}

impl From<String> for TypeName {
  fn from(name: String) -> Self {
    Self::new(name)
  }
}

impl From<TypeName> for String {
  fn from(name: TypeName) -> Self {
    name.0
  }
}

impl fmt::Display for TypeName {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl fmt::Debug for TypeName {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "TypeName({})", self.0)
  }
}

/// A constructed object: the concrete (possibly rewritten) type name plus a
/// shared handle to the value itself.
///
/// Cloning shares the underlying object; [`Instance::ptr_eq`] is identity.
#[derive(Clone)]
pub struct Instance {
  type_name: TypeName,
  object: Arc<dyn Any + Send + Sync>,
}

impl Instance {
  /// Wraps a freshly constructed value.
  pub fn new<T: Any + Send + Sync>(type_name: impl Into<TypeName>, value: T) -> Self {
    Self {
      type_name: type_name.into(),
      object: Arc::new(value),
    }
  }

  /// Wraps an already shared value.
  pub fn from_arc(type_name: impl Into<TypeName>, object: Arc<dyn Any + Send + Sync>) -> Self {
    Self {
      type_name: type_name.into(),
      object,
    }
  }

  /// The concrete type name this instance was constructed as.
  pub fn type_name(&self) -> &TypeName {
    &self.type_name
  }

  /// Recovers the typed handle, if `T` is what was stored.
  pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
    Arc::clone(&self.object).downcast::<T>().ok()
  }

  /// True when both instances share the same underlying object.
  pub fn ptr_eq(&self, other: &Instance) -> bool {
    Arc::ptr_eq(&self.object, &other.object)
  }
}

impl fmt::Debug for Instance {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Instance({})", self.type_name)
  }
}

/// A value flowing into a constructor: either a JSON literal (caller-supplied,
/// configured default or declared default) or an already constructed instance.
#[derive(Clone, Debug)]
pub enum Argument {
  Literal(serde_json::Value),
  Instance(Instance),
}

impl Argument {
  pub fn as_literal(&self) -> Option<&serde_json::Value> {
    match self {
      Argument::Literal(value) => Some(value),
      Argument::Instance(_) => None,
    }
  }

  pub fn as_instance(&self) -> Option<&Instance> {
    match self {
      Argument::Instance(instance) => Some(instance),
      Argument::Literal(_) => None,
    }
  }
}

impl From<serde_json::Value> for Argument {
  fn from(value: serde_json::Value) -> Self {
    Argument::Literal(value)
  }
}

impl From<Instance> for Argument {
  fn from(instance: Instance) -> Self {
    Argument::Instance(instance)
  }
}

/// Caller-supplied constructor arguments, keyed by parameter name.
///
/// A given argument wins outright over every other value source for that
/// parameter.
#[derive(Clone, Debug, Default)]
pub struct GivenArguments {
  values: HashMap<String, Argument>,
}

impl GivenArguments {
  pub fn new() -> Self {
    Self::default()
  }

  /// Adds one argument, builder style.
  pub fn with(mut self, name: impl Into<String>, argument: impl Into<Argument>) -> Self {
    self.values.insert(name.into(), argument.into());
    self
  }

  pub fn insert(&mut self, name: impl Into<String>, argument: impl Into<Argument>) {
    self.values.insert(name.into(), argument.into());
  }

  pub fn get(&self, name: &str) -> Option<&Argument> {
    self.values.get(name)
  }

  pub fn is_empty(&self) -> bool {
    self.values.is_empty()
  }

  pub fn len(&self) -> usize {
    self.values.len()
  }
}
