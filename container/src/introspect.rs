//! The host-runtime capability boundary: how the container learns the shape
//! of a constructor and how it asks for a value to be built.
//!
//! The resolver never depends on *how* this metadata is obtained. The shipped
//! implementation is [`crate::registry::Registry`], a statically populated
//! map of type definitions; a code generator or a reflection layer could
//! implement the same trait.

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::value::{Argument, Instance, TypeName};

/// The raw record for one constructor parameter, as the introspector reports
/// it: name, declared type name (or none for scalars), variadic flag and an
/// optional declared default literal.
#[derive(Clone, Debug)]
pub struct ConstructorParameter {
  pub name: String,
  pub type_name: Option<TypeName>,
  pub variadic: bool,
  pub default: Option<serde_json::Value>,
}

impl ConstructorParameter {
  /// A parameter whose declared type names a constructible type.
  pub fn typed(name: impl Into<String>, type_name: impl Into<TypeName>) -> Self {
    Self {
      name: name.into(),
      type_name: Some(type_name.into()),
      variadic: false,
      default: None,
    }
  }

  /// A parameter with no declared constructible type.
  pub fn scalar(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      type_name: None,
      variadic: false,
      default: None,
    }
  }

  /// Attaches a declared default literal, builder style.
  pub fn with_default(mut self, default: serde_json::Value) -> Self {
    self.default = Some(default);
    self
  }

  /// Marks the parameter variadic.
  pub fn variadic(mut self) -> Self {
    self.variadic = true;
    self
  }
}

/// One fully-resolved argument, by parameter name. Spread elements of a
/// variadic tail all carry the variadic parameter's name.
#[derive(Clone, Debug)]
pub struct ResolvedArgument {
  pub name: String,
  pub value: Argument,
}

/// The ordered, fully-resolved argument list handed to a factory.
///
/// Accessors return [`Error::Instantiation`] on a missing name or a kind
/// mismatch, so factories can stay terse with `?`.
#[derive(Debug)]
pub struct ResolvedArguments {
  type_name: TypeName,
  values: Vec<ResolvedArgument>,
}

impl ResolvedArguments {
  pub fn new(type_name: TypeName, values: Vec<ResolvedArgument>) -> Self {
    Self { type_name, values }
  }

  pub fn empty(type_name: TypeName) -> Self {
    Self {
      type_name,
      values: Vec::new(),
    }
  }

  /// The type these arguments were resolved for.
  pub fn type_name(&self) -> &TypeName {
    &self.type_name
  }

  pub fn len(&self) -> usize {
    self.values.len()
  }

  pub fn is_empty(&self) -> bool {
    self.values.is_empty()
  }

  /// The first argument with this parameter name.
  pub fn get(&self, name: &str) -> Option<&Argument> {
    self
      .values
      .iter()
      .find(|argument| argument.name == name)
      .map(|argument| &argument.value)
  }

  /// All arguments with this parameter name, in order. This is how a factory
  /// consumes a variadic tail.
  pub fn variadic(&self, name: &str) -> Vec<&Argument> {
    self
      .values
      .iter()
      .filter(|argument| argument.name == name)
      .map(|argument| &argument.value)
      .collect()
  }

  pub fn literal(&self, name: &str) -> Result<&serde_json::Value> {
    match self.get(name) {
      Some(Argument::Literal(value)) => Ok(value),
      Some(Argument::Instance(_)) => Err(self.mismatch(name, "a literal")),
      None => Err(self.missing(name)),
    }
  }

  pub fn string(&self, name: &str) -> Result<String> {
    let value = self.literal(name)?;
    value
      .as_str()
      .map(str::to_owned)
      .ok_or_else(|| self.mismatch(name, "a string"))
  }

  pub fn integer(&self, name: &str) -> Result<i64> {
    let value = self.literal(name)?;
    value.as_i64().ok_or_else(|| self.mismatch(name, "an integer"))
  }

  pub fn boolean(&self, name: &str) -> Result<bool> {
    let value = self.literal(name)?;
    value.as_bool().ok_or_else(|| self.mismatch(name, "a boolean"))
  }

  pub fn instance(&self, name: &str) -> Result<&Instance> {
    match self.get(name) {
      Some(Argument::Instance(instance)) => Ok(instance),
      Some(Argument::Literal(_)) => Err(self.mismatch(name, "an instance")),
      None => Err(self.missing(name)),
    }
  }

  /// Recovers the typed handle of an instance argument.
  pub fn instance_of<T: std::any::Any + Send + Sync>(&self, name: &str) -> Result<Arc<T>> {
    let instance = self.instance(name)?;
    instance
      .downcast::<T>()
      .ok_or_else(|| self.mismatch(name, "an instance of the expected type"))
  }

  fn missing(&self, name: &str) -> Error {
    Error::Instantiation {
      type_name: self.type_name.clone(),
      reason: format!("no resolved argument named {name}"),
    }
  }

  fn mismatch(&self, name: &str, expected: &str) -> Error {
    Error::Instantiation {
      type_name: self.type_name.clone(),
      reason: format!("argument {name} is not {expected}"),
    }
  }
}

/// Constructor metadata and instantiation for a universe of type names.
///
/// `is_defined`, `constructor_arity` and `instantiate` are the explicit
/// renditions of what a reflective host runtime provides implicitly;
/// `constructor_arity` exists so the zero-argument fast path never has to
/// enumerate parameters.
pub trait Introspector: Send + Sync {
  /// Whether the name is known at all.
  fn is_defined(&self, name: &TypeName) -> bool;

  /// Whether the name can actually be constructed. Capability names that
  /// only exist to be rewritten are defined but not instantiable.
  fn is_instantiable(&self, name: &TypeName) -> bool;

  fn has_constructor(&self, name: &TypeName) -> bool;

  /// Number of declared constructor parameters; zero when there is no
  /// constructor.
  fn constructor_arity(&self, name: &TypeName) -> usize;

  /// The declared parameters, in declaration order.
  fn constructor_parameters(&self, name: &TypeName) -> Vec<ConstructorParameter>;

  /// Builds an instance of `name` from fully-resolved arguments.
  fn instantiate(&self, name: &TypeName, arguments: ResolvedArguments) -> Result<Instance>;
}
