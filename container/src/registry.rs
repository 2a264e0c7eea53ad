//! The shipped [`Introspector`]: a thread-safe map of registered type
//! definitions with factory closures.
//!
//! Constructing-by-string-name is replaced by this registry: a stable type
//! identifier maps to a declared constructor shape plus a closure that builds
//! the value from resolved arguments.

use std::any::Any;
use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use crate::error::{Error, Result};
use crate::introspect::{ConstructorParameter, Introspector, ResolvedArguments};
use crate::value::{Instance, TypeName};

type Factory = Box<dyn Fn(ResolvedArguments) -> Result<Arc<dyn Any + Send + Sync>> + Send + Sync>;

/// One registered type: its constructor shape and how to build it.
pub struct TypeDefinition {
  name: TypeName,
  instantiable: bool,
  // None means "no constructor"; Some(vec![]) is a zero-parameter constructor.
  parameters: Option<Vec<ConstructorParameter>>,
  factory: Option<Factory>,
}

impl TypeDefinition {
  /// A constructible type. The factory returns the concrete value; the
  /// registry wraps it into an [`Instance`] carrying the registered name.
  pub fn new<T, F>(name: impl Into<TypeName>, factory: F) -> Self
  where
    T: Any + Send + Sync,
    F: Fn(ResolvedArguments) -> Result<T> + Send + Sync + 'static,
  {
    Self {
      name: name.into(),
      instantiable: true,
      parameters: None,
      factory: Some(Box::new(move |arguments| {
        Ok(Arc::new(factory(arguments)?) as Arc<dyn Any + Send + Sync>)
      })),
    }
  }

  /// A name that exists but cannot be constructed. Capability names are
  /// registered this way and resolved through a rewrite to a concrete type.
  pub fn capability(name: impl Into<TypeName>) -> Self {
    Self {
      name: name.into(),
      instantiable: false,
      parameters: None,
      factory: None,
    }
  }

  /// Declares the constructor parameters, in declaration order.
  pub fn with_constructor(mut self, parameters: Vec<ConstructorParameter>) -> Self {
    self.parameters = Some(parameters);
    self
  }

  pub fn name(&self) -> &TypeName {
    &self.name
  }
}

impl std::fmt::Debug for TypeDefinition {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("TypeDefinition")
      .field("name", &self.name)
      .field("instantiable", &self.instantiable)
      .field("arity", &self.parameters.as_ref().map(Vec::len))
      .finish()
  }
}

/// Thread-safe registry of [`TypeDefinition`]s.
#[derive(Default)]
pub struct Registry {
  types: DashMap<TypeName, TypeDefinition>,
}

impl Registry {
  pub fn new() -> Self {
    Self::default()
  }

  /// Registers (or replaces) a type definition.
  pub fn register(&self, definition: TypeDefinition) {
    debug!(type_name = %definition.name, instantiable = definition.instantiable, "registering type");
    self.types.insert(definition.name.clone(), definition);
  }

  pub fn len(&self) -> usize {
    self.types.len()
  }

  pub fn is_empty(&self) -> bool {
    self.types.is_empty()
  }
}

impl Introspector for Registry {
  fn is_defined(&self, name: &TypeName) -> bool {
    self.types.contains_key(name)
  }

  fn is_instantiable(&self, name: &TypeName) -> bool {
    self
      .types
      .get(name)
      .map(|definition| definition.instantiable)
      .unwrap_or(false)
  }

  fn has_constructor(&self, name: &TypeName) -> bool {
    self
      .types
      .get(name)
      .map(|definition| definition.parameters.is_some())
      .unwrap_or(false)
  }

  fn constructor_arity(&self, name: &TypeName) -> usize {
    self
      .types
      .get(name)
      .and_then(|definition| definition.parameters.as_ref().map(Vec::len))
      .unwrap_or(0)
  }

  fn constructor_parameters(&self, name: &TypeName) -> Vec<ConstructorParameter> {
    self
      .types
      .get(name)
      .and_then(|definition| definition.parameters.clone())
      .unwrap_or_default()
  }

  fn instantiate(&self, name: &TypeName, arguments: ResolvedArguments) -> Result<Instance> {
    let definition = self
      .types
      .get(name)
      .ok_or_else(|| Error::UnknownType(name.clone()))?;

    let factory = definition
      .factory
      .as_ref()
      .ok_or_else(|| Error::NotInstantiable(name.clone()))?;

    let object = factory(arguments)?;
    Ok(Instance::from_arc(name.clone(), object))
  }
}
