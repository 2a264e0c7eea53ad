//! The resolution engine.
//!
//! `create` builds a fully-initialized instance for a requested type name by
//! recursively resolving its constructor dependencies: validate, rewrite,
//! singleton check, in-flight bracket, metadata (cache or introspection),
//! merge with caller arguments, recursive load, instantiate.

use std::sync::Arc;

use dashmap::DashMap;
use serde_json::Value;
use tracing::{debug, trace};

use crate::cache::ClassCache;
use crate::config::{DefaultValues, Rewrites};
use crate::error::{Error, Result};
use crate::introspect::{ConstructorParameter, Introspector, ResolvedArgument, ResolvedArguments};
use crate::loader::Layout;
use crate::metadata::{ClassMetadata, DescriptorValue, ParameterDescriptor};
use crate::value::{Argument, GivenArguments, Instance, TypeName};

bitflags::bitflags! {
  /// Per-call behavior switches for [`Container::create_with`].
  ///
  /// Recursive resolution of a parameter never inherits the caller's flags;
  /// every recursive frame runs with the default (empty) set.
  #[derive(Debug, Clone, Copy, PartialEq, Eq)]
  pub struct CreateFlags: u8 {
    /// Cache the instance per type name for the process lifetime and return
    /// the cached one on later singleton requests.
    const SINGLETON = 1 << 0;
    /// Skip the rewrite table for this call, both for the requested name and
    /// for freshly introspected parameter types.
    const NO_REWRITE = 1 << 1;
    /// Skip the configured default value table. Declared defaults still
    /// apply.
    const NO_DEFAULT_VALUE = 1 << 2;
    /// Bypass the metadata cache, reading and writing nothing.
    const NO_CACHE = 1 << 3;
  }
}

/// The set of type names currently mid-construction on one resolution chain,
/// threaded down the recursion. A duplicate entry is the cycle trigger.
#[derive(Debug, Default)]
struct BuildStack {
  frames: Vec<TypeName>,
}

impl BuildStack {
  fn new() -> Self {
    Self::default()
  }

  fn enter(&mut self, name: TypeName) -> Result<()> {
    if self.frames.contains(&name) {
      return Err(Error::CyclicDependency(name));
    }
    self.frames.push(name);
    Ok(())
  }

  fn exit(&mut self, name: &TypeName) {
    if let Some(position) = self.frames.iter().rposition(|frame| frame == name) {
      self.frames.remove(position);
    }
  }

  fn depth(&self) -> usize {
    self.frames.len()
  }
}

/// The autowiring container.
///
/// Owns the rewrite table, the default value table, the metadata cache and
/// the process-wide singleton registry. The container is `Send + Sync`;
/// per-call state (the in-flight set) lives on the stack of each `create`
/// call, so concurrent callers never observe each other's cycles.
pub struct Container {
  introspector: Arc<dyn Introspector>,
  rewrites: Rewrites,
  default_values: DefaultValues,
  cache: ClassCache,
  singletons: DashMap<TypeName, Instance>,
}

impl Container {
  /// A container with detached in-memory stores.
  pub fn new(introspector: Arc<dyn Introspector>) -> Self {
    Self::with_stores(
      introspector,
      Rewrites::in_memory(),
      DefaultValues::in_memory(),
      ClassCache::in_memory(),
    )
  }

  /// A container whose stores are loaded from (and saved to) the files under
  /// `layout`.
  pub fn open(introspector: Arc<dyn Introspector>, layout: &Layout) -> Result<Self> {
    Ok(Self::with_stores(
      introspector,
      Rewrites::open(layout)?,
      DefaultValues::open(layout)?,
      ClassCache::open(layout),
    ))
  }

  pub fn with_stores(
    introspector: Arc<dyn Introspector>,
    rewrites: Rewrites,
    default_values: DefaultValues,
    cache: ClassCache,
  ) -> Self {
    Self {
      introspector,
      rewrites,
      default_values,
      cache,
      singletons: DashMap::new(),
    }
  }

  pub fn rewrites(&self) -> &Rewrites {
    &self.rewrites
  }

  pub fn default_values(&self) -> &DefaultValues {
    &self.default_values
  }

  pub fn cache(&self) -> &ClassCache {
    &self.cache
  }

  /// Builds an instance of `type_name` with no caller arguments and default
  /// flags.
  pub fn create(&self, type_name: &str) -> Result<Instance> {
    self.create_with(type_name, GivenArguments::new(), CreateFlags::empty())
  }

  /// Builds an instance of `type_name`, merging `given` over resolved
  /// parameter values. A given argument wins outright; for the rest the
  /// precedence is type rewrite (constructible parameters), then configured
  /// default, then declared default.
  pub fn create_with(&self, type_name: &str, given: GivenArguments, flags: CreateFlags) -> Result<Instance> {
    let requested = TypeName::new(type_name);
    debug!(type_name = %requested, ?flags, "create requested");

    let mut stack = BuildStack::new();
    let instance = self.resolve(&requested, &given, flags, &mut stack)?;
    debug_assert_eq!(stack.depth(), 0);
    Ok(instance)
  }

  /// One resolution frame. Recursive parameter loads re-enter here with
  /// default flags and the same in-flight stack.
  fn resolve(
    &self,
    requested: &TypeName,
    given: &GivenArguments,
    flags: CreateFlags,
    stack: &mut BuildStack,
  ) -> Result<Instance> {
    if !self.introspector.is_defined(requested) {
      return Err(Error::UnknownType(requested.clone()));
    }

    // Existence is validated on the requested name, instantiability on the
    // rewritten one: a capability name with a configured rewrite resolves to
    // its concrete target.
    let name = if flags.contains(CreateFlags::NO_REWRITE) {
      requested.clone()
    } else {
      self.rewrites.apply(requested)
    };
    if name != *requested && !self.introspector.is_defined(&name) {
      return Err(Error::UnknownType(name));
    }
    if !self.introspector.is_instantiable(&name) {
      return Err(Error::NotInstantiable(name));
    }

    if flags.contains(CreateFlags::SINGLETON) {
      if let Some(existing) = self.singletons.get(&name) {
        trace!(type_name = %name, "singleton registry hit");
        return Ok(existing.clone());
      }
    }

    stack.enter(name.clone())?;
    let outcome = self.build(&name, given, flags, stack);
    // The in-flight entry is removed on every exit path; an error still
    // propagates after cleanup.
    stack.exit(&name);
    let instance = outcome?;

    if flags.contains(CreateFlags::SINGLETON) {
      // Insert-if-absent keeps singleton construction once-only under
      // contention; the registered instance is the one returned.
      let registered = self.singletons.entry(name).or_insert(instance);
      return Ok(registered.clone());
    }

    Ok(instance)
  }

  fn build(
    &self,
    name: &TypeName,
    given: &GivenArguments,
    flags: CreateFlags,
    stack: &mut BuildStack,
  ) -> Result<Instance> {
    // Zero-argument fast path: no cache, no parameter introspection.
    if !self.introspector.has_constructor(name) || self.introspector.constructor_arity(name) == 0 {
      trace!(type_name = %name, "constructing without parameters");
      return self.introspector.instantiate(name, ResolvedArguments::empty(name.clone()));
    }

    let metadata = self.metadata_for(name, flags);
    let arguments = self.load_parameters(name, metadata, given, stack)?;

    debug!(type_name = %name, arguments = arguments.len(), "instantiating");
    self
      .introspector
      .instantiate(name, ResolvedArguments::new(name.clone(), arguments))
  }

  /// The processed descriptors for `name`, from the cache when allowed or
  /// from fresh introspection otherwise.
  fn metadata_for(&self, name: &TypeName, flags: CreateFlags) -> ClassMetadata {
    if !flags.contains(CreateFlags::NO_CACHE) {
      if let Some(cached) = self.cache.retrieve(name) {
        trace!(type_name = %name, "metadata cache hit");
        return self.refresh_undefined(name, cached, flags);
      }
    }

    let metadata = self.introspect_metadata(name, flags);
    if !flags.contains(CreateFlags::NO_CACHE) {
      self.cache.store(name, &metadata);
    }
    metadata
  }

  /// Cached descriptors are reused as-is except that `Undefined` slots
  /// re-consult the default value table on every call. A default configured
  /// after the metadata was cached must take effect without a cache clear,
  /// and the refreshed value is not written back, so removing the default
  /// reverts the behavior.
  fn refresh_undefined(&self, name: &TypeName, metadata: ClassMetadata, flags: CreateFlags) -> ClassMetadata {
    if flags.contains(CreateFlags::NO_DEFAULT_VALUE) {
      return metadata;
    }
    metadata.map(|mut descriptor| {
      if descriptor.value.is_undefined() {
        if let Some(value) = self.default_values.lookup(name, &descriptor.name) {
          descriptor.value = DescriptorValue::Literal(value);
        }
      }
      descriptor
    })
  }

  fn introspect_metadata(&self, name: &TypeName, flags: CreateFlags) -> ClassMetadata {
    let parameters = self.introspector.constructor_parameters(name);
    ClassMetadata::new(
      parameters
        .into_iter()
        .map(|parameter| self.process_parameter(name, parameter, flags))
        .collect(),
    )
  }

  /// Resolves one raw parameter into a descriptor: constructible type (with
  /// one rewrite level), else configured default, else declared default,
  /// else `Undefined`.
  fn process_parameter(
    &self,
    owner: &TypeName,
    parameter: ConstructorParameter,
    flags: CreateFlags,
  ) -> ParameterDescriptor {
    let ConstructorParameter {
      name,
      type_name,
      variadic,
      default,
    } = parameter;

    if let Some(declared) = type_name {
      if self.introspector.is_defined(&declared) {
        let target = if flags.contains(CreateFlags::NO_REWRITE) {
          declared
        } else {
          self.rewrites.apply(&declared)
        };
        return ParameterDescriptor::new(name, variadic, DescriptorValue::Construct(target));
      }
    }

    if !flags.contains(CreateFlags::NO_DEFAULT_VALUE) {
      if let Some(value) = self.default_values.lookup(owner, &name) {
        return ParameterDescriptor::new(name, variadic, DescriptorValue::Literal(value));
      }
    }

    if let Some(value) = default {
      return ParameterDescriptor::new(name, variadic, DescriptorValue::Literal(value));
    }

    ParameterDescriptor::new(name, variadic, DescriptorValue::Undefined)
  }

  /// Merges the caller's arguments over the descriptors and loads every slot
  /// into a resolved value, recursing for constructible parameters. The
  /// recursive calls run with default flags.
  fn load_parameters(
    &self,
    name: &TypeName,
    metadata: ClassMetadata,
    given: &GivenArguments,
    stack: &mut BuildStack,
  ) -> Result<Vec<ResolvedArgument>> {
    let mut arguments = Vec::with_capacity(metadata.len());

    for descriptor in metadata {
      let ParameterDescriptor {
        name: parameter,
        variadic,
        value,
      } = descriptor;

      // A caller-supplied value wins outright. A variadic slot keeps its
      // flag and only the value is replaced, which here means the given
      // value is spread into the tail.
      if let Some(argument) = given.get(&parameter) {
        if variadic {
          spread_into(&mut arguments, &parameter, argument.clone());
        } else {
          arguments.push(ResolvedArgument {
            name: parameter,
            value: argument.clone(),
          });
        }
        continue;
      }

      match value {
        DescriptorValue::Construct(target) => {
          let instance = self.resolve(&target, &GivenArguments::new(), CreateFlags::empty(), stack)?;
          arguments.push(ResolvedArgument {
            name: parameter,
            value: Argument::Instance(instance),
          });
        }
        DescriptorValue::Literal(literal) => {
          if variadic {
            spread_into(&mut arguments, &parameter, Argument::Literal(literal));
          } else {
            arguments.push(ResolvedArgument {
              name: parameter,
              value: Argument::Literal(literal),
            });
          }
        }
        DescriptorValue::Undefined => {
          // An unresolved variadic tail contributes nothing.
          if variadic {
            continue;
          }
          return Err(Error::UnresolvedParameter {
            type_name: name.clone(),
            parameter,
          });
        }
      }
    }

    Ok(arguments)
  }
}

/// Spreads a value into a variadic tail: a literal array contributes its
/// elements, anything else becomes the sole tail element.
fn spread_into(arguments: &mut Vec<ResolvedArgument>, parameter: &str, argument: Argument) {
  match argument {
    Argument::Literal(Value::Array(items)) => {
      for item in items {
        arguments.push(ResolvedArgument {
          name: parameter.to_owned(),
          value: Argument::Literal(item),
        });
      }
    }
    other => arguments.push(ResolvedArgument {
      name: parameter.to_owned(),
      value: other,
    }),
  }
}
