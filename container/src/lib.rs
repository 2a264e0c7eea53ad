//! # Weft
//!
//! An autowiring object-construction engine: given a requested type name,
//! weft builds a fully-initialized instance by recursively resolving and
//! instantiating its constructor dependencies, so application code never
//! wires object graphs by hand.
//!
//! ## Core Concepts
//!
//! - **Registry**: the shipped [`Introspector`] — a thread-safe map of
//!   [`TypeDefinition`]s carrying each type's constructor shape and a factory
//!   closure.
//! - **Resolution**: [`Container::create`] validates the name, applies one
//!   configured rewrite level, checks the singleton registry, guards against
//!   cycles with a per-call in-flight set, then resolves each constructor
//!   parameter (caller argument, rewrite, configured default, declared
//!   default, in that precedence) and recurses for constructible parameters.
//! - **Metadata cache**: processed parameter descriptors are cached per type
//!   name, persisted as JSON and flushed when the cache is dropped.
//! - **Singletons**: the `SINGLETON` flag caches the instance per type name
//!   for the remaining process lifetime.
//!
//! ## Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use weft::{ConstructorParameter, Container, Registry, ResolvedArguments, TypeDefinition};
//!
//! struct Engine;
//!
//! struct Car {
//!   engine: Arc<Engine>,
//! }
//!
//! let registry = Registry::new();
//! registry.register(TypeDefinition::new("app::Engine", |_| Ok(Engine)));
//! registry.register(
//!   TypeDefinition::new("app::Car", |args: ResolvedArguments| {
//!     Ok(Car {
//!       engine: args.instance_of::<Engine>("engine")?,
//!     })
//!   })
//!   .with_constructor(vec![ConstructorParameter::typed("engine", "app::Engine")]),
//! );
//!
//! let container = Container::new(Arc::new(registry));
//! let car = container.create("app::Car").unwrap();
//! let car = car.downcast::<Car>().unwrap();
//! assert!(Arc::strong_count(&car.engine) >= 1);
//! ```

pub mod cache;
pub mod config;
pub mod container;
pub mod error;
pub mod introspect;
pub mod loader;
pub mod metadata;
pub mod registry;
pub mod value;

pub use cache::ClassCache;
pub use config::{Application, Caches, Configs, DefaultValues, Environments, Rewrites};
pub use container::{Container, CreateFlags};
pub use error::{Error, Result};
pub use introspect::{ConstructorParameter, Introspector, ResolvedArgument, ResolvedArguments};
pub use loader::{FileLoader, JsonFile, Layout};
pub use metadata::{ClassMetadata, DescriptorValue, ParameterDescriptor};
pub use registry::{Registry, TypeDefinition};
pub use value::{Argument, GivenArguments, Instance, TypeName};
