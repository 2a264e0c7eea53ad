//! Error types for the weft container.

use std::path::PathBuf;

use crate::value::TypeName;

/// All errors the container and its collaborators can produce.
///
/// The first four variants are the resolution taxonomy: they are terminal for
/// the `create` call that raised them and are never retried internally. The
/// remaining variants cover instantiation failures and the persistence and
/// configuration surface.
#[derive(Debug, thiserror::Error)]
pub enum Error {
  /// The requested type name is not known to the introspector.
  #[error("type {0} does not exist")]
  UnknownType(TypeName),

  /// The type exists but cannot be constructed (a capability name with no
  /// factory, typically one that only exists to be rewritten).
  #[error("type {0} is not instantiable")]
  NotInstantiable(TypeName),

  /// The type is already being constructed on the current resolution chain.
  /// One or more types require each other, which would recurse forever.
  #[error("type {0} is already being constructed; the constructor graph contains a cycle")]
  CyclicDependency(TypeName),

  /// A constructor parameter could not be autowired, had no default value
  /// from any source and was not given as an argument.
  #[error("parameter {parameter} of {type_name} cannot be autowired, has no default value and was not given as an argument")]
  UnresolvedParameter {
    type_name: TypeName,
    parameter: String,
  },

  /// A factory rejected its resolved arguments or failed while constructing.
  #[error("failed to instantiate {type_name}: {reason}")]
  Instantiation {
    type_name: TypeName,
    reason: String,
  },

  #[error(transparent)]
  Io(#[from] std::io::Error),

  /// A persisted file exists but is not usable as JSON data.
  #[error("file {path}: {reason}", path = .path.display())]
  Json { path: PathBuf, reason: String },

  /// `set-env` was asked for an environment the environments config does not
  /// list.
  #[error("requested environment {requested} is not available; available environments: {available}")]
  UnknownEnvironment {
    requested: String,
    available: String,
  },

  #[error("unknown cache type requested: {0}")]
  UnknownCacheType(String),

  #[error("unknown config type requested: {0}")]
  UnknownConfigType(String),

  /// A CLI payload that must be a JSON object was something else.
  #[error("invalid operand: {0}")]
  InvalidOperand(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
