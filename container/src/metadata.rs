//! The processed per-type constructor model. This is exactly what the
//! metadata cache persists, so everything here round-trips through serde.

use serde::{Deserialize, Serialize};

use crate::value::TypeName;

/// The resolved value slot of one parameter, after rewrite and default-value
/// processing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DescriptorValue {
  /// The parameter is satisfied by constructing this type.
  Construct(TypeName),
  /// The parameter is satisfied by this literal.
  Literal(serde_json::Value),
  /// No value from any source yet. Must be satisfied by a configured default
  /// or a caller argument before instantiation, else the build fails
  /// (variadic slots excepted).
  Undefined,
}

impl DescriptorValue {
  pub fn is_undefined(&self) -> bool {
    matches!(self, DescriptorValue::Undefined)
  }
}

/// One processed constructor parameter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParameterDescriptor {
  pub name: String,
  pub variadic: bool,
  pub value: DescriptorValue,
}

impl ParameterDescriptor {
  pub fn new(name: impl Into<String>, variadic: bool, value: DescriptorValue) -> Self {
    Self {
      name: name.into(),
      variadic,
      value,
    }
  }
}

/// The ordered parameter descriptors for one type's constructor, in
/// declaration order. Computed once per type per process (or restored from
/// cache) and immutable once computed.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassMetadata {
  parameters: Vec<ParameterDescriptor>,
}

impl ClassMetadata {
  pub fn new(parameters: Vec<ParameterDescriptor>) -> Self {
    Self { parameters }
  }

  pub fn iter(&self) -> impl Iterator<Item = &ParameterDescriptor> {
    self.parameters.iter()
  }

  pub fn len(&self) -> usize {
    self.parameters.len()
  }

  pub fn is_empty(&self) -> bool {
    self.parameters.is_empty()
  }

  /// Replaces descriptors through `f`, keeping order.
  pub fn map(self, f: impl FnMut(ParameterDescriptor) -> ParameterDescriptor) -> Self {
    Self {
      parameters: self.parameters.into_iter().map(f).collect(),
    }
  }
}

impl IntoIterator for ClassMetadata {
  type Item = ParameterDescriptor;
  type IntoIter = std::vec::IntoIter<ParameterDescriptor>;

  fn into_iter(self) -> Self::IntoIter {
    self.parameters.into_iter()
  }
}
