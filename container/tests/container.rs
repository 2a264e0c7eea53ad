use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde_json::json;
use weft::{
  Argument, ClassMetadata, ConstructorParameter, Container, CreateFlags, DescriptorValue, Error,
  GivenArguments, Instance, Introspector, ParameterDescriptor, Registry, ResolvedArguments,
  TypeDefinition, TypeName,
};

// --- Test Fixtures ---

struct TestA;

// Depends on TestA through its constructor.
struct TestB {
  a: Instance,
}

// Stands in for TestA when supplied by the caller.
struct TestC;

// Requires a scalar with no declared default.
struct TestD {
  scalar_value: String,
}

// Carries a declared default.
struct TestH {
  greeting: String,
}

// Direct and indirect cycles.
struct TestE;
struct TestF;

// Variadic tail after a defaulted scalar.
struct TestV {
  prefix: String,
  tags: Vec<String>,
}

fn registry() -> Arc<Registry> {
  let registry = Registry::new();

  registry.register(TypeDefinition::new("app::TestA", |_| Ok(TestA)));
  registry.register(TypeDefinition::new("app::TestC", |_| Ok(TestC)));
  registry.register(TypeDefinition::capability("app::Mailer"));

  registry.register(
    TypeDefinition::new("app::TestB", |args: ResolvedArguments| {
      Ok(TestB {
        a: args.instance("a")?.clone(),
      })
    })
    .with_constructor(vec![ConstructorParameter::typed("a", "app::TestA")]),
  );

  registry.register(
    TypeDefinition::new("app::TestD", |args: ResolvedArguments| {
      Ok(TestD {
        scalar_value: args.string("scalar_value")?,
      })
    })
    .with_constructor(vec![ConstructorParameter::scalar("scalar_value")]),
  );

  registry.register(
    TypeDefinition::new("app::TestH", |args: ResolvedArguments| {
      Ok(TestH {
        greeting: args.string("greeting")?,
      })
    })
    .with_constructor(vec![
      ConstructorParameter::scalar("greeting").with_default(json!("declared")),
    ]),
  );

  registry.register(
    TypeDefinition::new("app::TestE", |args: ResolvedArguments| {
      args.instance("e")?;
      Ok(TestE)
    })
    .with_constructor(vec![ConstructorParameter::typed("e", "app::TestE")]),
  );
  registry.register(
    TypeDefinition::new("app::TestF", |args: ResolvedArguments| {
      args.instance("e")?;
      Ok(TestF)
    })
    .with_constructor(vec![ConstructorParameter::typed("e", "app::TestE2")]),
  );
  // TestE2 -> TestF -> TestE2 closes the indirect loop.
  registry.register(
    TypeDefinition::new("app::TestE2", |args: ResolvedArguments| {
      args.instance("f")?;
      Ok(TestE)
    })
    .with_constructor(vec![ConstructorParameter::typed("f", "app::TestF")]),
  );

  registry.register(
    TypeDefinition::new("app::TestV", |args: ResolvedArguments| {
      let tags = args
        .variadic("tags")
        .into_iter()
        .map(|argument| {
          argument
            .as_literal()
            .and_then(|value| value.as_str())
            .map(str::to_owned)
        })
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| Error::Instantiation {
          type_name: args.type_name().clone(),
          reason: "tags must be strings".into(),
        })?;
      Ok(TestV {
        prefix: args.string("prefix")?,
        tags,
      })
    })
    .with_constructor(vec![
      ConstructorParameter::scalar("prefix").with_default(json!("p")),
      ConstructorParameter::scalar("tags").variadic(),
    ]),
  );

  Arc::new(registry)
}

fn container() -> Container {
  Container::new(registry())
}

/// Wraps the registry and counts parameter introspection calls.
struct CountingIntrospector {
  inner: Arc<Registry>,
  parameter_calls: AtomicUsize,
}

impl Introspector for CountingIntrospector {
  fn is_defined(&self, name: &TypeName) -> bool {
    self.inner.is_defined(name)
  }

  fn is_instantiable(&self, name: &TypeName) -> bool {
    self.inner.is_instantiable(name)
  }

  fn has_constructor(&self, name: &TypeName) -> bool {
    self.inner.has_constructor(name)
  }

  fn constructor_arity(&self, name: &TypeName) -> usize {
    self.inner.constructor_arity(name)
  }

  fn constructor_parameters(&self, name: &TypeName) -> Vec<ConstructorParameter> {
    self.parameter_calls.fetch_add(1, Ordering::SeqCst);
    self.inner.constructor_parameters(name)
  }

  fn instantiate(&self, name: &TypeName, arguments: ResolvedArguments) -> weft::Result<Instance> {
    self.inner.instantiate(name, arguments)
  }
}

// --- Resolution Tests ---

#[test]
fn zero_argument_create_skips_parameter_introspection() {
  // Arrange
  let counting = Arc::new(CountingIntrospector {
    inner: registry(),
    parameter_calls: AtomicUsize::new(0),
  });
  let container = Container::new(counting.clone());

  // Act
  let instance = container.create("app::TestA").unwrap();

  // Assert
  assert!(instance.downcast::<TestA>().is_some());
  assert_eq!(counting.parameter_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn unknown_type_fails() {
  let container = container();
  assert!(matches!(container.create("app::Missing"), Err(Error::UnknownType(_))));
}

#[test]
fn capability_without_rewrite_is_not_instantiable() {
  let container = container();
  assert!(matches!(container.create("app::Mailer"), Err(Error::NotInstantiable(_))));
}

#[test]
fn rewrite_resolves_a_capability_to_its_concrete_type() {
  // Arrange
  let container = container();
  container.rewrites().add("app::Mailer", "app::TestA");

  // Act
  let instance = container.create("app::Mailer").unwrap();

  // Assert: the instance is of the rewrite target.
  assert_eq!(instance.type_name(), &TypeName::new("app::TestA"));
  assert!(instance.downcast::<TestA>().is_some());
}

#[test]
fn rewrites_resolve_one_level_per_lookup() {
  // Arrange: a two-step chain.
  let container = container();
  container.rewrites().add("app::TestA", "app::TestC");
  container.rewrites().add("app::TestC", "app::TestD");

  // Act
  let instance = container.create("app::TestA").unwrap();

  // Assert: only the first level applies within one call.
  assert_eq!(instance.type_name(), &TypeName::new("app::TestC"));
}

#[test]
fn no_rewrite_flag_keeps_the_requested_type() {
  // Arrange
  let container = container();
  container.rewrites().add("app::TestA", "app::TestC");

  // Act
  let instance = container
    .create_with("app::TestA", GivenArguments::new(), CreateFlags::NO_REWRITE)
    .unwrap();

  // Assert
  assert_eq!(instance.type_name(), &TypeName::new("app::TestA"));
}

#[test]
fn autowires_a_constructor_dependency() {
  // Arrange
  let container = container();

  // Act: TestB depends on TestA with no caller arguments.
  let instance = container.create("app::TestB").unwrap();

  // Assert
  let b = instance.downcast::<TestB>().unwrap();
  assert_eq!(b.a.type_name(), &TypeName::new("app::TestA"));
  assert!(b.a.downcast::<TestA>().is_some());
}

#[test]
fn given_instance_is_used_identically() {
  // Arrange: an existing TestC stands in for the TestA dependency.
  let container = container();
  let existing = container.create("app::TestC").unwrap();

  // Act
  let instance = container
    .create_with(
      "app::TestB",
      GivenArguments::new().with("a", existing.clone()),
      CreateFlags::empty(),
    )
    .unwrap();

  // Assert: identity, not a copy.
  let b = instance.downcast::<TestB>().unwrap();
  assert!(b.a.ptr_eq(&existing));
  assert!(b.a.downcast::<TestC>().is_some());
}

#[test]
fn given_argument_beats_configured_and_declared_defaults() {
  // Arrange
  let container = container();
  container.default_values().add("app::TestH", "greeting", json!("configured"));

  // Act
  let instance = container
    .create_with(
      "app::TestH",
      GivenArguments::new().with("greeting", json!("given")),
      CreateFlags::empty(),
    )
    .unwrap();

  // Assert
  assert_eq!(instance.downcast::<TestH>().unwrap().greeting, "given");
}

#[test]
fn configured_default_beats_declared_default() {
  // Arrange
  let container = container();
  container.default_values().add("app::TestH", "greeting", json!("configured"));

  // Act
  let instance = container.create("app::TestH").unwrap();

  // Assert
  assert_eq!(instance.downcast::<TestH>().unwrap().greeting, "configured");
}

#[test]
fn declared_default_applies_without_a_configured_one() {
  let container = container();
  let instance = container.create("app::TestH").unwrap();
  assert_eq!(instance.downcast::<TestH>().unwrap().greeting, "declared");
}

#[test]
fn no_default_value_flag_suppresses_only_the_configured_tier() {
  // Arrange
  let container = container();
  container.default_values().add("app::TestH", "greeting", json!("configured"));

  // Act: the configured default is skipped, the declared one is not.
  let instance = container
    .create_with("app::TestH", GivenArguments::new(), CreateFlags::NO_DEFAULT_VALUE)
    .unwrap();

  // Assert
  assert_eq!(instance.downcast::<TestH>().unwrap().greeting, "declared");
}

#[test]
fn unresolved_scalar_fails_until_a_default_is_configured() {
  // Arrange
  let container = container();

  // Act / Assert: no value from any source.
  match container.create("app::TestD") {
    Err(Error::UnresolvedParameter { parameter, .. }) => assert_eq!(parameter, "scalar_value"),
    other => panic!("expected UnresolvedParameter, got {other:?}"),
  }

  // The failed call already cached the metadata; a freshly configured
  // default must still take effect on the next call.
  container.default_values().add("app::TestD", "scalar_value", json!("x"));

  let instance = container.create("app::TestD").unwrap();
  assert_eq!(instance.downcast::<TestD>().unwrap().scalar_value, "x");
}

#[test]
fn transient_creates_are_structurally_equivalent_but_distinct() {
  // Arrange
  let container = container();

  // Act
  let first = container
    .create_with("app::TestB", GivenArguments::new(), CreateFlags::NO_CACHE)
    .unwrap();
  let second = container
    .create_with("app::TestB", GivenArguments::new(), CreateFlags::NO_CACHE)
    .unwrap();

  // Assert: same shape, different objects, and the cache stayed untouched.
  assert!(!first.ptr_eq(&second));
  let first = first.downcast::<TestB>().unwrap();
  let second = second.downcast::<TestB>().unwrap();
  assert_eq!(first.a.type_name(), second.a.type_name());
  assert!(!first.a.ptr_eq(&second.a));
  assert!(container.cache().is_empty());
}

#[test]
fn singleton_flag_returns_the_identical_instance() {
  // Arrange
  let container = container();

  // Act
  let first = container
    .create_with("app::TestB", GivenArguments::new(), CreateFlags::SINGLETON)
    .unwrap();
  let second = container
    .create_with("app::TestB", GivenArguments::new(), CreateFlags::SINGLETON)
    .unwrap();

  // Assert
  assert!(first.ptr_eq(&second));
}

#[test]
fn singleton_registration_keys_on_the_rewritten_name() {
  // Arrange
  let container = container();
  container.rewrites().add("app::Mailer", "app::TestA");

  // Act: requesting the capability and the concrete type as singletons hits
  // the same registry slot.
  let via_capability = container
    .create_with("app::Mailer", GivenArguments::new(), CreateFlags::SINGLETON)
    .unwrap();
  let via_concrete = container
    .create_with("app::TestA", GivenArguments::new(), CreateFlags::SINGLETON)
    .unwrap();

  // Assert
  assert!(via_capability.ptr_eq(&via_concrete));
}

#[test]
fn recursive_resolution_does_not_inherit_flags() {
  // Arrange
  let container = container();

  // Act: a singleton TestB builds its TestA dependency with default flags.
  let b = container
    .create_with("app::TestB", GivenArguments::new(), CreateFlags::SINGLETON)
    .unwrap();
  let a = container
    .create_with("app::TestA", GivenArguments::new(), CreateFlags::SINGLETON)
    .unwrap();

  // Assert: the dependency was not registered as the TestA singleton.
  let b = b.downcast::<TestB>().unwrap();
  assert!(!b.a.ptr_eq(&a));
}

#[test]
fn direct_cycle_fails_and_leaves_no_stale_state() {
  // Arrange
  let container = container();

  // Act / Assert
  assert!(matches!(container.create("app::TestE"), Err(Error::CyclicDependency(_))));

  // The in-flight set must be clean afterwards: an unrelated create works,
  // and retrying reports the cycle again instead of a leaked entry.
  assert!(container.create("app::TestA").is_ok());
  assert!(matches!(container.create("app::TestE"), Err(Error::CyclicDependency(_))));
}

#[test]
fn indirect_cycle_fails() {
  let container = container();
  assert!(matches!(container.create("app::TestE2"), Err(Error::CyclicDependency(_))));
  assert!(container.create("app::TestB").is_ok());
}

#[test]
fn stale_cache_entry_wins_until_bypassed() {
  // Arrange: primed metadata maps TestB's dependency to TestC.
  let container = container();
  container.cache().store(
    &TypeName::new("app::TestB"),
    &ClassMetadata::new(vec![ParameterDescriptor::new(
      "a",
      false,
      DescriptorValue::Construct(TypeName::new("app::TestC")),
    )]),
  );

  // Act / Assert: the cached mapping is honored.
  let cached = container.create("app::TestB").unwrap();
  assert!(cached.downcast::<TestB>().unwrap().a.downcast::<TestC>().is_some());

  // NO_CACHE bypasses the stale entry and re-introspects.
  let fresh = container
    .create_with("app::TestB", GivenArguments::new(), CreateFlags::NO_CACHE)
    .unwrap();
  assert!(fresh.downcast::<TestB>().unwrap().a.downcast::<TestA>().is_some());

  // The bypass did not overwrite the cached entry.
  let cached_again = container.create("app::TestB").unwrap();
  assert!(cached_again.downcast::<TestB>().unwrap().a.downcast::<TestC>().is_some());
}

// --- Variadic Tests ---

#[test]
fn variadic_given_array_spreads_into_the_tail() {
  let container = container();
  let instance = container
    .create_with(
      "app::TestV",
      GivenArguments::new().with("tags", json!(["a", "b"])),
      CreateFlags::empty(),
    )
    .unwrap();

  let v = instance.downcast::<TestV>().unwrap();
  assert_eq!(v.prefix, "p");
  assert_eq!(v.tags, vec!["a", "b"]);
}

#[test]
fn variadic_given_single_value_becomes_the_sole_element() {
  let container = container();
  let instance = container
    .create_with(
      "app::TestV",
      GivenArguments::new().with("tags", json!("c")),
      CreateFlags::empty(),
    )
    .unwrap();

  assert_eq!(instance.downcast::<TestV>().unwrap().tags, vec!["c"]);
}

#[test]
fn unresolved_variadic_contributes_nothing() {
  // An empty variadic tail is not an UnresolvedParameter failure.
  let container = container();
  let instance = container.create("app::TestV").unwrap();

  let v = instance.downcast::<TestV>().unwrap();
  assert_eq!(v.prefix, "p");
  assert!(v.tags.is_empty());
}

#[test]
fn given_literal_overrides_a_declared_default() {
  let container = container();
  let instance = container
    .create_with(
      "app::TestV",
      GivenArguments::new()
        .with("prefix", Argument::Literal(json!("q")))
        .with("tags", json!([])),
      CreateFlags::empty(),
    )
    .unwrap();

  let v = instance.downcast::<TestV>().unwrap();
  assert_eq!(v.prefix, "q");
  assert!(v.tags.is_empty());
}
