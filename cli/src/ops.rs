//! The CLI operations. Exactly one operation runs per invocation, in the
//! fixed precedence order of [`run`]; `--verbose` is a modifier, not an
//! operation.

use std::io::BufRead;

use serde_json::{json, Map, Value};
use tracing::debug;

use weft::{
  Application, Caches, Configs, DefaultValues, Environments, Error, FileLoader, JsonFile, Layout,
  Result, Rewrites,
};

use crate::args::{split_names, CliArgs};
use crate::output::Output;

pub fn run(args: &CliArgs, layout: &Layout, input: &mut dyn BufRead, out: &Output) -> Result<()> {
  if let Some(payload) = &args.add_rewrite {
    return add_rewrite(payload, layout, out);
  }
  if let Some(payload) = &args.add_default_value {
    return add_default_value(payload, layout, out);
  }
  if let Some(env) = &args.set_env {
    return set_env(env, layout, out);
  }
  if let Some(operand) = &args.clear_cache {
    return clear_cache(operand, layout, input, out);
  }
  if let Some(operand) = &args.clear_config {
    return clear_config(operand, layout, input, out);
  }

  out.warning("Invalid or no operation specified. Use --help for possible operations.");
  Ok(())
}

fn parse_object(payload: &str, what: &str) -> Result<Map<String, Value>> {
  match serde_json::from_str(payload) {
    Ok(Value::Object(map)) if !map.is_empty() => Ok(map),
    _ => Err(Error::InvalidOperand(format!(
      "{what} must be given as a non-empty JSON object, got: {payload}"
    ))),
  }
}

fn add_rewrite(payload: &str, layout: &Layout, out: &Output) -> Result<()> {
  let incoming = parse_object(payload, "rewrites")?;
  debug!(count = incoming.len(), "adding rewrites");

  let rewrites = Rewrites::open(layout)?;
  for (from, to) in &incoming {
    out.notice(&format!("Rewriting type: {from} to: {to}"));
  }
  rewrites.merge(incoming)?;
  rewrites.save()
}

fn add_default_value(payload: &str, layout: &Layout, out: &Output) -> Result<()> {
  let incoming = parse_object(payload, "default values")?;

  let defaults = DefaultValues::open(layout)?;
  for (type_name, parameters) in incoming {
    let Value::Object(parameters) = parameters else {
      return Err(Error::InvalidOperand(format!(
        "default values for {type_name} must be a JSON object of parameter/value pairs"
      )));
    };
    out.notice(&format!("Adding default values for type: {type_name}"));
    defaults.merge_for(type_name.as_str(), parameters)?;
  }
  defaults.save()
}

fn set_env(env: &str, layout: &Layout, out: &Output) -> Result<()> {
  let environments = Environments::open(layout)?;
  let application = Application::open(layout)?;

  application.set_env(env, &environments)?;
  application.save()?;
  out.notice(&format!("Environment set to: {env}"));
  Ok(())
}

fn clear_cache(operand: &str, layout: &Layout, input: &mut dyn BufRead, out: &Output) -> Result<()> {
  let caches = Caches::open(layout)?;
  let names = match split_names(operand) {
    Some(names) => names,
    None => {
      out.notice("Clearing all caches.");
      caches.names()
    }
  };

  // Validate every name before touching anything.
  let mut targets = Vec::with_capacity(names.len());
  for name in names {
    let file_name = caches.file_name(&name)?;
    targets.push((name, file_name));
  }

  if !confirmed(
    "Are you sure you wish to clear the cache? This action cannot be undone! [yN]",
    input,
    out,
  )? {
    out.error("ABORTING!");
    return Ok(());
  }

  for (name, file_name) in targets {
    JsonFile::compact().save(&layout.cache_file(&file_name), &json!({}))?;
    out.notice(&format!("Cache type cleared: {name}"));
  }
  Ok(())
}

fn clear_config(operand: &str, layout: &Layout, input: &mut dyn BufRead, out: &Output) -> Result<()> {
  let configs = Configs::open(layout)?;
  let names = match split_names(operand) {
    Some(names) => names,
    None => {
      out.notice("Clearing all configs.");
      configs.names()
    }
  };

  let mut targets = Vec::with_capacity(names.len());
  for name in names {
    let file_name = configs.file_name(&name)?;
    targets.push((name, file_name));
  }

  if !confirmed(
    "Are you sure you wish to clear the config? This action cannot be undone! [yN]",
    input,
    out,
  )? {
    out.error("ABORTING!");
    return Ok(());
  }

  for (name, file_name) in targets {
    JsonFile::pretty().save(&layout.config_file(&file_name), &json!({}))?;
    out.notice(&format!("Config type cleared: {name}"));
  }
  Ok(())
}

fn confirmed(prompt: &str, input: &mut dyn BufRead, out: &Output) -> Result<bool> {
  out.warning(prompt);
  let mut line = String::new();
  input.read_line(&mut line)?;
  Ok(line.trim().eq_ignore_ascii_case("y"))
}

#[cfg(test)]
mod tests {
  use super::*;
  use clap::Parser;
  use std::io::Cursor;

  fn layout() -> (tempfile::TempDir, Layout) {
    let dir = tempfile::tempdir().unwrap();
    let layout = Layout::new(dir.path());
    (dir, layout)
  }

  #[test]
  fn add_rewrite_persists_the_pair() {
    let (_dir, layout) = layout();
    let out = Output::new(false);

    add_rewrite(r#"{"app::Mailer": "app::Smtp"}"#, &layout, &out).unwrap();

    let rewrites = Rewrites::open(&layout).unwrap();
    assert_eq!(
      rewrites.lookup(&weft::TypeName::new("app::Mailer")),
      Some(weft::TypeName::new("app::Smtp"))
    );
  }

  #[test]
  fn add_rewrite_rejects_non_object_payloads() {
    let (_dir, layout) = layout();
    let out = Output::new(false);

    assert!(matches!(
      add_rewrite("not json", &layout, &out),
      Err(Error::InvalidOperand(_))
    ));
    assert!(matches!(
      add_rewrite(r#"["a"]"#, &layout, &out),
      Err(Error::InvalidOperand(_))
    ));
  }

  #[test]
  fn add_default_value_persists_per_type() {
    let (_dir, layout) = layout();
    let out = Output::new(false);

    add_default_value(r#"{"app::TestD": {"scalar_value": "x"}}"#, &layout, &out).unwrap();

    let defaults = DefaultValues::open(&layout).unwrap();
    assert_eq!(
      defaults.lookup(&weft::TypeName::new("app::TestD"), "scalar_value"),
      Some(json!("x"))
    );
  }

  #[test]
  fn set_env_rejects_unlisted_environments() {
    let (_dir, layout) = layout();
    let out = Output::new(false);

    let environments = Environments::open(&layout).unwrap();
    environments.add("dev");
    environments.save().unwrap();

    assert!(matches!(
      set_env("prod", &layout, &out),
      Err(Error::UnknownEnvironment { .. })
    ));
    set_env("dev", &layout, &out).unwrap();

    let application = Application::open(&layout).unwrap();
    assert_eq!(application.env(), Some("dev".to_owned()));
  }

  #[test]
  fn declined_confirmation_changes_nothing() {
    let (_dir, layout) = layout();
    let out = Output::new(false);

    let caches = Caches::open(&layout).unwrap();
    caches.add("classes", "classes.json");
    caches.save().unwrap();

    let cache_path = layout.cache_file("classes.json");
    JsonFile::compact().save(&cache_path, &json!({"app::TestD": []})).unwrap();

    let mut input = Cursor::new(b"n\n".to_vec());
    clear_cache("", &layout, &mut input, &out).unwrap();

    // The cache file still holds its entry.
    let contents = JsonFile::compact().load(&cache_path).unwrap();
    assert_eq!(contents, json!({"app::TestD": []}));
  }

  #[test]
  fn confirmed_clear_cache_empties_the_files() {
    let (_dir, layout) = layout();
    let out = Output::new(false);

    let caches = Caches::open(&layout).unwrap();
    caches.add("classes", "classes.json");
    caches.save().unwrap();

    let cache_path = layout.cache_file("classes.json");
    JsonFile::compact().save(&cache_path, &json!({"app::TestD": []})).unwrap();

    let mut input = Cursor::new(b"y\n".to_vec());
    clear_cache("classes", &layout, &mut input, &out).unwrap();

    let contents = JsonFile::compact().load(&cache_path).unwrap();
    assert_eq!(contents, json!({}));
  }

  #[test]
  fn unknown_cache_name_fails_before_the_prompt() {
    let (_dir, layout) = layout();
    let out = Output::new(false);

    let caches = Caches::open(&layout).unwrap();
    caches.add("classes", "classes.json");
    caches.save().unwrap();

    // No input is consumed; validation fails first.
    let mut input = Cursor::new(Vec::new());
    assert!(matches!(
      clear_cache("sessions", &layout, &mut input, &out),
      Err(Error::UnknownCacheType(_))
    ));
  }

  #[test]
  fn confirmed_clear_config_resets_to_an_empty_object() {
    let (_dir, layout) = layout();
    let out = Output::new(false);

    let configs = Configs::open(&layout).unwrap();
    configs.add("rewrites", "rewrites.json");
    configs.save().unwrap();

    let rewrites = Rewrites::open(&layout).unwrap();
    rewrites.add("app::A", "app::B");
    rewrites.save().unwrap();

    let mut input = Cursor::new(b"Y\n".to_vec());
    clear_config("rewrites", &layout, &mut input, &out).unwrap();

    let reopened = Rewrites::open(&layout).unwrap();
    assert!(reopened.is_empty());
  }

  #[test]
  fn no_operation_is_not_an_error() {
    let (_dir, layout) = layout();
    let out = Output::new(false);
    let args = crate::args::CliArgs::parse_from(["weft"]);

    let mut input = Cursor::new(Vec::new());
    run(&args, &layout, &mut input, &out).unwrap();
  }
}
