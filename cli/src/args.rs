//! Command-line argument surface for the `weft` binary.

use std::path::PathBuf;

use clap::Parser;

/// Configuration CLI for the weft autowiring container.
#[derive(Parser, Debug)]
#[command(name = "weft", version, about = "Manage the weft container's rewrites, default values, environment and caches.")]
pub struct CliArgs {
  /// Display additional information while performing an operation.
  #[arg(short = 'v', long)]
  pub verbose: bool,

  /// Add new rewrites; a JSON object of from/to type-name pairs.
  #[arg(long, value_name = "JSON")]
  pub add_rewrite: Option<String>,

  /// Add new default values; a JSON object of {type: {parameter: value}}.
  #[arg(long, value_name = "JSON")]
  pub add_default_value: Option<String>,

  /// Set the application's environment.
  #[arg(long, value_name = "NAME")]
  pub set_env: Option<String>,

  /// Clear cache files; a comma-separated list of cache names, or all of
  /// them when the list is omitted.
  #[arg(long, value_name = "NAMES", num_args = 0..=1, default_missing_value = "")]
  pub clear_cache: Option<String>,

  /// Clear config files; a comma-separated list of config names, or all of
  /// them when the list is omitted. This action cannot be undone.
  #[arg(long, value_name = "NAMES", num_args = 0..=1, default_missing_value = "")]
  pub clear_config: Option<String>,

  /// Root directory holding etc/ and var/cache/.
  #[arg(long, value_name = "DIR", default_value = ".")]
  pub root: PathBuf,
}

/// Splits a comma-separated name list; an empty operand means "all".
pub fn split_names(operand: &str) -> Option<Vec<String>> {
  if operand.trim().is_empty() {
    return None;
  }
  Some(
    operand
      .split(',')
      .map(str::trim)
      .filter(|name| !name.is_empty())
      .map(str::to_owned)
      .collect(),
  )
}
