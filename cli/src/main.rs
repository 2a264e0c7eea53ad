mod args;
mod ops;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::args::CliArgs;
use crate::output::Output;

fn main() {
  let args = CliArgs::parse();

  let default_level = if args.verbose { "debug" } else { "warn" };
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
    .with_writer(std::io::stderr)
    .init();

  let out = Output::new(args.verbose);
  let layout = weft::Layout::new(args.root.clone());

  let stdin = std::io::stdin();
  if let Err(error) = ops::run(&args, &layout, &mut stdin.lock(), &out) {
    out.error(&error.to_string());
    std::process::exit(1);
  }
}
