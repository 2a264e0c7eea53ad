//! Leveled, colored terminal output. Notices print only under `--verbose`;
//! warnings and errors always print.

use colored::Colorize;

#[derive(Clone, Copy, Debug)]
pub struct Output {
  verbose: bool,
}

impl Output {
  pub fn new(verbose: bool) -> Self {
    Self { verbose }
  }

  pub fn notice(&self, text: &str) {
    if self.verbose {
      println!("{}", text.green());
    }
  }

  pub fn warning(&self, text: &str) {
    println!("{}", text.yellow());
  }

  pub fn error(&self, text: &str) {
    eprintln!("{}", text.red());
  }
}
