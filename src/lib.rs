//! An interpreter for TSPMO, a keyword-driven toy language evaluated as a flat
//! stream of words in prefix order.

pub mod capture;
pub mod config;
pub mod control;
pub mod error;
pub mod evaluator;
pub mod function;
pub mod interpreter;
pub mod keyword;
pub mod lexer;
pub mod loader;
mod ops;
pub mod parser;
pub mod scope;
pub mod token;
pub mod value;

use std::{fs, path::Path};

pub use capture::SharedBuffer;
pub use config::Config;
pub use error::{LangError, LangResult, Location};
pub use interpreter::Interpreter;
pub use value::Value;

/// Runs the program at `path` against stdin/stdout.
pub fn run_file(path: &Path, config: &Config) -> LangResult<()> {
    if !path.exists() {
        return Err(LangError::runtime(format!(
            "Source file '{}' not found",
            path.display()
        )));
    }
    let source = fs::read_to_string(path)?;
    Interpreter::new(config.clone()).run_source(&source)
}
