//! Compile the automaton report written by `bison -v` into compact,
//! statically initialized parse tables.
//!
//! ```no_run
//! use bisontab::{codegen::{Codegen, Language}, Config};
//!
//! # fn main() -> anyhow::Result<()> {
//! let automaton = Config::new().compile_file("parser.output")?;
//! let codegen = Codegen::new(&automaton, Language::Cpp)?;
//! println!("{}", codegen);
//! # Ok(())
//! # }
//! ```

pub mod automaton;
pub mod build;
pub mod codegen;
pub mod grammar;
pub mod pattern;
pub mod report;
pub mod symbol;
pub mod table;
pub mod types;
pub mod util;

pub use crate::automaton::{Automaton, CompileError, Config, Diagnostic, Strictness};
