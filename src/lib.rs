//! A console front-end that lets Python-like code call functions shell-style.
//!
//! Names registered as aliases may be invoked without parentheses or commas:
//! `pos x 10` is rewritten to `pos(x, 10)` before it reaches the interpreter, and a
//! vararg alias collects its arguments into a list, `scan a b` becoming `scan([a, b])`.
//! Everything else passes through byte for byte.
//!
//! The main entry points are [`Translator`], which performs the rewrite, and
//! [`Console`], which wraps it in a line-editing REPL with `:`-prefixed meta commands.
//! The lossless tokenizer behind both is exposed as [`tokens`], and
//! [`check_completeness`] decides when buffered console input is ready to run.

mod builtin;
pub mod command;
pub mod completeness;
pub mod config;
mod console;
pub mod engine;
mod io_adapters;
pub mod lexer;
pub mod logging;
pub mod script;
mod session;
pub mod translator;

pub use completeness::{Completeness, check_completeness};
pub use config::{Config, ConfigError};
pub use console::{Console, LineBuffer};
pub use engine::{EchoEngine, ScriptEngine};
pub use io_adapters::MemWriter;
pub use lexer::{Token, TokenKind, tokens};
pub use session::Session;
pub use translator::{AliasKind, Translator};
