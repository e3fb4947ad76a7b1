//! A small line-oriented shell with output redirection.
//!
//! Each input line goes through two stages before anything runs. First the
//! [`lexer`] splits it into tokens (bare words, quoted strings, `>`). Then the
//! [`parser`] builds a [`CommandLine`](parser::CommandLine) from them: one
//! command with its arguments plus any number of `N>file` redirections. Both
//! stages are built on the generic lookahead adapter in [`cursor`].
//!
//! The [`Interpreter`] then dispatches the command to one of the fixed
//! builtins (`exit`, `echo`, `pwd`, `cd`, `type`) or to an executable found
//! on `PATH`, and writes its output to stdout or to the redirection target.

pub mod builtin;
pub mod command;
pub mod cursor;
pub mod env;
mod external;
mod interpreter;
pub mod lexer;
pub mod parser;

pub use env::Environment;
/// Just a convenient re-export of the interactive command runner.
///
/// See [`Interpreter`] for the high-level API.
pub use interpreter::Interpreter;
