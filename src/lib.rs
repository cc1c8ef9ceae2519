//! kapish, a minimal interactive shell
//!
//! Lines are split on spaces, checked against four builtins (`setenv`,
//! `unsetenv`, `cd`, `exit`) and otherwise run as external programs with
//! fork, exec and a blocking wait. `~/.kapishrc` is run once before the first
//! prompt.

pub mod config;
pub mod repl;
pub mod shell;
