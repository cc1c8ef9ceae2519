pub mod builtins;
pub mod command;
pub mod dispatch;
pub mod env;
pub mod exec;
pub mod tokenize;

// Re-export commonly used types and functions
pub use command::{CommandKind, classify};
pub use dispatch::{Outcome, dispatch};
pub use env::ShellEnvironment;
pub use exec::{ChildExit, SpawnError, run_external};
pub use tokenize::{TokenizeError, tokenize};
