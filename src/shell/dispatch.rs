use std::io::{self, Write};

use super::builtins::get_builtin;
use super::command::{CommandKind, classify};
use super::env::ShellEnvironment;
use super::exec::run_external;

/// What the session should do after a command has run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Carry on reading commands
    Continue,
    /// A clean exit was requested
    Terminate,
    /// An external command could not be started
    Fault,
}

/// Run one tokenized command against the session environment
///
/// Builtins act on `env` directly and print usage messages to `out`. Anything
/// else runs as an external program that inherits the real standard streams;
/// its exit status is discarded. Failing to start it prints a diagnostic on
/// standard error and yields [`Outcome::Fault`].
///
/// An error is returned only when writing to `out` fails.
pub fn dispatch(
    tokens: &[String],
    env: &mut ShellEnvironment,
    out: &mut dyn Write,
) -> io::Result<Outcome> {
    let Some((name, args)) = tokens.split_first() else {
        return Ok(Outcome::Continue);
    };

    let kind = classify(name);
    log::debug!("dispatching {:?} as {:?}", name, kind);

    if let Some(builtin) = get_builtin(kind) {
        return builtin(args, env, out);
    }
    debug_assert_eq!(kind, CommandKind::External);

    // Anything we printed must land before the child's output
    out.flush()?;

    match run_external(tokens, env) {
        Ok(exit) => {
            log::debug!("{} finished: {:?}", name, exit);
            Ok(Outcome::Continue)
        }
        Err(e) => {
            eprintln!("kapish: {}", e);
            Ok(Outcome::Fault)
        }
    }
}
