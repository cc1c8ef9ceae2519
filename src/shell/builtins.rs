use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use nix::unistd::{AccessFlags, access};
use thiserror::Error;

use super::command::CommandKind;
use super::dispatch::Outcome;
use super::env::ShellEnvironment;

/// Signature shared by all builtins: arguments (command name excluded), the
/// session environment, and the stream usage messages go to
pub type BuiltinFn = fn(&[String], &mut ShellEnvironment, &mut dyn Write) -> io::Result<Outcome>;

/// Get the builtin implementing a command kind
///
/// Returns None for external commands.
pub fn get_builtin(kind: CommandKind) -> Option<BuiltinFn> {
    match kind {
        CommandKind::SetEnvironmentVariable => Some(setenv),
        CommandKind::UnsetEnvironmentVariable => Some(unsetenv),
        CommandKind::ChangeDirectory => Some(cd),
        CommandKind::Exit => Some(exit_builtin),
        CommandKind::External => None,
    }
}

/// Set an environment variable, overwriting any previous value
///
/// Args:
///   - [name, value]
pub fn setenv(
    args: &[String],
    env: &mut ShellEnvironment,
    out: &mut dyn Write,
) -> io::Result<Outcome> {
    let [name, value] = args else {
        writeln!(out, "Expected usage: setenv <variable> <value>")?;
        return Ok(Outcome::Continue);
    };
    env.set(name.as_str(), value.as_str());
    Ok(Outcome::Continue)
}

/// Remove an environment variable; removing an unset one is a no-op
///
/// Args:
///   - [name]
pub fn unsetenv(
    args: &[String],
    env: &mut ShellEnvironment,
    out: &mut dyn Write,
) -> io::Result<Outcome> {
    let [name] = args else {
        writeln!(out, "Expected usage: unsetenv <variable>")?;
        return Ok(Outcome::Continue);
    };
    env.unset(name);
    Ok(Outcome::Continue)
}

#[derive(Error, Debug)]
pub enum CdError {
    #[error("{path}: {source}")]
    Inaccessible {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("{0}: Not a directory")]
    NotADirectory(String),
    #[error("{0}: Permission denied")]
    NotSearchable(String),
}

/// Change the session working directory
///
/// Args:
///   - [path] -> absolute, or relative to the current session directory
///
/// A failed change leaves the directory as it was and the session carries on.
pub fn cd(
    args: &[String],
    env: &mut ShellEnvironment,
    out: &mut dyn Write,
) -> io::Result<Outcome> {
    let [path] = args else {
        writeln!(out, "Expected usage: cd <path>")?;
        return Ok(Outcome::Continue);
    };
    match change_directory(env, path) {
        Ok(dir) => log::debug!("cd: now in {}", dir.display()),
        Err(e) => log::warn!("cd: {}", e),
    }
    Ok(Outcome::Continue)
}

/// Resolve `path`, check it can be entered, then make it the session cwd and `PWD`
pub fn change_directory(env: &mut ShellEnvironment, path: &str) -> Result<PathBuf, CdError> {
    let target = fs::canonicalize(env.cwd().join(path)).map_err(|source| CdError::Inaccessible {
        path: path.to_string(),
        source,
    })?;

    if !target.is_dir() {
        return Err(CdError::NotADirectory(path.to_string()));
    }
    if access(&target, AccessFlags::X_OK).is_err() {
        return Err(CdError::NotSearchable(path.to_string()));
    }

    env.set("PWD", target.as_os_str());
    env.set_cwd(target.clone());
    Ok(target)
}

/// End the session; trailing arguments are ignored
pub fn exit_builtin(
    _args: &[String],
    _env: &mut ShellEnvironment,
    _out: &mut dyn Write,
) -> io::Result<Outcome> {
    Ok(Outcome::Terminate)
}
