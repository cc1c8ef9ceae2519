/// What a line asks the shell to do, decided by its first token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    SetEnvironmentVariable,
    UnsetEnvironmentVariable,
    ChangeDirectory,
    Exit,
    External,
}

/// Classify a command name
///
/// Only an exact, case-sensitive match of the whole token selects a builtin;
/// `cdx` or `exit2` run as external programs.
pub fn classify(name: &str) -> CommandKind {
    match name {
        "setenv" => CommandKind::SetEnvironmentVariable,
        "unsetenv" => CommandKind::UnsetEnvironmentVariable,
        "cd" => CommandKind::ChangeDirectory,
        "exit" => CommandKind::Exit,
        _ => CommandKind::External,
    }
}
