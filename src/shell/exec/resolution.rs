use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use super::types::ProgramResolutionError;
use crate::shell::env::ShellEnvironment;

/// Used when the session has no PATH at all
const DEFAULT_PATH: &[&str] = &["/usr/local/bin", "/usr/bin", "/bin"];

/// Resolve a program name to its full path following POSIX command search rules
///
/// POSIX rules:
/// 1. If program contains '/', use it as a literal path, relative to the session cwd
/// 2. Otherwise, search the session's PATH directories in order
/// 3. Return the first executable file found
pub fn resolve_program_path(
    program: &str,
    env: &ShellEnvironment,
) -> Result<PathBuf, ProgramResolutionError> {
    if program.is_empty() || program.contains('\0') {
        return Err(ProgramResolutionError::InvalidName(program.to_string()));
    }

    // Rule 1: If program contains '/', treat as literal path
    if program.contains('/') {
        let path = env.cwd().join(program);

        if !path.exists() {
            return Err(ProgramResolutionError::NoSuchFile(program.to_string()));
        }
        if !is_executable_file(&path) {
            return Err(ProgramResolutionError::PermissionDenied(program.to_string()));
        }
        return Ok(path);
    }

    // Rule 2: Search PATH
    let path_dirs: Vec<PathBuf> = match env.get_os("PATH") {
        Some(value) => std::env::split_paths(value).collect(),
        None => DEFAULT_PATH.iter().map(PathBuf::from).collect(),
    };

    for dir in &path_dirs {
        // An empty PATH entry means the current directory
        let dir = if dir.as_os_str().is_empty() {
            env.cwd().to_path_buf()
        } else {
            env.cwd().join(dir)
        };

        let candidate = dir.join(program);
        if is_executable_file(&candidate) {
            return Ok(candidate);
        }
    }

    Err(ProgramResolutionError::NotFound(program.to_string()))
}

/// Regular file with any execute bit set
fn is_executable_file(path: &Path) -> bool {
    match std::fs::metadata(path) {
        Ok(metadata) => metadata.is_file() && metadata.permissions().mode() & 0o111 != 0,
        Err(_) => false,
    }
}
