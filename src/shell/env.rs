use std::collections::HashMap;
use std::ffi::{CString, OsStr, OsString};
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};

use nix::unistd::getcwd;

/// The session's environment variables and working directory
///
/// Builtins mutate this in place. External commands get a snapshot of it when
/// they are spawned, so later changes never reach a child that is already running.
/// Names and values are kept as raw OS strings so inherited variables reach
/// children byte for byte.
#[derive(Debug, Clone, PartialEq)]
pub struct ShellEnvironment {
    env_vars: HashMap<OsString, OsString>,
    cwd: PathBuf,
}

impl ShellEnvironment {
    /// Create an empty environment rooted at `cwd`
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self {
            env_vars: HashMap::new(),
            cwd: cwd.into(),
        }
    }

    /// Create an environment initialized from the host process
    pub fn from_parent() -> Self {
        let env_vars = std::env::vars_os().collect();

        // Fall back to $PWD, then to the root, if the cwd has been removed under us
        let cwd = getcwd()
            .ok()
            .or_else(|| std::env::var_os("PWD").map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("/"));

        Self { env_vars, cwd }
    }

    /// Get an environment variable value, if it is valid UTF-8
    pub fn get(&self, key: &str) -> Option<&str> {
        self.get_os(key)?.to_str()
    }

    /// Get an environment variable value as stored
    pub fn get_os(&self, key: impl AsRef<OsStr>) -> Option<&OsStr> {
        self.env_vars.get(key.as_ref()).map(OsString::as_os_str)
    }

    /// Set an environment variable, replacing any previous value
    pub fn set(&mut self, key: impl Into<OsString>, value: impl Into<OsString>) {
        self.env_vars.insert(key.into(), value.into());
    }

    /// Remove an environment variable
    pub fn unset(&mut self, key: impl AsRef<OsStr>) -> Option<OsString> {
        self.env_vars.remove(key.as_ref())
    }

    /// Check if a key exists
    pub fn contains_key(&self, key: impl AsRef<OsStr>) -> bool {
        self.env_vars.contains_key(key.as_ref())
    }

    /// Get the number of environment variables
    pub fn len(&self) -> usize {
        self.env_vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.env_vars.is_empty()
    }

    /// Current working directory of the session
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub(crate) fn set_cwd(&mut self, cwd: PathBuf) {
        self.cwd = cwd;
    }

    /// Convert environment to Vec<CString> in "KEY=VALUE" format for execve
    ///
    /// Entries containing a NUL byte cannot be passed to a child and are dropped.
    pub fn to_envp(&self) -> Vec<CString> {
        self.env_vars
            .iter()
            .filter_map(|(key, value)| {
                let mut entry = Vec::with_capacity(key.len() + value.len() + 1);
                entry.extend_from_slice(key.as_bytes());
                entry.push(b'=');
                entry.extend_from_slice(value.as_bytes());
                CString::new(entry).ok()
            })
            .collect()
    }

    /// Working directory as a C string for `chdir` in a freshly forked child
    pub(crate) fn cwd_cstring(&self) -> Option<CString> {
        CString::new(self.cwd.as_os_str().as_bytes()).ok()
    }
}
