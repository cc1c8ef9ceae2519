use std::path::PathBuf;

/// Maximum number of tokens accepted on a single line
pub const MAX_TOKENS: usize = 64;

/// Maximum length of a single input line in bytes, terminator included
pub const MAX_LINE_BYTES: usize = 1024;

/// Name of the startup resource file, relative to the user's home directory
pub const RC_FILE_NAME: &str = ".kapishrc";

/// Prompt printed before every interactive read
pub const DEFAULT_PROMPT: &str = "? ";

/// Session configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Startup script run once before the interactive loop; `None` skips it
    pub rc_path: Option<PathBuf>,
    pub prompt: String,
}

impl Config {
    /// Build the configuration for the current login user
    ///
    /// The resource file lives in the home directory reported by the `home` crate
    /// (`$HOME`, falling back to the user database). Without a home directory
    /// there is no startup file.
    pub fn from_user() -> Self {
        let rc_path = match home::home_dir() {
            Some(path) if !path.as_os_str().is_empty() => Some(path.join(RC_FILE_NAME)),
            _ => None,
        };
        Self {
            rc_path,
            prompt: DEFAULT_PROMPT.to_string(),
        }
    }

    /// Configuration with no startup file, mostly useful for embedding and tests
    pub fn without_rc() -> Self {
        Self {
            rc_path: None,
            prompt: DEFAULT_PROMPT.to_string(),
        }
    }
}
