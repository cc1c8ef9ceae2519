use thiserror::Error;

/// Represents errors that can occur during program path resolution
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProgramResolutionError {
    /// Command not found in PATH
    #[error("{0}: command not found")]
    NotFound(String),
    /// File doesn't exist (for paths with '/')
    #[error("{0}: No such file or directory")]
    NoSuchFile(String),
    /// File exists but is not executable
    #[error("{0}: Permission denied")]
    PermissionDenied(String),
    /// Name can't be handed to the kernel
    #[error("{0}: invalid program name")]
    InvalidName(String),
}

/// Why an external command could not be started
#[derive(Error, Debug)]
pub enum SpawnError {
    #[error(transparent)]
    Resolution(#[from] ProgramResolutionError),
    #[error("{program}: argument contains a NUL byte")]
    NulInArgument { program: String },
    #[error("error forking: {0}")]
    Fork(#[source] nix::Error),
    #[error("error creating new process: {program}: {source}")]
    Exec {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("error waiting for {program}: {source}")]
    Wait {
        program: String,
        #[source]
        source: nix::Error,
    },
    #[error("error setting up exec status pipe: {0}")]
    StatusPipe(#[source] std::io::Error),
}

/// How a reaped child ended. Logged, never acted upon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildExit {
    Exited(i32),
    Signaled(i32),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolution_messages() {
        assert_eq!(
            ProgramResolutionError::NotFound("frob".into()).to_string(),
            "frob: command not found"
        );
        assert_eq!(
            ProgramResolutionError::NoSuchFile("./frob".into()).to_string(),
            "./frob: No such file or directory"
        );
    }

    #[test]
    fn resolution_errors_pass_through_spawn_errors() {
        let err = SpawnError::from(ProgramResolutionError::PermissionDenied("x".into()));
        assert_eq!(err.to_string(), "x: Permission denied");
    }
}
