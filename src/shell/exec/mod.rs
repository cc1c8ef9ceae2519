mod resolution;
mod types;

use nix::errno::Errno;
use nix::fcntl::OFlag;
use nix::libc;
use nix::sys::wait::{WaitStatus, waitpid};
use nix::unistd::{ForkResult, Pid, chdir, fork, pipe2};
use std::ffi::{CStr, CString};
use std::fs::File;
use std::io::{Read, Write};
use std::os::fd::OwnedFd;
use std::os::unix::ffi::OsStrExt;
use std::ptr;

pub use resolution::resolve_program_path;
pub use types::{ChildExit, ProgramResolutionError, SpawnError};

use crate::shell::env::ShellEnvironment;

/// Exit code of a child whose exec failed
const EXEC_FAILED_EXIT: i32 = 127;

/// Runs files the kernel refuses to exec (ENOEXEC), the way `execvp` does
const FALLBACK_SHELL: &CStr = c"/bin/sh";

/// Owned C strings plus the NULL-terminated pointer array `execve` takes
struct ExecVector {
    _strings: Vec<CString>,
    ptrs: Vec<*const libc::c_char>,
}

impl ExecVector {
    fn new(strings: Vec<CString>) -> Self {
        let ptrs = strings
            .iter()
            .map(|s| s.as_ptr())
            .chain(std::iter::once(ptr::null()))
            .collect();
        Self {
            _strings: strings,
            ptrs,
        }
    }

    fn as_ptr(&self) -> *const *const libc::c_char {
        self.ptrs.as_ptr()
    }
}

/// Run an external program and wait for it
///
/// `args` is the full argument vector, `args[0]` being the program name as typed.
/// The child starts in the session's working directory with the session's
/// variables as its whole environment and inherits the standard streams. The
/// call blocks until the child has been reaped.
///
/// Failing to resolve, fork or exec is an error. A child that ran and exited
/// with a failure status is not. If the session directory has vanished the
/// child runs in the directory the shell itself is in.
pub fn run_external(args: &[String], env: &ShellEnvironment) -> Result<ChildExit, SpawnError> {
    let program = match args.first() {
        Some(name) => name.as_str(),
        None => return Err(ProgramResolutionError::InvalidName(String::new()).into()),
    };

    // Every buffer and pointer array the child uses is allocated here, before
    // fork. The child then only calls chdir, execve, write and _exit.
    let prog_path = resolve_program_path(program, env)?;
    log::debug!("resolved {} to {}", program, prog_path.display());

    let prog_cstr = CString::new(prog_path.as_os_str().as_bytes())
        .map_err(|_| ProgramResolutionError::InvalidName(program.to_string()))?;
    let args_cstr = args
        .iter()
        .map(|arg| CString::new(arg.as_str()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| SpawnError::NulInArgument {
            program: program.to_string(),
        })?;
    let sh_argv = ExecVector::new(
        [c"sh".to_owned(), prog_cstr.clone()]
            .into_iter()
            .chain(args_cstr[1..].iter().cloned())
            .collect(),
    );
    let argv = ExecVector::new(args_cstr);
    let envp = ExecVector::new(env.to_envp());
    let cwd = env.cwd_cstring().ok_or_else(|| SpawnError::Exec {
        program: program.to_string(),
        source: std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "working directory contains a NUL byte",
        ),
    })?;

    if !env.cwd().is_dir() {
        log::warn!(
            "{}: working directory {} is gone, running in the inherited one",
            program,
            env.cwd().display()
        );
    }

    // Reports a failed exec back to us; closes itself on a successful exec
    let (status_read, status_write) =
        pipe2(OFlag::O_CLOEXEC).map_err(|e| SpawnError::StatusPipe(e.into()))?;

    match unsafe { fork() } {
        Ok(ForkResult::Parent { child }) => {
            drop(status_write);
            log::debug!("spawned {} as pid {}", program, child);

            let failure = read_child_failure(status_read);
            let exit = wait_for_child(child, program)?;

            match failure {
                Some(source) => Err(SpawnError::Exec {
                    program: program.to_string(),
                    source,
                }),
                None => Ok(exit),
            }
        }
        Ok(ForkResult::Child) => {
            drop(status_read);
            exec_child(&prog_cstr, &argv, &sh_argv, &envp, &cwd, status_write)
        }
        Err(e) => Err(SpawnError::Fork(e)),
    }
}

/// Child side: enter the session cwd and replace the process image
fn exec_child(
    prog: &CStr,
    argv: &ExecVector,
    sh_argv: &ExecVector,
    envp: &ExecVector,
    cwd: &CStr,
    status_write: OwnedFd,
) -> ! {
    let mut status_pipe = File::from(status_write);

    // On failure the child stays in the directory inherited from the shell
    let _ = chdir(cwd);

    unsafe { libc::execve(prog.as_ptr(), argv.as_ptr(), envp.as_ptr()) };
    let mut errno = Errno::last();

    // No interpreter line: hand the file to sh as a script
    if errno == Errno::ENOEXEC {
        unsafe { libc::execve(FALLBACK_SHELL.as_ptr(), sh_argv.as_ptr(), envp.as_ptr()) };
        errno = Errno::last();
    }
    report_and_exit(&mut status_pipe, errno)
}

fn report_and_exit(status_pipe: &mut File, errno: Errno) -> ! {
    let _ = status_pipe.write_all(&(errno as i32).to_ne_bytes());
    // Skip atexit handlers and buffered stdio inherited from the parent
    unsafe { libc::_exit(EXEC_FAILED_EXIT) }
}

/// Parent side: an empty pipe means the exec went through
fn read_child_failure(status_read: OwnedFd) -> Option<std::io::Error> {
    let mut message = Vec::with_capacity(4);
    if let Err(e) = File::from(status_read).read_to_end(&mut message) {
        log::warn!("could not read exec status from child: {}", e);
        return None;
    }
    match message.as_slice() {
        [a, b, c, d] => Some(std::io::Error::from_raw_os_error(i32::from_ne_bytes([
            *a, *b, *c, *d,
        ]))),
        _ => None,
    }
}

/// Block until the child terminates
pub(crate) fn wait_for_child(child: Pid, program: &str) -> Result<ChildExit, SpawnError> {
    loop {
        match waitpid(child, None) {
            Ok(WaitStatus::Exited(_pid, exit_code)) => return Ok(ChildExit::Exited(exit_code)),
            Ok(WaitStatus::Signaled(_pid, signal, _core_dump)) => {
                return Ok(ChildExit::Signaled(signal as i32));
            }
            Ok(status) => log::debug!("{}: ignoring wait status {:?}", program, status),
            Err(Errno::EINTR) => continue,
            Err(source) => {
                return Err(SpawnError::Wait {
                    program: program.to_string(),
                    source,
                });
            }
        }
    }
}
