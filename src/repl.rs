use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Write};

use anyhow::Context;
use thiserror::Error;

use crate::config::{Config, MAX_LINE_BYTES};
use crate::shell::{Outcome, ShellEnvironment, TokenizeError, dispatch, tokenize};

/// Result of asking a [`LineSource`] for the next command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fetched {
    /// The stream is exhausted
    EndOfInput,
    /// The line held nothing but delimiters; ask again
    Blank,
    Command(Vec<String>),
}

#[derive(Error, Debug)]
pub enum LineError {
    #[error("line too long (at most {limit} bytes)")]
    TooLong { limit: usize },
    #[error(transparent)]
    Tokenize(#[from] TokenizeError),
    #[error("read failed: {0}")]
    Io(#[from] io::Error),
}

/// Reads one bounded line at a time and tokenizes it
pub struct LineSource<R> {
    reader: R,
    limit: usize,
    buf: Vec<u8>,
}

impl<R: BufRead> LineSource<R> {
    pub fn new(reader: R) -> Self {
        Self::with_limit(reader, MAX_LINE_BYTES)
    }

    /// `limit` counts the line terminator
    pub fn with_limit(reader: R, limit: usize) -> Self {
        Self {
            reader,
            limit,
            buf: Vec::with_capacity(limit),
        }
    }

    /// Read and tokenize the next line
    ///
    /// An over-long line is consumed up to its terminator and reported as
    /// [`LineError::TooLong`], so the following call starts on the next line.
    pub fn next_command(&mut self) -> Result<Fetched, LineError> {
        self.buf.clear();
        let read = Read::take(&mut self.reader, self.limit as u64).read_until(b'\n', &mut self.buf)?;
        if read == 0 {
            return Ok(Fetched::EndOfInput);
        }

        if read == self.limit && self.buf.last() != Some(&b'\n') {
            // A final unterminated line that fills the buffer exactly still fits
            if !self.reader.fill_buf()?.is_empty() {
                self.reader.skip_until(b'\n')?;
                return Err(LineError::TooLong { limit: self.limit });
            }
        }

        let line = String::from_utf8_lossy(&self.buf);
        let tokens = tokenize(&line)?;
        if tokens.is_empty() {
            Ok(Fetched::Blank)
        } else {
            Ok(Fetched::Command(tokens))
        }
    }
}

/// Keep the shell alive on an interactive interrupt
///
/// Installs a handler that does nothing rather than ignoring the signal, so the
/// disposition reverts to the default in every exec'd child and Ctrl-C still
/// reaches a running program.
pub fn ignore_interrupts() -> io::Result<()> {
    unsafe { signal_hook::low_level::register(signal_hook::consts::SIGINT, || {}) }?;
    Ok(())
}

/// A shell session: its environment plus the interactive streams
pub struct Session<R, W> {
    config: Config,
    env: ShellEnvironment,
    input: LineSource<R>,
    out: W,
}

impl<R: BufRead, W: Write> Session<R, W> {
    pub fn new(config: Config, env: ShellEnvironment, input: R, out: W) -> Self {
        Self {
            config,
            env,
            input: LineSource::new(input),
            out,
        }
    }

    pub fn env(&self) -> &ShellEnvironment {
        &self.env
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    /// Run the startup file, then the interactive loop
    pub fn run(&mut self) -> anyhow::Result<Outcome> {
        self.run_startup();
        self.run_interactive()
    }

    /// Run every command of the startup file, if there is one
    ///
    /// Nothing that goes wrong here ends the session.
    pub fn run_startup(&mut self) {
        let Some(path) = self.config.rc_path.clone() else {
            return;
        };
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return,
            Err(e) => {
                log::warn!("skipping {}: {}", path.display(), e);
                return;
            }
        };
        log::info!("reading {}", path.display());
        self.run_script(BufReader::new(file));
    }

    /// Dispatch each line of a script
    ///
    /// Faults and bad lines are logged and skipped; `exit` stops the script
    /// early. The session itself always continues afterwards.
    pub fn run_script(&mut self, reader: impl BufRead) {
        let mut source = LineSource::new(reader);
        loop {
            let tokens = match source.next_command() {
                Ok(Fetched::EndOfInput) => break,
                Ok(Fetched::Blank) => continue,
                Ok(Fetched::Command(tokens)) => tokens,
                Err(LineError::Io(e)) => {
                    log::warn!("startup script: {}", e);
                    break;
                }
                Err(e) => {
                    eprintln!("kapish: {}", e);
                    continue;
                }
            };

            match dispatch(&tokens, &mut self.env, &mut self.out) {
                Ok(Outcome::Continue) => {}
                Ok(Outcome::Terminate) => break,
                Ok(Outcome::Fault) => log::warn!("startup script: `{}` failed", tokens[0]),
                Err(e) => {
                    log::warn!("startup script: {}", e);
                    break;
                }
            }
        }
    }

    /// Prompt, read, dispatch until `exit`, end of input, or a fault
    ///
    /// Returns [`Outcome::Terminate`] for a clean stop and [`Outcome::Fault`]
    /// when an external command could not be started.
    pub fn run_interactive(&mut self) -> anyhow::Result<Outcome> {
        loop {
            write!(self.out, "{}", self.config.prompt).context("writing prompt")?;
            self.out.flush().context("writing prompt")?;

            let tokens = match self.input.next_command() {
                Ok(Fetched::Command(tokens)) => tokens,
                Ok(Fetched::Blank) => continue,
                Ok(Fetched::EndOfInput) => return Ok(Outcome::Terminate),
                Err(LineError::Io(e)) => return Err(e).context("reading command"),
                Err(e) => {
                    eprintln!("kapish: {}", e);
                    continue;
                }
            };

            match dispatch(&tokens, &mut self.env, &mut self.out).context("writing output")? {
                Outcome::Continue => {}
                outcome => return Ok(outcome),
            }
        }
    }
}
