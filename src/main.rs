use anyhow::{Context, Result};
use kapish::config::Config;
use kapish::repl::{Session, ignore_interrupts};
use kapish::shell::{Outcome, ShellEnvironment};
use std::io;
use std::process::ExitCode;

fn main() -> Result<ExitCode> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    // Ctrl-C is for the running program, not the shell
    ignore_interrupts().context("installing SIGINT handler")?;

    let mut session = Session::new(
        Config::from_user(),
        ShellEnvironment::from_parent(),
        io::stdin().lock(),
        io::stdout(),
    );

    match session.run()? {
        Outcome::Fault => Ok(ExitCode::FAILURE),
        Outcome::Continue | Outcome::Terminate => Ok(ExitCode::SUCCESS),
    }
}
