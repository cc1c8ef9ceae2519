use std::fs;
use std::io::Cursor;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use kapish::config::Config;
use kapish::repl::Session;
use kapish::shell::{Outcome, ShellEnvironment};

type TestSession = Session<Cursor<Vec<u8>>, Vec<u8>>;

fn session(config: Config, env: ShellEnvironment, input: &str) -> TestSession {
    Session::new(config, env, Cursor::new(input.as_bytes().to_vec()), Vec::new())
}

fn printed(session: &TestSession) -> String {
    String::from_utf8(session.output().clone()).unwrap()
}

/// Environment whose PATH leads nowhere, so any attempt to spawn faults
fn isolated_env(cwd: &Path) -> ShellEnvironment {
    let mut env = ShellEnvironment::new(cwd);
    env.set("PATH", "/nonexistent");
    env
}

fn write_var_reporter(dir: &Path) {
    let reporter = dir.join("report-x");
    fs::write(&reporter, "#!/bin/sh\nprintf '%s' \"${X-absent}\" > \"$1\"\n").unwrap();
    fs::set_permissions(&reporter, fs::Permissions::from_mode(0o755)).unwrap();
}

#[test]
fn builtins_only_session_exits_cleanly_without_spawning() {
    let start = tempfile::tempdir().unwrap();
    let before = isolated_env(start.path());
    let mut shell = session(
        Config::without_rc(),
        before.clone(),
        "setenv A 1\ncd /tmp\nexit\n",
    );

    assert_eq!(shell.run().unwrap(), Outcome::Terminate);

    let tmp = fs::canonicalize("/tmp").unwrap();
    assert_eq!(shell.env().get("A"), Some("1"));
    assert_eq!(shell.env().cwd(), tmp);
    assert_ne!(shell.env(), &before);
    assert_eq!(printed(&shell), "? ? ? ");
}

#[test]
fn end_of_input_is_a_clean_stop() {
    let mut shell = session(Config::without_rc(), isolated_env(Path::new("/")), "setenv A 1\n\n");
    assert_eq!(shell.run().unwrap(), Outcome::Terminate);
    assert_eq!(shell.env().get("A"), Some("1"));
}

#[test]
fn missing_program_ends_session_with_fault() {
    let mut shell = session(
        Config::without_rc(),
        isolated_env(Path::new("/")),
        "nosuchprogram\nsetenv A 1\nexit\n",
    );
    assert_eq!(shell.run().unwrap(), Outcome::Fault);
    assert!(!shell.env().contains_key("A"));
}

#[test]
fn bad_directory_and_usage_errors_keep_going() {
    let mut shell = session(
        Config::without_rc(),
        isolated_env(Path::new("/")),
        "cd /nonexistent-path\ncd\nsetenv X\nunsetenv\nunsetenv X\nexit\n",
    );
    assert_eq!(shell.run().unwrap(), Outcome::Terminate);
    assert_eq!(shell.env().cwd(), Path::new("/"));
    assert!(!shell.env().contains_key("X"));
    assert_eq!(
        printed(&shell),
        "? ? Expected usage: cd <path>\n? Expected usage: setenv <variable> <value>\n\
         ? Expected usage: unsetenv <variable>\n? ? "
    );
}

#[test]
fn external_commands_see_builtin_changes() {
    let dir = tempfile::tempdir().unwrap();
    write_var_reporter(dir.path());
    let mut env = ShellEnvironment::new("/");
    env.set("PATH", std::env::var("PATH").unwrap_or_else(|_| "/usr/bin:/bin".into()));

    let input = format!(
        "cd {}\nsetenv X 1\n./report-x set\nunsetenv X\n./report-x unset\nexit\n",
        dir.path().display()
    );
    let mut shell = session(Config::without_rc(), env, &input);

    assert_eq!(shell.run().unwrap(), Outcome::Terminate);
    assert_eq!(fs::read_to_string(dir.path().join("set")).unwrap(), "1");
    assert_eq!(fs::read_to_string(dir.path().join("unset")).unwrap(), "absent");
}

#[test]
fn startup_file_runs_before_prompt_and_never_aborts() {
    let home = tempfile::tempdir().unwrap();
    let rc = home.path().join(".kapishrc");
    fs::write(
        &rc,
        "setenv FROM_RC yes\n\nnosuchprogram\ncd /nonexistent-path\nsetenv AFTER_FAULT yes\nexit\nsetenv AFTER_EXIT yes\n",
    )
    .unwrap();
    let config = Config {
        rc_path: Some(rc),
        ..Config::without_rc()
    };

    let mut shell = session(config, isolated_env(Path::new("/")), "setenv INTERACTIVE yes\nexit\n");
    assert_eq!(shell.run().unwrap(), Outcome::Terminate);

    let env = shell.env();
    assert_eq!(env.get("FROM_RC"), Some("yes"));
    assert_eq!(env.get("AFTER_FAULT"), Some("yes"));
    assert!(!env.contains_key("AFTER_EXIT"));
    assert_eq!(env.get("INTERACTIVE"), Some("yes"));
}

#[test]
fn overlong_and_crowded_lines_are_skipped() {
    let long = "x".repeat(2000);
    let crowded = vec!["a"; 100].join(" ");
    let input = format!("{long}\n{crowded}\nsetenv OK 1\nexit\n");
    let mut shell = session(Config::without_rc(), isolated_env(Path::new("/")), &input);

    assert_eq!(shell.run().unwrap(), Outcome::Terminate);
    assert_eq!(shell.env().get("OK"), Some("1"));
}
