//! Integration tests for the demo binary.
//!
//! These tests exercise the real process boundary: arguments, environment,
//! standard streams and the exit status.

use assert_cmd::Command;
use assert_fs::prelude::*;
use predicates::prelude::*;

/// Get a command for running the demo binary with a clean environment.
fn demo() -> Command {
    let mut cmd = Command::cargo_bin("appcmd-demo").unwrap();
    cmd.env_clear();
    cmd
}

#[test]
fn echo_joins_arguments() {
    demo()
        .args(["echo", "hello", "world"])
        .assert()
        .success()
        .stdout("hello world\n");
}

#[test]
fn echo_alias_and_flags() {
    demo()
        .args(["say", "--separator", ",", "a", "b", "-U"])
        .assert()
        .success()
        .stdout("A,B\n");
}

#[test]
fn persistent_flag_names_are_normalized() {
    demo()
        .args(["echo", "x", "--upper_case"])
        .assert()
        .success()
        .stdout("X\n");
}

#[test]
fn echo_requires_an_argument() {
    demo()
        .arg("echo")
        .assert()
        .code(1)
        .stdout("")
        .stderr(predicate::str::starts_with("Usage: appcmd-demo echo <words...> [flags]"))
        .stderr(predicate::str::ends_with(
            "requires at least 1 arg(s), only received 0\n",
        ));
}

#[test]
fn env_reads_the_environment() {
    demo()
        .args(["env", "GREETING"])
        .env("GREETING", "hi")
        .assert()
        .success()
        .stdout("hi\n");
}

#[test]
fn missing_env_exits_with_two() {
    demo()
        .args(["env", "MISSING"])
        .assert()
        .code(2)
        .stderr("MISSING is not set\n");
}

#[test]
fn cat_copies_stdin() {
    demo()
        .arg("cat")
        .write_stdin("some input\n")
        .assert()
        .success()
        .stdout("some input\n");
}

#[test]
fn exit_uses_the_requested_code() {
    demo().args(["exit", "3"]).assert().code(3);
    demo().args(["exit", "0"]).assert().success();
}

#[test]
fn exit_with_invalid_code_prints_usage() {
    demo()
        .args(["exit", "three"])
        .assert()
        .code(1)
        .stderr(predicate::str::starts_with("Usage: appcmd-demo exit <code> [flags]"))
        .stderr(predicate::str::ends_with(
            "invalid code: invalid digit found in string\n",
        ));
}

#[test]
fn dirs_follow_the_environment() {
    let home = assert_fs::TempDir::new().unwrap();
    let config = home.child("config");
    demo()
        .arg("dirs")
        .env("APPCMD_DEMO_CONFIG_DIR", config.path())
        .env("XDG_CACHE_HOME", home.child("cache").path())
        .env("XDG_DATA_HOME", home.child("data").path())
        .env("PORT", "8080")
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "config {}\n",
            config.path().display()
        )))
        .stdout(predicate::str::contains(format!(
            "cache {}\n",
            home.child("cache").child("appcmd-demo").path().display()
        )))
        .stdout(predicate::str::ends_with("port 8080\n"));
}

#[test]
fn version_and_help() {
    demo()
        .arg("--version")
        .assert()
        .success()
        .stdout(format!("{}\n", env!("CARGO_PKG_VERSION")));

    demo()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Demonstrate appcmd command trees"))
        .stdout(predicate::str::contains("echo"));
}

#[test]
fn unknown_sub_command_fails() {
    demo()
        .arg("nope")
        .assert()
        .code(1)
        .stderr(predicate::str::ends_with("Unknown sub-command: nope\n"));
}

#[test]
fn completion_script_is_printed() {
    demo()
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("appcmd-demo"));
}

#[test]
fn manpages_are_written() {
    let dir = assert_fs::TempDir::new().unwrap();
    demo()
        .arg("manpages")
        .arg(dir.path())
        .assert()
        .success();
    dir.child("appcmd-demo.1").assert(predicate::path::is_file());
    dir.child("appcmd-demo-echo.1").assert(predicate::path::is_file());
}
