use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn shell() -> Command {
    Command::cargo_bin("line_shell").unwrap()
}

#[test]
fn test_single_command_line() {
    shell()
        .args(["-c", "echo hello 'big   world'"])
        .assert()
        .success()
        .stdout("hello big   world\n");
}

#[test]
fn test_single_command_redirect() {
    let temp_dir = TempDir::new().unwrap();
    let target = temp_dir.path().join("out.txt");

    shell()
        .current_dir(temp_dir.path())
        .args(["-c", "echo saved 1>out.txt"])
        .assert()
        .success()
        .stdout("");

    assert_eq!(fs::read_to_string(target).unwrap(), "saved\n");
}

#[test]
fn test_single_command_syntax_error() {
    shell()
        .args(["-c", "echo >"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("syntax error"));
}

#[test]
fn test_exit_status_is_propagated() {
    shell().args(["-c", "exit 5"]).assert().code(5);
    shell()
        .args(["-c", "no_such_command_for_line_shell"])
        .assert()
        .code(127)
        .stdout("no_such_command_for_line_shell: not found\n");
}

#[test]
fn test_repl_survives_bad_lines() {
    shell()
        .write_stdin("echo one\necho 'unclosed\necho two\nexit 3\necho never\n")
        .assert()
        .code(3)
        .stdout(predicate::str::contains("one"))
        .stdout(predicate::str::contains("two"))
        .stdout(predicate::str::contains("never").not())
        .stderr(predicate::str::contains("unterminated single-quoted string"));
}

#[test]
#[cfg(target_os = "linux")]
fn test_unflushed_output_fails_the_run() {
    use assert_cmd::prelude::*;
    use std::process::Command as StdCommand;

    let Ok(full) = fs::OpenOptions::new().write(true).open("/dev/full") else {
        return;
    };
    // No trailing newline, so the text is still buffered when the shell exits.
    StdCommand::cargo_bin("line_shell")
        .unwrap()
        .args(["-c", "echo -n pending"])
        .stdout(full)
        .output()
        .unwrap()
        .assert()
        .code(1)
        .stderr(predicate::str::contains("cannot flush stdout"));
}
