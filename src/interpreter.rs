use crate::command::{ExitCode, Resolved};
use crate::env::Environment;
use crate::external::ExternalCommand;
use crate::parser;
use anyhow::Context;
use log::{debug, warn};
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result};
use std::ffi::OsString;
use std::fs;
use std::io::Write;

/// Exit status reported for a command name that resolves to nothing.
const NOT_FOUND: ExitCode = 127;

/// A minimal shell-like interpreter that can execute built-in and external commands.
///
/// The interpreter owns an [`Environment`]; every line is tokenized, parsed and
/// dispatched against it, and the command's output is written either to the
/// caller's writer or to the file named by a `>` redirection.
///
/// Example
/// ```
/// use line_shell::Interpreter;
/// let mut sh = Interpreter::default();
/// let mut out = Vec::new();
/// let code = sh.execute_line("echo hello world", &mut out).unwrap();
/// assert_eq!(code, 0);
/// assert_eq!(out, b"hello world\n");
/// ```
pub struct Interpreter {
    env: Environment,
    prompt: String,
}

impl Interpreter {
    /// Create a new interpreter working on `env`.
    pub fn new(env: Environment) -> Self {
        Self {
            env,
            prompt: String::from("$ "),
        }
    }

    /// Replace the prompt shown by [`repl`](Interpreter::repl).
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    /// Run a single command invocation by name with arguments.
    ///
    /// Builtins are tried first, then executables on `PATH`. An unknown name
    /// prints `<name>: not found` to `stdout`.
    pub fn run(
        &mut self,
        name: &str,
        args: &[&str],
        stdout: &mut dyn Write,
    ) -> anyhow::Result<ExitCode> {
        match Resolved::lookup(name, &self.env) {
            Some(Resolved::Builtin(builtin)) => {
                debug!("{name}: builtin");
                builtin.run(args, stdout, &mut self.env)
            }
            Some(Resolved::External(path)) => {
                debug!("{name}: external {}", path.display());
                let args = args.iter().map(OsString::from).collect();
                ExternalCommand::new(name, path, args).execute(stdout, &self.env)
            }
            None => {
                debug!("{name}: not found");
                writeln!(stdout, "{}: not found", name)?;
                Ok(NOT_FOUND)
            }
        }
    }

    /// Parse and execute one line of input.
    ///
    /// An empty line does nothing. When the line redirects descriptor 1, the
    /// command's output replaces the contents of that file instead of going to
    /// `stdout`. Parse errors are returned without running anything.
    pub fn execute_line(
        &mut self,
        line: &str,
        stdout: &mut dyn Write,
    ) -> anyhow::Result<ExitCode> {
        let command_line = parser::parse(line)?;
        let Some(name) = command_line.command.name.as_deref() else {
            return Ok(0);
        };
        let args: Vec<&str> = command_line.command.args.iter().map(String::as_str).collect();

        let Some(target) = command_line.stdout_target() else {
            return self.run(name, &args, stdout);
        };

        // Resolved before running, so a `cd` does not move the target.
        let path = self.env.resolve(target);
        let mut captured = Vec::new();
        let code = self.run(name, &args, &mut captured)?;
        fs::write(&path, &captured)
            .with_context(|| format!("cannot write to {}", path.display()))?;
        Ok(code)
    }

    /// Read-Eval-Print Loop.
    ///
    /// Errors of a single line are reported on stderr and the loop continues.
    /// Returns the status requested by `exit`, or 0 at end of input.
    pub fn repl(&mut self) -> Result<ExitCode> {
        let mut rl = DefaultEditor::new()?;
        let mut stdout = std::io::stdout();

        while !self.env.should_exit {
            match rl.readline(&self.prompt) {
                Ok(line) => {
                    rl.add_history_entry(line.as_str())?;
                    if let Err(err) = self.execute_line(&line, &mut stdout) {
                        warn!("failed to execute {line:?}: {err:#}");
                        eprintln!("{err:#}");
                    }
                    stdout.flush()?;
                }
                Err(ReadlineError::Interrupted) => continue,
                Err(ReadlineError::Eof) => break,
                Err(err) => return Err(err),
            }
        }

        Ok(self.env.exit_code)
    }
}

impl Default for Interpreter {
    /// Create an interpreter over a snapshot of the process environment.
    fn default() -> Self {
        Self::new(Environment::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::path::Path;
    use tempfile::TempDir;

    fn interpreter_in(dir: &Path) -> Interpreter {
        let mut vars = HashMap::new();
        vars.insert("PATH".to_string(), "/bin:/usr/bin".to_string());
        Interpreter::new(Environment {
            vars,
            current_dir: dir.to_path_buf(),
            should_exit: false,
            exit_code: 0,
        })
    }

    fn setup() -> (TempDir, Interpreter) {
        let dir = tempfile::tempdir().expect("temp dir");
        let sh = interpreter_in(&fs::canonicalize(dir.path()).unwrap());
        (dir, sh)
    }

    fn exec(sh: &mut Interpreter, line: &str) -> (ExitCode, String) {
        let mut out = Vec::new();
        let code = sh.execute_line(line, &mut out).unwrap();
        (code, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_echo_to_stdout() {
        let (_dir, mut sh) = setup();
        assert_eq!(exec(&mut sh, "echo hello world"), (0, "hello world\n".to_string()));
        assert_eq!(
            exec(&mut sh, "echo 'a   b' \"c\""),
            (0, "a   b c\n".to_string())
        );
        assert_eq!(exec(&mut sh, "echo help -1 -"), (0, "help -1 -\n".to_string()));
    }

    #[test]
    fn test_empty_line_does_nothing() {
        let (_dir, mut sh) = setup();
        assert_eq!(exec(&mut sh, ""), (0, String::new()));
        assert_eq!(exec(&mut sh, "   "), (0, String::new()));
    }

    #[test]
    fn test_redirect_writes_file_instead_of_stdout() {
        let (dir, mut sh) = setup();
        let target = dir.path().join("out.txt");

        let line = format!("echo hi 1>{}", target.display());
        assert_eq!(exec(&mut sh, &line), (0, String::new()));
        assert_eq!(fs::read_to_string(&target).unwrap(), "hi\n");

        let line = format!("echo again > {}", target.display());
        assert_eq!(exec(&mut sh, &line), (0, String::new()));
        assert_eq!(fs::read_to_string(&target).unwrap(), "again\n");
    }

    #[test]
    fn test_relative_target_uses_shell_directory() {
        let (dir, mut sh) = setup();
        exec(&mut sh, "echo rel >rel.txt");
        assert_eq!(fs::read_to_string(dir.path().join("rel.txt")).unwrap(), "rel\n");
    }

    #[test]
    fn test_last_stdout_redirect_wins() {
        let (dir, mut sh) = setup();
        exec(&mut sh, "echo x >first.txt >second.txt");
        assert!(!dir.path().join("first.txt").exists());
        assert_eq!(
            fs::read_to_string(dir.path().join("second.txt")).unwrap(),
            "x\n"
        );
    }

    #[test]
    fn test_other_descriptors_are_ignored() {
        let (dir, mut sh) = setup();
        assert_eq!(exec(&mut sh, "echo x 2>err.txt"), (0, "x\n".to_string()));
        assert!(!dir.path().join("err.txt").exists());
    }

    #[test]
    fn test_unknown_command() {
        let (dir, mut sh) = setup();
        assert_eq!(
            exec(&mut sh, "no_such_cmd_xyz arg"),
            (NOT_FOUND, "no_such_cmd_xyz: not found\n".to_string())
        );

        exec(&mut sh, "no_such_cmd_xyz > nf.txt");
        assert_eq!(
            fs::read_to_string(dir.path().join("nf.txt")).unwrap(),
            "no_such_cmd_xyz: not found\n"
        );
    }

    #[test]
    fn test_parse_errors_are_returned() {
        let (_dir, mut sh) = setup();
        let mut out = Vec::new();

        let err = sh.execute_line("echo >", &mut out).unwrap_err();
        assert!(err.to_string().starts_with("syntax error"), "{err}");

        let err = sh.execute_line("echo 'oops", &mut out).unwrap_err();
        assert_eq!(err.to_string(), "unterminated single-quoted string");

        let err = sh.execute_line("ls | wc", &mut out).unwrap_err();
        assert_eq!(err.to_string(), "undefined character '|'");

        assert!(out.is_empty());
    }

    #[test]
    fn test_exit_stops_session() {
        let (_dir, mut sh) = setup();
        assert_eq!(exec(&mut sh, "exit 4"), (4, String::new()));
        assert!(sh.env().should_exit);
        assert_eq!(sh.env().exit_code, 4);
    }

    #[test]
    #[cfg(unix)]
    fn test_external_command_output_is_captured() {
        let (dir, mut sh) = setup();
        assert_eq!(
            exec(&mut sh, "sh -c 'echo from sh; exit 2'"),
            (2, "from sh\n".to_string())
        );

        exec(&mut sh, "sh -c pwd >where.txt");
        let expected = format!("{}\n", sh.env().current_dir.display());
        assert_eq!(
            fs::read_to_string(dir.path().join("where.txt")).unwrap(),
            expected
        );
    }

    #[test]
    #[cfg(unix)]
    fn test_type_builtin_through_line() {
        let (_dir, mut sh) = setup();
        let (_, out) = exec(&mut sh, "type type");
        assert_eq!(out, "type is a shell builtin\n");
    }
}
