use crate::command::ExitCode;
use crate::env::Environment;
use anyhow::{Context, Result};
use log::debug;
use std::borrow::Cow;
use std::ffi::{OsStr, OsString};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};

/// Command that is not a builtin.
///
/// Standard output is captured so the interpreter can route it to a file;
/// standard input and standard error are shared with the shell.
pub struct ExternalCommand {
    name: OsString,
    program: PathBuf,
    args: Vec<OsString>,
}

impl ExternalCommand {
    /// `name` is what the user typed and becomes `argv[0]`; `program` is the
    /// resolved executable.
    pub fn new(name: impl Into<OsString>, program: PathBuf, args: Vec<OsString>) -> Self {
        Self {
            name: name.into(),
            program,
            args,
        }
    }

    pub fn execute(self, stdout: &mut dyn Write, env: &Environment) -> Result<ExitCode> {
        debug!("spawning {} {:?}", self.program.display(), self.args);
        let mut cmd = std::process::Command::new(&self.program);
        set_arg0(&mut cmd, &self.name);
        let output = cmd
            .args(&self.args)
            .stdin(Stdio::inherit())
            .stderr(Stdio::inherit())
            .env_clear()
            .envs(env.vars.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .current_dir(&env.current_dir)
            .output()
            .with_context(|| format!("failed to run {}", self.program.display()))?;
        stdout.write_all(&output.stdout)?;

        match output.status.code() {
            Some(x) => Ok(x),
            None => Ok(terminated_by_signal(output.status)),
        }
    }
}

#[cfg(unix)]
fn set_arg0(cmd: &mut std::process::Command, name: &OsStr) {
    use std::os::unix::process::CommandExt;
    cmd.arg0(name);
}

#[cfg(not(unix))]
fn set_arg0(_cmd: &mut std::process::Command, _name: &OsStr) {}

#[cfg(unix)]
fn terminated_by_signal(exit_status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    if let Some(signal) = ExitStatusExt::signal(&exit_status) {
        128 + signal
    } else if ExitStatusExt::core_dumped(&exit_status) {
        255
    } else {
        -1
    }
}

#[cfg(not(unix))]
fn terminated_by_signal(_exit_status: ExitStatus) -> i32 {
    -1
}

/// Resolve a command path the way a typical shell would.
///
/// Behavior:
/// - Absolute path: returns it if it is an executable file.
/// - Relative with multiple components (e.g., `bin/sh`) or `./`-prefixed:
///   returns it if it is an executable file.
/// - Single path component (no separators): search each directory in `search_paths` (PATH)
///   in order and return the first executable match.
/// - Empty path: returns `None`.
///
/// Returns either a borrowed reference to the provided `path` or an owned `PathBuf`
/// when the result is discovered via PATH lookup.
pub fn find_command_path<'a>(search_paths: &OsStr, path: &'a Path) -> Option<Cow<'a, Path>> {
    if path.is_absolute() {
        return find_by_path(path).map(Cow::Borrowed);
    }

    let mut components = path.components();
    let first = components.next();
    let second = components.next();
    match (first, second) {
        // Empty path -> not found
        (None, _) => None,
        (Some(x), None) => find_in_path(search_paths, x.as_os_str()).map(Cow::Owned),
        // Multiple components or ./foo -> relative to the current dir
        _ => find_by_path(path).map(Cow::Borrowed),
    }
}

fn find_in_path(search_paths: &OsStr, cmd: &OsStr) -> Option<PathBuf> {
    std::env::split_paths(search_paths)
        .map(|dir| dir.join(cmd))
        .find(|candidate| is_executable(candidate))
}

fn find_by_path(path: &Path) -> Option<&Path> {
    if is_executable(path) { Some(path) } else { None }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
