use crate::command::ExitCode;
use std::collections::HashMap;
use std::env as stdenv;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Mutable, user-level view of the process environment used by the interpreter.
///
/// The environment contains:
/// - `vars`: a map of environment variables that will be visible to executed commands.
/// - `current_dir`: the working directory for command execution.
/// - `should_exit`/`exit_code`: set by the `exit` builtin to end the session.
#[derive(Debug, Clone)]
pub struct Environment {
    /// Key-value store of environment variables (e.g., PATH, HOME).
    pub vars: HashMap<String, String>,
    /// The current working directory for command execution.
    pub current_dir: PathBuf,
    /// When set to true, indicates that an interactive loop should exit.
    pub should_exit: bool,
    /// Status the shell exits with once `should_exit` is set.
    pub exit_code: ExitCode,
}

impl Environment {
    /// Capture the current process state into a new `Environment` instance.
    ///
    /// This copies variables from `std::env::vars()` and initializes `current_dir`
    /// from `std::env::current_dir()`.
    pub fn new() -> Self {
        let vars = stdenv::vars().collect();
        let current_dir = stdenv::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self {
            vars,
            current_dir,
            should_exit: false,
            exit_code: 0,
        }
    }

    /// Get the value of an environment variable.
    ///
    /// Looks up the key in `self.vars` first, falling back to `std::env::var`.
    pub fn get_var(&self, key: &str) -> Option<String> {
        self.vars
            .get(key)
            .cloned()
            .or_else(|| stdenv::var(key).ok())
    }

    /// Set or override an environment variable in `self.vars`.
    pub fn set_var(&mut self, key: impl Into<String>, val: impl Into<String>) {
        self.vars.insert(key.into(), val.into());
    }

    /// The directories to search for executables, as the raw `PATH` value.
    ///
    /// Only `self.vars` is consulted, so a `PATH` removed from the map stays
    /// removed.
    pub fn search_paths(&self) -> OsString {
        self.vars.get("PATH").map(OsString::from).unwrap_or_default()
    }

    /// Resolves `path` against the shell's working directory.
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        self.current_dir.join(path)
    }

    /// Marks the session as finished.
    pub fn request_exit(&mut self, code: ExitCode) {
        self.should_exit = true;
        self.exit_code = code;
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use crate::env::Environment;
    use std::collections::HashMap;
    use std::env as stdenv;
    use std::path::PathBuf;

    fn empty_env() -> Environment {
        Environment {
            vars: HashMap::new(),
            current_dir: stdenv::current_dir().unwrap(),
            should_exit: false,
            exit_code: 0,
        }
    }

    #[test]
    fn test_env_set_and_get_var() {
        let mut env = empty_env();

        // initially absent
        assert_eq!(env.get_var("SOME_RANDOM_ENV_VAR_12345"), None);

        env.set_var("KEY", "VALUE");

        assert_eq!(env.get_var("KEY"), Some("VALUE".to_string()));
    }

    #[test]
    fn test_env_reads_from_process_env() {
        let env = Environment::new();
        assert!(env.get_var("PATH").is_some());
        assert!(!env.search_paths().is_empty());
    }

    #[test]
    fn test_search_paths_only_uses_own_vars() {
        let mut env = empty_env();
        assert!(env.search_paths().is_empty());
        env.set_var("PATH", "/a:/b");
        assert_eq!(env.search_paths(), "/a:/b");
    }

    #[test]
    fn test_resolve_relative_and_absolute() {
        let mut env = empty_env();
        env.current_dir = PathBuf::from("/work");
        assert_eq!(env.resolve("out.txt"), PathBuf::from("/work/out.txt"));
        assert_eq!(env.resolve("/tmp/x"), PathBuf::from("/tmp/x"));
    }

    #[test]
    fn test_request_exit() {
        let mut env = empty_env();
        env.request_exit(3);
        assert!(env.should_exit);
        assert_eq!(env.exit_code, 3);
    }
}
