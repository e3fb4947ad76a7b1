use crate::builtin::Builtin;
use crate::env::Environment;
use crate::external::find_command_path;
use std::path::{Path, PathBuf};

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
/// This mirrors the convention used by POSIX shells and many command-line tools.
pub type ExitCode = i32;

/// What a command name refers to.
///
/// Builtins shadow executables of the same name, the way they do in POSIX shells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    /// One of the shell's own commands.
    Builtin(Builtin),
    /// An executable file found on disk.
    External(PathBuf),
}

impl Resolved {
    /// Looks `name` up among the builtins, then on the search path.
    ///
    /// Returns `None` when the name is unknown.
    pub fn lookup(name: &str, env: &Environment) -> Option<Self> {
        if let Some(builtin) = Builtin::from_name(name) {
            return Some(Resolved::Builtin(builtin));
        }
        find_command_path(&env.search_paths(), Path::new(name))
            .map(|path| Resolved::External(path.into_owned()))
    }
}
