use crate::command::{ExitCode, Resolved};
use crate::env::Environment;
use anyhow::{Result, bail};
use argh::{EarlyExit, FromArgs};
use log::debug;
use std::env;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

/// Built-in commands known to the shell at compile time.
///
/// Builtins are parsed using the [`argh`] crate (`FromArgs`) and executed directly
/// in-process without spawning a child process.
pub(crate) trait BuiltinCommand: Sized + FromArgs {
    /// Canonical name of the command, e.g. "echo" or "cd".
    fn name() -> &'static str;

    /// Executes the command, writing its output to `stdout`.
    ///
    /// Return value should follow shell conventions: 0 for success, non-zero for error.
    fn execute(self, stdout: &mut dyn Write, env: &mut Environment) -> Result<ExitCode>;
}

/// The closed set of builtins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Exit,
    Echo,
    Pwd,
    Cd,
    Type,
}

impl Builtin {
    pub const ALL: [Builtin; 5] = [
        Builtin::Exit,
        Builtin::Echo,
        Builtin::Pwd,
        Builtin::Cd,
        Builtin::Type,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Builtin::Exit => Exit::name(),
            Builtin::Echo => Echo::name(),
            Builtin::Pwd => Pwd::name(),
            Builtin::Cd => Cd::name(),
            Builtin::Type => Type::name(),
        }
    }

    /// Exact, case-sensitive match against the builtin names.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|builtin| builtin.name() == name)
    }

    /// Parses `args` for this builtin and runs it.
    ///
    /// Usage errors and failures are reported on `stdout` with exit code 1
    /// rather than returned, so only I/O errors on `stdout` itself escape.
    pub fn run(
        self,
        args: &[&str],
        stdout: &mut dyn Write,
        env: &mut Environment,
    ) -> Result<ExitCode> {
        match self {
            Builtin::Exit => run::<Exit>(args, stdout, env),
            Builtin::Echo => run::<Echo>(args, stdout, env),
            Builtin::Pwd => run::<Pwd>(args, stdout, env),
            Builtin::Cd => run::<Cd>(args, stdout, env),
            Builtin::Type => run::<Type>(args, stdout, env),
        }
    }
}

fn run<T: BuiltinCommand>(
    args: &[&str],
    stdout: &mut dyn Write,
    env: &mut Environment,
) -> Result<ExitCode> {
    let cmd = match T::from_args(&[T::name()], args) {
        Ok(cmd) => cmd,
        Err(EarlyExit { output, status }) => {
            debug!("{}: early exit with {:?}", T::name(), status);
            write_line(stdout, &output)?;
            return Ok(if status.is_err() { 1 } else { 0 });
        }
    };

    match cmd.execute(stdout, env) {
        Ok(x) => Ok(x),
        Err(e) => {
            write_line(stdout, &e.to_string())?;
            Ok(1)
        }
    }
}

fn write_line(stdout: &mut dyn Write, text: &str) -> std::io::Result<()> {
    if text.ends_with('\n') {
        stdout.write_all(text.as_bytes())
    } else {
        writeln!(stdout, "{}", text)
    }
}

#[derive(FromArgs)]
/// Print the current working directory to standard output.
pub struct Pwd {}

impl BuiltinCommand for Pwd {
    fn name() -> &'static str {
        "pwd"
    }

    fn execute(self, stdout: &mut dyn Write, env: &mut Environment) -> Result<ExitCode> {
        writeln!(stdout, "{}", env.current_dir.to_string_lossy())?;
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Change the current working directory.
/// If no target is provided, changes to the directory specified by the HOME environment variable.
pub struct Cd {
    #[argh(positional)]
    /// directory to switch to; absolute, relative to the current directory, or starting with `~`.
    pub target: Option<String>,
}

impl Cd {
    fn expand_home(&self, env: &Environment) -> Result<PathBuf> {
        let home = || -> Result<PathBuf> {
            match env.get_var("HOME") {
                Some(home) => Ok(PathBuf::from(home)),
                None => bail!("cd: HOME not set"),
            }
        };
        match self.target.as_deref() {
            None | Some("") | Some("~") => home(),
            Some(t) => match t.strip_prefix("~/") {
                Some(rest) => Ok(home()?.join(rest)),
                None => Ok(PathBuf::from(t)),
            },
        }
    }
}

impl BuiltinCommand for Cd {
    fn name() -> &'static str {
        "cd"
    }

    fn execute(self, _stdout: &mut dyn Write, env: &mut Environment) -> Result<ExitCode> {
        let target = self.expand_home(env)?;
        let new_dir = env.resolve(&target);

        let Ok(canonical) = fs::canonicalize(&new_dir) else {
            bail!("cd: {}: No such file or directory", target.display());
        };
        if !canonical.is_dir() {
            bail!("cd: {}: Not a directory", target.display());
        }

        env::set_current_dir(&canonical)?;
        env.current_dir = canonical;
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Exit the shell.
pub struct Exit {
    #[argh(positional, default = "0")]
    /// exit status of the shell; defaults to 0.
    pub code: ExitCode,
}

impl BuiltinCommand for Exit {
    fn name() -> &'static str {
        "exit"
    }

    fn execute(self, _stdout: &mut dyn Write, env: &mut Environment) -> Result<ExitCode> {
        env.request_exit(self.code);
        Ok(self.code)
    }
}

/// Write the arguments to standard output, separated by spaces.
///
/// Only leading `-n` words are options; every other word is printed as is,
/// including `help` and dash-prefixed words.
pub struct Echo {
    /// Do not output the trailing newline.
    pub no_newline: bool,
    pub args: Vec<String>,
}

impl FromArgs for Echo {
    fn from_args(_command_name: &[&str], args: &[&str]) -> Result<Self, EarlyExit> {
        let flags = args.iter().take_while(|arg| **arg == "-n").count();
        Ok(Echo {
            no_newline: flags > 0,
            args: args[flags..].iter().map(|arg| arg.to_string()).collect(),
        })
    }
}

impl BuiltinCommand for Echo {
    fn name() -> &'static str {
        "echo"
    }

    fn execute(self, stdout: &mut dyn Write, _env: &mut Environment) -> Result<ExitCode> {
        let s = self.args.join(" ");
        if self.no_newline {
            write!(stdout, "{}", s)?;
        } else {
            writeln!(stdout, "{}", s)?;
        }
        Ok(0)
    }
}

/// Describe how each name would be interpreted as a command.
///
/// Takes no options, so every word is a name to look up.
pub struct Type {
    pub names: Vec<String>,
}

impl FromArgs for Type {
    fn from_args(_command_name: &[&str], args: &[&str]) -> Result<Self, EarlyExit> {
        Ok(Type {
            names: args.iter().map(|arg| arg.to_string()).collect(),
        })
    }
}

impl BuiltinCommand for Type {
    fn name() -> &'static str {
        "type"
    }

    fn execute(self, stdout: &mut dyn Write, env: &mut Environment) -> Result<ExitCode> {
        let mut code = 0;
        for name in &self.names {
            match Resolved::lookup(name, env) {
                Some(Resolved::Builtin(_)) => writeln!(stdout, "{} is a shell builtin", name)?,
                Some(Resolved::External(path)) => {
                    writeln!(stdout, "{} is {}", name, path.display())?
                }
                None => {
                    writeln!(stdout, "{}: not found", name)?;
                    code = 1;
                }
            }
        }
        Ok(code)
    }
}
