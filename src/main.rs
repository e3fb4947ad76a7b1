use argh::FromArgs;
use line_shell::Interpreter;
use log::error;
use std::io::Write;

#[derive(FromArgs)]
/// A small interactive shell with output redirection.
struct Options {
    #[argh(option, short = 'c')]
    /// run a single command line and exit with its status.
    command: Option<String>,

    #[argh(option, default = "String::from(\"$ \")")]
    /// prompt shown before each line.
    prompt: String,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let options: Options = argh::from_env();

    let mut shell = Interpreter::default().with_prompt(options.prompt);
    let code = match options.command {
        Some(line) => match shell.execute_line(&line, &mut std::io::stdout()) {
            Ok(code) => code,
            Err(err) => {
                eprintln!("{err:#}");
                2
            }
        },
        None => match shell.repl() {
            Ok(code) => code,
            Err(err) => {
                error!("line editor failed: {err}");
                eprintln!("line_shell: {err}");
                1
            }
        },
    };
    let code = match std::io::stdout().flush() {
        Ok(()) => code,
        Err(err) => {
            error!("failed to flush stdout: {err}");
            eprintln!("line_shell: cannot flush stdout: {err}");
            if code == 0 { 1 } else { code }
        }
    };
    std::process::exit(code);
}
