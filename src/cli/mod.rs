// src/cli/mod.rs

use crate::constants::{USAGE, VERSION};
use crate::session::Session;
use crate::system::executor::ExecutionError;
use anyhow::Result;
use clap::Parser;
use std::io::{IsTerminal, Read};
use std::process::ExitCode;

pub mod script;

use self::script::Script;

/// shrun: run a shell script line by line, with captured output and live
/// mirroring.
///
/// The script argument may be a filesystem path, an `http(s)://` URL, or a
/// `file://` URL. With no argument, a script piped on stdin is run; with
/// neither, a usage line is printed and the process exits with status 2.
#[derive(Parser, Debug)]
#[command(name = "shrun", disable_version_flag = true)]
pub struct Cli {
    /// Path or URL of the script to run.
    pub script: Option<String>,

    /// Print the version and exit.
    #[arg(short = 'v', long = "version", visible_short_alias = 'V')]
    pub version: bool,

    /// Start quiet: no command echo, no live output mirroring.
    #[arg(short, long)]
    pub quiet: bool,

    /// Shell binary used to interpret command lines.
    #[arg(long, value_name = "PATH")]
    pub shell: Option<String>,
}

/// Resolves the script source, runs it, and maps the outcome to a process
/// exit code. Hard failures bubble up as errors for the binary's central
/// handler; a command that merely exited nonzero prints its origin and
/// becomes exit code 1.
pub async fn run_cli(cli: Cli) -> Result<ExitCode> {
    log::debug!("CLI args parsed: {cli:?}");

    if cli.version {
        println!("shrun version {VERSION}");
        return Ok(ExitCode::SUCCESS);
    }

    let mut session = Session::new();
    if cli.quiet {
        session.set_verbose(false);
    }
    if let Some(shell) = &cli.shell {
        session.set_shell(shell);
    }

    let script = match &cli.script {
        Some(source) => Script::load(&session, source).await?,
        None => match read_piped_stdin()? {
            Some(body) => Script::from_stdin(body),
            None => {
                println!("{USAGE}");
                return Ok(ExitCode::from(2));
            }
        },
    };
    log::debug!("running script '{}'", script.name());

    match script.run(&mut session).await {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(ExecutionError::Failed(output)) => {
            // The command's own stderr was already mirrored while it ran;
            // all that is left to add is where it was launched from.
            eprintln!("  at {}", output.origin());
            Ok(ExitCode::FAILURE)
        }
        Err(other) => Err(other.into()),
    }
}

/// Reads the whole of stdin when it is a pipe carrying content. `None` on
/// a terminal, or when the pipe turns out to be empty.
fn read_piped_stdin() -> Result<Option<String>> {
    let mut stdin = std::io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }
    let mut body = String::new();
    stdin.read_to_string(&mut body)?;
    if body.trim().is_empty() {
        Ok(None)
    } else {
        Ok(Some(body))
    }
}
