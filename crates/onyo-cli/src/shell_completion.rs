//! `onyo shell-completion`

use std::str::FromStr;

use clap::{Args, CommandFactory};
use clap_complete::{generate, Shell};

use crate::Cli;

/// Print a shell completion script.
#[derive(Args, Debug)]
pub struct ShellCompletionArgs {
    /// Shell to generate completions for.
    #[arg(short = 's', long = "shell", value_name = "SHELL", default_value = "bash")]
    pub shell: String,
}

pub fn run(args: &ShellCompletionArgs) -> anyhow::Result<i32> {
    let shell = Shell::from_str(&args.shell).map_err(|e| anyhow::anyhow!(e))?;
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_owned();
    generate(shell, &mut cmd, name, &mut std::io::stdout());
    Ok(0)
}
