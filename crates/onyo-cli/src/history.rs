//! `onyo history PATH`

use std::path::PathBuf;
use std::process::Command;

use anyhow::{Context, Result};
use clap::Args;
use onyo::Repository;
use onyo_git::GixGitAdapter;

use crate::common::CommonArgs;

/// Show the commit history touching a path, via the configured history tool.
#[derive(Args, Debug)]
pub struct HistoryArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Path to show history for.
    pub path: PathBuf,

    /// Use the non-interactive history tool instead of the interactive one.
    #[arg(short = 'I', long = "non-interactive")]
    pub non_interactive: bool,
}

pub fn run(args: &HistoryArgs) -> Result<i32> {
    let start = args.common.start_path();
    let adapter = GixGitAdapter::open(&start)?;
    let repo = Repository::open(&adapter, &start)?;
    let resolver = repo.resolver();

    let command_line = if args.non_interactive {
        resolver.history_non_interactive()
    } else {
        resolver.history_interactive()
    };

    let mut parts = command_line.split_whitespace();
    let Some(program) = parts.next() else {
        anyhow::bail!("empty history command configured");
    };

    let status = Command::new(program)
        .args(parts)
        .arg("--")
        .arg(&args.path)
        .current_dir(repo.root())
        .status()
        .with_context(|| format!("spawning '{command_line}'"))?;

    Ok(status.code().unwrap_or(1))
}
