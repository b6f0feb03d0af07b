//! `onyo config` -- a thin passthrough to `git config` scoped at the
//! onyo-tracked config file.

use std::process::Command;

use anyhow::{Context, Result};
use clap::Args;

use crate::common::CommonArgs;

/// Read or write onyo-tracked configuration (passthrough to `git config`
/// against `.onyo/config`).
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Arguments forwarded verbatim to `git config --file .onyo/config`.
    #[arg(trailing_var_arg = true)]
    pub args: Vec<String>,
}

pub fn run(args: &ConfigArgs) -> Result<i32> {
    let start = args.common.start_path();
    let adapter = onyo_git::GixGitAdapter::open(&start)?;
    let repo = onyo::Repository::open(&adapter, &start)?;

    let config_path = repo.root().join(".onyo").join("config");
    let status = Command::new("git")
        .arg("config")
        .arg("--file")
        .arg(&config_path)
        .args(&args.args)
        .status()
        .context("spawning git config")?;

    Ok(status.code().unwrap_or(1))
}
