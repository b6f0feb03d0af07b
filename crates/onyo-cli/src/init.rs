//! `onyo init [DIR]`

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use onyo::Repository;
use onyo_git::GixGitAdapter;

use crate::common::CommonArgs;

/// Initialize an onyo repository.
#[derive(Args, Debug)]
pub struct InitArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Directory to initialize (defaults to the current directory).
    pub dir: Option<PathBuf>,
}

pub fn run(args: &InitArgs) -> Result<i32> {
    let start = args.dir.clone().unwrap_or_else(|| args.common.start_path());
    let adapter = GixGitAdapter::open(&start)?;

    match Repository::open(&adapter, &start) {
        Ok(_) => {
            if !args.common.quiet {
                println!("onyo repository already initialized, nothing to do");
            }
            Ok(0)
        }
        Err(onyo::OnyoError::NotARepository { .. }) => {
            let repo = Repository::init(&adapter, &start)?;
            if !args.common.quiet {
                println!("Initialized empty onyo repository in {}/.onyo", repo.root().display());
            }
            Ok(0)
        }
        Err(err) => Err(err.into()),
    }
}
