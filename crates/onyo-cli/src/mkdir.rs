//! `onyo mkdir DIR...`

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use onyo::operation::Operation;
use onyo::Repository;

use crate::common::{open_adapter, CommonArgs};

/// Create one or more tracked directories.
#[derive(Args, Debug)]
pub struct MkdirArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Directories to create.
    #[arg(required = true)]
    pub dirs: Vec<PathBuf>,
}

pub fn run(args: &MkdirArgs) -> Result<i32> {
    let adapter = open_adapter(&args.common)?;
    let repo = Repository::open(&adapter, &args.common.start_path())?;
    repo.require_clean()?;

    let view = repo.view()?;
    let mut txn = repo.transaction()?;
    let mut pushed = 0;
    for dir in &args.dirs {
        if view.is_directory(dir) {
            continue;
        }
        txn.push(Operation::NewDirectory { path: dir.clone() })?;
        pushed += 1;
    }

    if pushed == 0 {
        if !args.common.quiet {
            println!("nothing to do, every directory already tracked");
        }
        return Ok(0);
    }

    let oid = txn.commit(
        repo.root(),
        args.common.subject_override().as_deref(),
        args.common.auto_message(),
    )?;
    if !args.common.quiet {
        match oid {
            Some(oid) => println!("committed {oid}"),
            None => println!("nothing to commit"),
        }
    }
    Ok(0)
}
