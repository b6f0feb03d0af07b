//! `onyo rm PATH...`

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use onyo::operation::Operation;
use onyo::Repository;

use crate::common::{open_adapter, CommonArgs};

/// Remove one or more assets or directories.
#[derive(Args, Debug)]
pub struct RmArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Paths to remove.
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Remove populated directories too.
    #[arg(short = 'r', long = "recursive")]
    pub recursive: bool,
}

pub fn run(args: &RmArgs) -> Result<i32> {
    let adapter = open_adapter(&args.common)?;
    let repo = Repository::open(&adapter, &args.common.start_path())?;
    repo.require_clean()?;

    let view = repo.view()?;
    let mut txn = repo.transaction()?;
    for path in &args.paths {
        if view.asset_kind(path).is_some() {
            txn.push(Operation::RemoveAsset { path: path.clone() })?;
        } else if view.is_directory(path) {
            txn.push(Operation::RemoveDirectory { path: path.clone(), recursive: args.recursive })?;
        } else {
            return Err(onyo::OnyoError::NoSuchAsset { path: path.clone() }.into());
        }
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
