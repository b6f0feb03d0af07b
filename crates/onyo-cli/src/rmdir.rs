//! `onyo rmdir DIR...`

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use onyo::operation::Operation;
use onyo::Repository;

use crate::common::{open_adapter, CommonArgs};

/// Remove one or more empty tracked directories.
#[derive(Args, Debug)]
pub struct RmdirArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Directories to remove.
    #[arg(required = true)]
    pub dirs: Vec<PathBuf>,
}

pub fn run(args: &RmdirArgs) -> Result<i32> {
    let adapter = open_adapter(&args.common)?;
    let repo = Repository::open(&adapter, &args.common.start_path())?;
    repo.require_clean()?;

    let view = repo.view()?;
    let mut txn = repo.transaction()?;
    for dir in &args.dirs {
        if view.asset_kind(dir) == Some(onyo::view::AssetKind::Directory) {
            txn.push(Operation::ConvertFromAssetDirectory { path: dir.clone() })?;
        } else if view.is_directory(dir) {
            txn.push(Operation::RemoveDirectory { path: dir.clone(), recursive: false })?;
        } else {
            return Err(onyo::OnyoError::NoSuchDirectory { path: dir.clone() }.into());
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
