//! `onyo mv SRC... DST`

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;
use onyo::operation::Operation;
use onyo::Repository;

use crate::common::{open_adapter, CommonArgs};

/// Rename or move one or more assets/directories.
#[derive(Args, Debug)]
pub struct MvArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Sources followed by a single destination.
    #[arg(required = true, num_args = 2..)]
    pub paths: Vec<PathBuf>,
}

pub fn run(args: &MvArgs) -> Result<i32> {
    let adapter = open_adapter(&args.common)?;
    let repo = Repository::open(&adapter, &args.common.start_path())?;
    repo.require_clean()?;

    let Some((dst, sources)) = args.paths.split_last() else {
        bail!("expected at least one SRC and a DST");
    };

    let view = repo.view()?;
    let mut txn = repo.transaction()?;
    let dst_is_dir = view.is_directory(dst);

    if sources.len() > 1 && !dst_is_dir {
        bail!("'{}' is not a directory; cannot move multiple sources into it", dst.display());
    }

    for src in sources {
        if view.asset_kind(src).is_some() {
            if dst_is_dir {
                txn.push(Operation::MoveAsset { from: src.clone(), to_dir: dst.clone() })?;
            } else {
                txn.push(Operation::RenameAsset { from: src.clone(), to: dst.clone() })?;
            }
        } else if view.is_directory(src) {
            if dst_is_dir {
                txn.push(Operation::MoveDirectory { from: src.clone(), to_dir: dst.clone() })?;
            } else {
                bail!("'{}' exists but is not a directory; cannot rename a directory onto it", dst.display());
            }
        } else {
            return Err(onyo::OnyoError::NoSuchAsset { path: src.clone() }.into());
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

