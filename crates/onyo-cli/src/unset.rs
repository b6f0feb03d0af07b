//! `onyo unset -k KEY... -a ASSET...`

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use onyo::operation::Operation;
use onyo::yaml::Patch;
use onyo::Repository;

use crate::common::{open_adapter, CommonArgs};

/// Remove one or more document fields from one or more assets.
#[derive(Args, Debug)]
pub struct UnsetArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Dotted keys to remove.
    #[arg(short = 'k', long = "keys", value_name = "KEY", required = true, num_args = 1..)]
    pub keys: Vec<String>,

    /// Assets to modify.
    #[arg(short = 'a', long = "asset", required = true, value_name = "ASSET", num_args = 1..)]
    pub assets: Vec<PathBuf>,
}

pub fn run(args: &UnsetArgs) -> Result<i32> {
    let adapter = open_adapter(&args.common)?;
    let repo = Repository::open(&adapter, &args.common.start_path())?;
    repo.require_clean()?;

    let patch = Patch { set: Vec::new(), unset: args.keys.clone() };
    let mut txn = repo.transaction()?;

    for path in &args.assets {
        txn.overlay_mut().load_asset(path, &adapter)?;
        txn.push(Operation::ModifyAsset { path: path.clone(), patch: patch.clone() })?;
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
