//! `onyo cat ASSET...`

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use onyo::Repository;
use onyo_git::GitAdapter as _;

use crate::common::{open_adapter, CommonArgs};

/// Print the raw YAML document of one or more assets.
#[derive(Args, Debug)]
pub struct CatArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Assets to print.
    #[arg(required = true)]
    pub assets: Vec<PathBuf>,
}

pub fn run(args: &CatArgs) -> Result<i32> {
    let adapter = open_adapter(&args.common)?;
    let repo = Repository::open(&adapter, &args.common.start_path())?;
    let view = repo.view()?;

    for asset in &args.assets {
        let kind = view
            .asset_kind(asset)
            .ok_or_else(|| onyo::OnyoError::NoSuchAsset { path: asset.clone() })?;
        let content_path = onyo::view::RepositoryView::content_path(asset, kind);
        let bytes = adapter.read_blob(&content_path)?;
        print!("{}", String::from_utf8_lossy(&bytes));
    }

    Ok(0)
}
