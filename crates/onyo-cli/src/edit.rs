//! `onyo edit ASSET...`

use std::path::PathBuf;
use std::process::Command;

use anyhow::{Context, Result};
use clap::Args;
use onyo::Repository;
use onyo_git::GitAdapter as _;

use crate::common::{open_adapter, CommonArgs};

/// Open one or more assets in the configured editor.
#[derive(Args, Debug)]
pub struct EditArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Assets to edit.
    #[arg(required = true)]
    pub assets: Vec<PathBuf>,
}

pub fn run(args: &EditArgs) -> Result<i32> {
    let adapter = open_adapter(&args.common)?;
    let repo = Repository::open(&adapter, &args.common.start_path())?;
    repo.require_clean()?;

    let view = repo.view()?;
    let resolver = repo.resolver();
    let editor = resolver.editor();

    let mut txn = repo.transaction()?;
    let mut touched = 0;

    for asset in &args.assets {
        let kind = view
            .asset_kind(asset)
            .ok_or_else(|| onyo::OnyoError::NoSuchAsset { path: asset.clone() })?;
        let content_path = onyo::view::RepositoryView::content_path(asset, kind);
        let before = adapter.read_blob(&content_path)?;

        let scratch = std::env::temp_dir().join(format!(
            "onyo-edit-{}",
            asset.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default()
        ));
        std::fs::write(&scratch, &before)?;

        let status = Command::new(&editor)
            .arg(&scratch)
            .status()
            .with_context(|| format!("spawning editor '{editor}'"))?;
        if !status.success() {
            let _ = std::fs::remove_file(&scratch);
            return Err(onyo::OnyoError::UserAbort.into());
        }

        let after = std::fs::read_to_string(&scratch)?;
        let _ = std::fs::remove_file(&scratch);

        if after.as_bytes() == before.as_slice() {
            continue;
        }

        let doc = onyo::yaml::Document::load(&after)
            .map_err(|e| onyo::OnyoError::MalformedDocument { path: content_path, detail: e.to_string() })?;
        let patch = onyo::yaml::Patch {
            set: doc.to_value_map().into_iter().collect(),
            unset: Vec::new(),
        };
        txn.overlay_mut().load_asset(asset, &adapter)?;
        txn.push(onyo::operation::Operation::ModifyAsset { path: asset.clone(), patch })?;
        touched += 1;
    }

    if touched == 0 {
        if !args.common.quiet {
            println!("nothing changed");
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
