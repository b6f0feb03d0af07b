//! `onyo show PATH...`

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use onyo::Repository;
use onyo_git::GitAdapter as _;

use crate::common::{open_adapter, CommonArgs};

/// Print a rendered summary of one or more assets or directories.
#[derive(Args, Debug)]
pub struct ShowArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Paths to show.
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Print paths relative to BASE instead of the repository root.
    #[arg(short = 'b', long = "base-path", value_name = "BASE")]
    pub base_path: Option<PathBuf>,
}

pub fn run(args: &ShowArgs) -> Result<i32> {
    let adapter = open_adapter(&args.common)?;
    let repo = Repository::open(&adapter, &args.common.start_path())?;
    let view = repo.view()?;

    for path in &args.paths {
        let display_path = match &args.base_path {
            Some(base) => path.strip_prefix(base).unwrap_or(path),
            None => path,
        };

        if let Some(kind) = view.asset_kind(path) {
            println!("{}", display_path.display());
            let content_path = onyo::view::RepositoryView::content_path(path, kind);
            let bytes = adapter.read_blob(&content_path)?;
            let text = String::from_utf8_lossy(&bytes);
            let doc = onyo::yaml::Document::load(&text)
                .map_err(|e| onyo::OnyoError::MalformedDocument { path: content_path, detail: e.to_string() })?;
            for (key, value) in doc.to_value_map() {
                println!("  {key}: {}", value.render_token());
            }
        } else if view.is_directory(path) {
            println!("{}/", display_path.display());
        } else {
            return Err(onyo::OnyoError::NoSuchAsset { path: path.clone() }.into());
        }
    }

    Ok(0)
}
