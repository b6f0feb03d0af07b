//! `onyo tree DIR...`

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use onyo::Repository;

use crate::common::{open_adapter, CommonArgs};

/// Print the tracked directory tree.
#[derive(Args, Debug)]
pub struct TreeArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Directories to print (defaults to the repository root).
    pub dirs: Vec<PathBuf>,

    /// Only print directories, not assets.
    #[arg(short = 'd', long = "dirs-only")]
    pub dirs_only: bool,
}

pub fn run(args: &TreeArgs) -> Result<i32> {
    let adapter = open_adapter(&args.common)?;
    let repo = Repository::open(&adapter, &args.common.start_path())?;
    let view = repo.view()?;

    let roots: Vec<PathBuf> = if args.dirs.is_empty() {
        vec![PathBuf::from(".")]
    } else {
        args.dirs.clone()
    };

    for root in &roots {
        println!("{}", root.display());
        let mut entries: Vec<&std::path::Path> = view.directory_paths();
        if !args.dirs_only {
            entries.extend(view.asset_paths());
        }
        let mut under: Vec<&std::path::Path> = entries
            .into_iter()
            .filter(|p| p.starts_with(root) && *p != root.as_path())
            .collect();
        under.sort();
        for entry in under {
            let depth = entry.strip_prefix(root).map(|p| p.components().count()).unwrap_or(1);
            let indent = "  ".repeat(depth.saturating_sub(1));
            let name = entry.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
            println!("{indent}{name}");
        }
    }

    Ok(0)
}
