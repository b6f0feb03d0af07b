//! `onyo fsck`

use anyhow::Result;
use clap::Args;
use onyo::Repository;
use onyo_git::GitAdapter as _;

use crate::common::{open_adapter, CommonArgs};

/// Check repository invariants: anchors, bound-field consistency, name uniqueness.
#[derive(Args, Debug)]
pub struct FsckArgs {
    #[command(flatten)]
    pub common: CommonArgs,
}

pub fn run(args: &FsckArgs) -> Result<i32> {
    let adapter = open_adapter(&args.common)?;
    let repo = Repository::open(&adapter, &args.common.start_path())?;
    let view = repo.view()?;
    let template = repo.name_template()?;

    let mut problems = Vec::new();

    for dir in view.directory_paths() {
        let anchor = dir.join(".anchor");
        if adapter.read_blob(&anchor).is_err() {
            problems.push(format!("missing anchor: {}", anchor.display()));
        }
    }

    let mut seen_names = std::collections::HashSet::new();
    for path in view.asset_paths() {
        let Some(basename) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            continue;
        };
        if !seen_names.insert(basename.clone()) {
            problems.push(format!("duplicate asset name: {basename}"));
        }

        let Some(kind) = view.asset_kind(path) else { continue };
        let content_path = onyo::view::RepositoryView::content_path(path, kind);
        let bytes = match adapter.read_blob(&content_path) {
            Ok(b) => b,
            Err(e) => {
                problems.push(format!("{}: {e}", content_path.display()));
                continue;
            }
        };
        let text = String::from_utf8_lossy(&bytes);
        let doc = match onyo::yaml::Document::load(&text) {
            Ok(d) => d,
            Err(e) => {
                problems.push(format!("{}: {e}", content_path.display()));
                continue;
            }
        };

        let body = doc.to_value_map();
        match onyo::model::asset::Asset::from_path_and_body(path.clone(), body, &template, matches!(kind, onyo::view::AssetKind::Directory)) {
            Ok(asset) => {
                if !asset.bound_fields_match_body() {
                    problems.push(format!("bound fields do not match path: {}", path.display()));
                }
            }
            Err(e) => problems.push(format!("{}: {e}", path.display())),
        }
    }

    if problems.is_empty() {
        if !args.common.quiet {
            println!("onyo: no problems found");
        }
        Ok(0)
    } else {
        for problem in &problems {
            println!("{problem}");
        }
        Ok(1)
    }
}
