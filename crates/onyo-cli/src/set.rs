//! `onyo set -k KEY=VALUE... -a ASSET...`

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use onyo::operation::Operation;
use onyo::yaml::Patch;
use onyo::Repository;
use onyo_git::GitAdapter;

use crate::common::{open_adapter, CommonArgs};
use crate::kv;

/// Set one or more document fields on one or more assets.
#[derive(Args, Debug)]
pub struct SetArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Field assignments (`key=value`, dotted keys address nested mappings).
    #[arg(short = 'k', long = "keys", value_name = "KEY=VALUE", num_args = 1..)]
    pub keys: Vec<String>,

    /// Assets to modify.
    #[arg(short = 'a', long = "asset", required = true, value_name = "ASSET", num_args = 1..)]
    pub assets: Vec<PathBuf>,

    /// Allow this set to rename the asset when it touches a bound field.
    #[arg(long = "rename")]
    pub rename: bool,
}

pub fn run(args: &SetArgs) -> Result<i32> {
    let adapter = open_adapter(&args.common)?;
    run_with_adapter(args, &adapter)
}

/// The adapter-generic core of `onyo set`, split out from [`run`] so it can
/// be driven against a [`onyo_git::FakeGitAdapter`] in tests without
/// shelling out to real git.
pub fn run_with_adapter(args: &SetArgs, adapter: &dyn GitAdapter) -> Result<i32> {
    let repo = Repository::open(adapter, &args.common.start_path())?;
    repo.require_clean()?;

    let pairs = kv::parse_pairs(&args.keys)?;
    let patch = Patch { set: pairs.into_iter().collect(), unset: Vec::new() };

    let template = repo.name_template()?;
    let mut txn = repo.transaction()?;

    for path in &args.assets {
        txn.overlay_mut().load_asset(path, adapter)?;

        if args.rename {
            let asset = txn.overlay_mut().require_asset(path, &template)?;
            let bound_keys: Vec<&str> = patch
                .touched_top_level_keys()
                .into_iter()
                .filter(|k| asset.bound_fields.contains_key(*k))
                .collect();
            if !bound_keys.is_empty() {
                let mut fields = asset.bound_fields.clone();
                for (key, value) in &patch.set {
                    if fields.contains_key(key) {
                        fields.insert(key.clone(), value.render_token());
                    }
                }
                let new_name = template
                    .render(&fields)
                    .map_err(|e| onyo::OnyoError::InvalidAssetName { name: e.value, clause: e.reason })?;
                let to = path.parent().unwrap_or(std::path::Path::new("")).join(new_name);
                txn.push(Operation::RenameAsset { from: path.clone(), to: to.clone() })?;

                let remaining = onyo::yaml::Patch {
                    set: patch.set.iter().filter(|(k, _)| !bound_keys.contains(&k.as_str())).cloned().collect(),
                    unset: Vec::new(),
                };
                if !remaining.set.is_empty() {
                    txn.push(Operation::ModifyAsset { path: to, patch: remaining })?;
                }
                continue;
            }
        }

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

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use onyo::model::value::Value;
    use onyo_git::FakeGitAdapter;
    use std::path::Path;

    fn common_args(dir: &Path) -> CommonArgs {
        CommonArgs {
            directory: Some(dir.to_path_buf()),
            quiet: true,
            ..CommonArgs::default()
        }
    }

    #[test]
    fn set_with_rename_moves_bound_field_into_path() {
        let dir = tempfile::tempdir().unwrap();
        let adapter = FakeGitAdapter::new(dir.path().to_path_buf());
        let repo = Repository::init(&adapter, dir.path()).unwrap();
        adapter.write_file(Path::new("user/.anchor"), b"");

        let mut body = IndexMap::new();
        body.insert("make".to_owned(), Value::from("apple"));
        body.insert("model".to_owned(), Value::from("macbookpro"));
        body.insert("serial".to_owned(), Value::from("867"));
        let mut txn = repo.transaction().unwrap();
        txn.push(Operation::NewAsset {
            path: PathBuf::from("user/laptop_apple_macbookpro.867"),
            body,
            is_directory: false,
        })
        .unwrap();
        txn.commit(dir.path(), None, true).unwrap();

        let args = SetArgs {
            common: common_args(dir.path()),
            keys: vec!["serial=99".to_owned()],
            assets: vec![PathBuf::from("user/laptop_apple_macbookpro.867")],
            rename: true,
        };
        run_with_adapter(&args, &adapter).unwrap();

        let view = onyo::view::RepositoryView::rebuild(&adapter).unwrap();
        assert!(view.has_asset(Path::new("user/laptop_apple_macbookpro.99")));
        assert!(!view.has_asset(Path::new("user/laptop_apple_macbookpro.867")));

        let kind = view.asset_kind(Path::new("user/laptop_apple_macbookpro.99")).unwrap();
        let content_path =
            onyo::view::RepositoryView::content_path(Path::new("user/laptop_apple_macbookpro.99"), kind);
        let bytes = adapter.read_blob(&content_path).unwrap();
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("99"));
    }
}
