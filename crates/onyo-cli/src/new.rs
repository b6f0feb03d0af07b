//! `onyo new`

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use indexmap::IndexMap;
use onyo::model::name::{generate_faux_serial, DEFAULT_FAUX_SERIAL_ATTEMPTS, DEFAULT_FAUX_SERIAL_LEN};
use onyo::model::value::Value;
use onyo::operation::Operation;
use onyo::Repository;
use clap::Args;

use crate::common::{open_adapter, CommonArgs};
use crate::kv;

/// Create a new asset.
#[derive(Args, Debug)]
pub struct NewArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Field assignments for the new asset's document body (`key=value`).
    #[arg(short = 'k', long = "keys", value_name = "KEY=VALUE", num_args = 1..)]
    pub keys: Vec<String>,

    /// Directory the asset is created in.
    #[arg(short = 'd', long = "directory", value_name = "DIR", default_value = ".")]
    pub directory: PathBuf,

    /// Named template to seed the body from (defaults to `onyo.new.template`).
    #[arg(short = 't', long = "template")]
    pub template: Option<String>,

    /// Existing asset to clone the body from before applying `--keys`.
    #[arg(short = 'c', long = "clone", value_name = "ASSET")]
    pub clone: Option<PathBuf>,

    /// Open the new asset's document in an editor before committing.
    #[arg(short = 'e', long = "edit")]
    pub edit: bool,

    /// A TSV file of rows to create in a single batch instead of one asset.
    #[arg(long = "tsv", value_name = "FILE")]
    pub tsv: Option<PathBuf>,
}

pub fn run(args: &NewArgs) -> Result<i32> {
    let adapter = open_adapter(&args.common)?;
    let repo = Repository::open(&adapter, &args.common.start_path())?;
    repo.require_clean()?;

    let view = repo.view()?;
    let template = repo.name_template()?;
    let mut txn = repo.transaction()?;

    if let Some(tsv_path) = &args.tsv {
        let text = std::fs::read_to_string(tsv_path)
            .with_context(|| format!("reading '{}'", tsv_path.display()))?;
        let mut lines = text.lines();
        let Some(header) = lines.next() else {
            bail!("'{}' is empty", tsv_path.display());
        };
        let columns: Vec<&str> = header.split('\t').collect();
        for row in lines {
            if row.trim().is_empty() {
                continue;
            }
            let cells: Vec<&str> = row.split('\t').collect();
            let mut body = IndexMap::new();
            let mut directory = args.directory.clone();
            for (col, cell) in columns.iter().zip(cells.iter()) {
                if *col == "directory" {
                    directory = PathBuf::from(cell);
                } else if !col.is_empty() && !cell.is_empty() {
                    body.insert((*col).to_owned(), kv::parse_scalar(cell));
                }
            }
            let path = build_asset_path(&directory, &mut body, &template, &view)?;
            txn.push(Operation::NewAsset { path, body, is_directory: false })?;
        }
    } else {
        let mut body = kv::parse_pairs(&args.keys)?;
        if let Some(clone_from) = &args.clone {
            let kind = view.asset_kind(clone_from).ok_or_else(|| onyo::OnyoError::NoSuchAsset {
                path: clone_from.clone(),
            })?;
            let content_path = onyo::view::RepositoryView::content_path(clone_from, kind);
            let bytes = adapter_read_blob(&adapter, &content_path)?;
            let text = String::from_utf8_lossy(&bytes);
            let doc = onyo::yaml::Document::load(&text)
                .map_err(|e| onyo::OnyoError::MalformedDocument { path: content_path, detail: e.to_string() })?;
            for (k, v) in doc.to_value_map() {
                body.entry(k).or_insert(v);
            }
        }
        let path = build_asset_path(&args.directory, &mut body, &template, &view)?;
        txn.push(Operation::NewAsset { path, body, is_directory: false })?;
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

fn adapter_read_blob(adapter: &onyo_git::GixGitAdapter, path: &std::path::Path) -> Result<Vec<u8>> {
    use onyo_git::GitAdapter as _;
    Ok(adapter.read_blob(path)?)
}

fn build_asset_path(
    directory: &std::path::Path,
    body: &mut IndexMap<String, Value>,
    template: &onyo::model::name::NameTemplate,
    view: &onyo::view::RepositoryView,
) -> Result<PathBuf> {
    let mut fields = IndexMap::new();
    for field in template.field_names() {
        if let Some(value) = body.get(field) {
            fields.insert(field.to_owned(), value.render_token());
        } else if field == template.tail_field() {
            let known = fields.clone();
            let serial = generate_faux_serial(DEFAULT_FAUX_SERIAL_LEN, DEFAULT_FAUX_SERIAL_ATTEMPTS, |candidate| {
                let mut probe = known.clone();
                probe.insert(field.to_owned(), candidate.to_owned());
                template.render(&probe).is_ok_and(|name| view.resolve(&name).is_some())
            })
            .map_err(|attempts| onyo::OnyoError::FauxSerialExhausted { attempts })?;
            body.insert(field.to_owned(), Value::String(serial.clone()));
            fields.insert(field.to_owned(), serial);
        } else {
            bail!(onyo::OnyoError::InvalidAssetName {
                name: String::new(),
                clause: format!("missing value for field '{field}'"),
            });
        }
    }
    let name = template
        .render(&fields)
        .map_err(|e| onyo::OnyoError::InvalidAssetName { name: e.value, clause: e.reason })?;
    Ok(directory.join(name))
}
