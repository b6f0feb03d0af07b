//! `onyo get`

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use onyo::query::{Query, Row, SortKey};
use onyo::Repository;
use onyo_git::GitAdapter as _;

use crate::common::{open_adapter, CommonArgs};

/// Query tracked assets.
#[derive(Args, Debug)]
pub struct GetArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Columns to print (dotted keys); defaults to every key seen.
    #[arg(short = 'k', long = "keys", value_name = "KEY", num_args = 1..)]
    pub keys: Vec<String>,

    /// Only include rows whose KEY value matches REGEX (`key=regex`, repeatable, AND-combined).
    #[arg(short = 'M', long = "match", value_name = "KEY=REGEX", num_args = 1..)]
    pub matches: Vec<String>,

    /// Restrict the search to these directories (defaults to the repository root).
    #[arg(short = 'i', long = "include", value_name = "DIR", num_args = 1..)]
    pub include: Vec<PathBuf>,

    /// Exclude these directories.
    #[arg(short = 'e', long = "exclude", value_name = "DIR", num_args = 1..)]
    pub exclude: Vec<PathBuf>,

    /// Limit recursion depth relative to the nearest matching include.
    #[arg(short = 'd', long = "depth", value_name = "N")]
    pub depth: Option<usize>,

    /// Sort ascending by KEY (repeatable, later keys break ties).
    #[arg(short = 's', long = "sort", value_name = "KEY", num_args = 1..)]
    pub sort: Vec<String>,

    /// Sort descending by KEY (repeatable, later keys break ties).
    #[arg(short = 'S', long = "sort-descending", value_name = "KEY", num_args = 1..)]
    pub sort_descending: Vec<String>,

    /// Machine-readable output: tab-separated, no header.
    #[arg(short = 'H', long = "machine-readable")]
    pub machine_readable: bool,

    /// Restrict to assets (`a`), directories (`d`), or both (default both).
    #[arg(short = 't', long = "types", value_name = "TYPE")]
    pub types: Option<String>,
}

pub fn run(args: &GetArgs) -> Result<i32> {
    let adapter = open_adapter(&args.common)?;
    let repo = Repository::open(&adapter, &args.common.start_path())?;
    let view = repo.view()?;

    let mut matches = Vec::new();
    for raw in &args.matches {
        let Some((key, pattern)) = raw.split_once('=') else {
            bail!("expected key=regex, got '{raw}'");
        };
        let regex = regex::Regex::new(pattern).with_context(|| format!("invalid regex in '{raw}'"))?;
        matches.push(onyo::query::MatchPredicate { key: key.to_owned(), pattern: regex });
    }

    let mut sort = Vec::new();
    for key in &args.sort {
        sort.push(SortKey { key: key.clone(), descending: false });
    }
    for key in &args.sort_descending {
        sort.push(SortKey { key: key.clone(), descending: true });
    }

    let want_assets = args.types.as_deref().is_none_or(|t| t.contains('a'));
    let want_dirs = args.types.as_deref().is_some_and(|t| t.contains('d'));

    let query = Query {
        include: args.include.clone(),
        exclude: args.exclude.clone(),
        depth: args.depth,
        matches,
        keys: args.keys.clone(),
        sort,
    };

    let mut paths: Vec<&std::path::Path> = Vec::new();
    if want_assets {
        paths.extend(view.asset_paths());
    }
    if want_dirs {
        paths.extend(view.directory_paths());
    }

    let mut bodies = Vec::new();
    for path in &paths {
        let kind = view.asset_kind(path);
        let content_path = match kind {
            Some(k) => onyo::view::RepositoryView::content_path(path, k),
            None => continue,
        };
        match adapter.read_blob(&content_path) {
            Ok(bytes) => {
                let text = String::from_utf8_lossy(&bytes);
                match onyo::yaml::Document::load(&text) {
                    Ok(doc) => bodies.push((*path, doc.to_value_map())),
                    Err(e) => eprintln!("onyo: {}: {e}", content_path.display()),
                }
            }
            Err(e) => eprintln!("onyo: {}: {e}", content_path.display()),
        }
    }

    let rows: Vec<Row> = bodies.iter().map(|(path, body)| Row { path: *path, body }).collect();
    let results = query.run(&rows);

    if results.is_empty() {
        return Ok(1);
    }

    for row in &results {
        if args.machine_readable {
            println!("{}", row.to_tsv_line());
        } else {
            let rendered: Vec<String> = row
                .values
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect();
            println!("{}\t{}", row.path.display(), rendered.join("\t"));
        }
    }

    Ok(0)
}
