//! `onyo tsv-to-yaml FILE`

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use onyo::yaml::{value_map_to_entries, Document};
use indexmap::IndexMap;

use crate::kv;

/// Convert a TSV file into a sequence of YAML documents on stdout.
#[derive(Args, Debug)]
pub struct TsvToYamlArgs {
    /// TSV file to convert (first line is the header row).
    pub file: PathBuf,
}

pub fn run(args: &TsvToYamlArgs) -> Result<i32> {
    let text =
        std::fs::read_to_string(&args.file).with_context(|| format!("reading '{}'", args.file.display()))?;
    let mut lines = text.lines();
    let Some(header) = lines.next() else {
        return Ok(0);
    };
    let columns: Vec<&str> = header.split('\t').collect();

    for row in lines {
        if row.trim().is_empty() {
            continue;
        }
        let cells: Vec<&str> = row.split('\t').collect();
        let mut body = IndexMap::new();
        for (col, cell) in columns.iter().zip(cells.iter()) {
            if !col.is_empty() && !cell.is_empty() {
                body.insert((*col).to_owned(), kv::parse_scalar(cell));
            }
        }
        let doc = Document { leading_comments: Vec::new(), root: value_map_to_entries(body) };
        println!("---");
        print!("{}", doc.dump());
    }

    Ok(0)
}
