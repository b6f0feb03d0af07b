//! Commit message composition: `⟨verb⟩ [N]: ⟨names⟩` subject, with a
//! grouped `--- Inventory Operations ---` body section.
//!
//! Grounded on the teacher's own commit-message helpers (structured,
//! single-purpose builders rather than ad hoc `format!` scattered through
//! the call sites) adapted to this system's grouping rules.

use std::collections::BTreeMap;

use crate::operation::{OpGroup, Operation};

const HEADER: &str = "--- Inventory Operations ---";

/// Compose a commit message for a batch of operations.
///
/// If `subject_override` is `Some`, it's used verbatim as the subject line
/// (the `--message`/`-m` flag); otherwise one is generated from `ops` unless
/// `auto_message` is `false`, in which case the subject is a generic
/// placeholder.
#[must_use]
pub fn compose_message(ops: &[Operation], subject_override: Option<&str>, auto_message: bool) -> String {
    let body = compose_body(ops);
    let subject = match subject_override {
        Some(s) => s.to_owned(),
        None if auto_message => compose_subject(ops),
        None => "onyo: unannotated change".to_owned(),
    };
    if body.is_empty() {
        subject
    } else {
        format!("{subject}\n\n{body}")
    }
}

fn compose_subject(ops: &[Operation]) -> String {
    let verb = ops.first().map_or("onyo", Operation::verb);
    let names: Vec<String> = ops
        .iter()
        .map(|op| {
            let (primary, _) = op.display_paths();
            primary.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default()
        })
        .collect();
    format!("{verb} [{}]: {}", ops.len(), names.join(", "))
}

fn compose_body(ops: &[Operation]) -> String {
    let mut groups: BTreeMap<&'static str, Vec<String>> = BTreeMap::new();
    for op in ops {
        let (label, line) = group_line(op);
        groups.entry(label).or_default().push(line);
    }
    if groups.is_empty() {
        return String::new();
    }
    let mut out = String::new();
    out.push_str(HEADER);
    out.push('\n');
    for label in SECTION_ORDER {
        if let Some(lines) = groups.get(label) {
            out.push_str(label);
            out.push('\n');
            for line in lines {
                out.push_str("- ");
                out.push_str(line);
                out.push('\n');
            }
        }
    }
    out.trim_end().to_owned()
}

const SECTION_ORDER: &[&str] = &[
    "New assets:",
    "New directories:",
    "Moved assets:",
    "Moved directories:",
    "Modified assets:",
    "Removed assets:",
    "Removed directories:",
];

fn group_line(op: &Operation) -> (&'static str, String) {
    let (primary, origin) = op.display_paths();
    let line = match origin {
        Some(origin) => format!("{} -> {}", origin.display(), primary.display()),
        None => primary.display().to_string(),
    };
    let label = match op.group() {
        OpGroup::NewAsset => "New assets:",
        OpGroup::NewDirectory => "New directories:",
        OpGroup::MovedAsset => "Moved assets:",
        OpGroup::MovedDirectory => "Moved directories:",
        OpGroup::ModifiedAsset => "Modified assets:",
        OpGroup::RemovedAsset => "Removed assets:",
        OpGroup::RemovedDirectory => "Removed directories:",
    };
    (label, line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use std::path::PathBuf;

    #[test]
    fn subject_for_single_new_asset() {
        let ops = vec![Operation::NewAsset {
            path: PathBuf::from("shelf/laptop_dell_xps13.abc123"),
            body: IndexMap::new(),
            is_directory: false,
        }];
        let message = compose_message(&ops, None, true);
        assert!(message.starts_with("new [1]: laptop_dell_xps13.abc123"));
    }

    #[test]
    fn body_groups_by_operation_kind() {
        let ops = vec![
            Operation::NewDirectory { path: PathBuf::from("shelf") },
            Operation::NewAsset {
                path: PathBuf::from("shelf/laptop_dell_xps13.abc123"),
                body: IndexMap::new(),
                is_directory: false,
            },
        ];
        let message = compose_message(&ops, None, true);
        assert!(message.contains(HEADER));
        assert!(message.contains("New directories:\n- shelf"));
        assert!(message.contains("New assets:\n- shelf/laptop_dell_xps13.abc123"));
    }

    #[test]
    fn moved_asset_shows_arrow() {
        let ops = vec![Operation::MoveAsset {
            from: PathBuf::from("shelf/a.1"),
            to_dir: PathBuf::from("closet"),
        }];
        let message = compose_message(&ops, None, true);
        assert!(message.contains("shelf/a.1 -> closet"));
    }

    #[test]
    fn subject_override_is_used_verbatim() {
        let ops = vec![Operation::RemoveAsset { path: PathBuf::from("shelf/a.1") }];
        let message = compose_message(&ops, Some("cleanup old assets"), true);
        assert!(message.starts_with("cleanup old assets"));
    }

    #[test]
    fn no_auto_message_uses_placeholder_subject() {
        let ops = vec![Operation::RemoveAsset { path: PathBuf::from("shelf/a.1") }];
        let message = compose_message(&ops, None, false);
        assert!(message.starts_with("onyo: unannotated change"));
    }
}
