//! `git ls-tree -z -l` output parser.
//!
//! Each record is `<mode> SP <type> SP <object> SP+ <size> TAB <path>` and records are
//! NUL-terminated, so paths arrive unquoted. `<size>` is `-` for trees and submodules,
//! and is missing entirely when `-l` was not given.

use super::is_object_id;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TreeEntryKind {
    Blob { size: Option<u64> },
    Tree,
    /// A submodule: the object is a commit in another repository.
    Commit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeEntry {
    pub mode: u32,
    #[serde(flatten)]
    pub kind: TreeEntryKind,
    pub object: String,
    /// Path from the root of the tree, `/`-separated.
    pub path: String,
}

impl TreeEntry {
    /// Last path component.
    pub fn name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

pub fn parse_tree_content(output: &str) -> Vec<TreeEntry> {
    output
        .split('\0')
        .map(|record| record.trim_start_matches('\n'))
        .filter(|record| !record.is_empty())
        .filter_map(|record| {
            let entry = parse_record(record);
            if entry.is_none() {
                log::debug!("Skipping malformed tree record: {record:?}");
            }
            entry
        })
        .collect()
}

fn parse_record(record: &str) -> Option<TreeEntry> {
    let (meta, path) = record.split_once('\t')?;
    if path.is_empty() {
        return None;
    }

    let mut fields = meta.split_whitespace();
    let mode = u32::from_str_radix(fields.next()?, 8).ok()?;
    let kind = fields.next()?;
    let object = fields.next()?;
    let size = fields.next();
    if fields.next().is_some() || !is_object_id(object) {
        return None;
    }

    let kind = match kind {
        "blob" => TreeEntryKind::Blob {
            size: match size {
                None | Some("-") => None,
                Some(size) => Some(size.parse().ok()?),
            },
        },
        "tree" => TreeEntryKind::Tree,
        "commit" => TreeEntryKind::Commit,
        _ => return None,
    };

    Some(TreeEntry {
        mode,
        kind,
        object: object.to_string(),
        path: path.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLOB: &str = "e69de29bb2d1d6434b8b29ae775ad8c2e48c5391";
    const TREE: &str = "4b825dc642cb6eb9a060e54bf8d69288fbee4904";

    #[test]
    fn test_parse_long_format() {
        let output = format!(
            "100644 blob {BLOB}     123\tsrc/main.rs\0\
             040000 tree {TREE}       -\tsrc\0\
             160000 commit {BLOB}       -\tvendor/lib\0"
        );
        let entries = parse_tree_content(&output);
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].mode, 0o100644);
        assert_eq!(entries[0].kind, TreeEntryKind::Blob { size: Some(123) });
        assert_eq!(entries[0].name(), "main.rs");
        assert_eq!(entries[1].kind, TreeEntryKind::Tree);
        assert_eq!(entries[2].kind, TreeEntryKind::Commit);
        assert_eq!(entries[2].path, "vendor/lib");
    }

    #[test]
    fn test_parse_without_sizes() {
        let output = format!("100755 blob {BLOB}\tscript.sh\0");
        let entries = parse_tree_content(&output);
        assert_eq!(entries[0].kind, TreeEntryKind::Blob { size: None });
        assert_eq!(entries[0].mode, 0o100755);
    }

    #[test]
    fn test_path_with_spaces_and_tabs() {
        let output = format!("100644 blob {BLOB} 5\tdocs/read me\twith tab.txt\0");
        let entries = parse_tree_content(&output);
        assert_eq!(entries[0].path, "docs/read me\twith tab.txt");
    }

    #[test]
    fn test_malformed_records_are_skipped() {
        let output = format!(
            "100644 blob {BLOB} 1\ta.txt\0\
             not a record\0\
             100644 blob {BLOB} 2\tb.txt\0\
             100644 blob nothex 3\tc.txt\0\
             100644 symlink {BLOB} 3\td.txt\0\
             100644 blob {BLOB} big\te.txt\0\
             100644 blob {BLOB} 4\tf.txt\0"
        );
        let names: Vec<String> = parse_tree_content(&output)
            .into_iter()
            .map(|e| e.path)
            .collect();
        assert_eq!(names, vec!["a.txt", "b.txt", "f.txt"]);
    }

    #[test]
    fn test_serializes_with_type_tag() {
        let entry = TreeEntry {
            mode: 0o100644,
            kind: TreeEntryKind::Blob { size: Some(3) },
            object: BLOB.to_string(),
            path: "a.txt".to_string(),
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["type"], "blob");
        assert_eq!(json["size"], 3);
    }
}
