//! Structured result parsers.
//!
//! Each parser takes the stdout of one query command and returns fresh records in
//! output order. Lines or records that do not have the expected shape are skipped and
//! logged at debug level; one corrupt record never hides the rest of the output.

pub mod blob;
pub mod reflog;
pub mod remote;
pub mod tree;
pub mod user;

pub use blob::Blob;
pub use reflog::{parse_reflog, ReflogEntry, REFLOG_DATE, REFLOG_FORMAT};
pub use remote::{parse_remotes, Remote};
pub use tree::{parse_tree_content, TreeEntry, TreeEntryKind};
pub use user::{parse_users, User};

/// Full SHA-1 or SHA-256 object name.
pub(crate) fn is_object_id(name: &str) -> bool {
    matches!(name.len(), 40 | 64) && name.bytes().all(|b| b.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_ids() {
        assert!(is_object_id("0123456789abcdef0123456789abcdef01234567"));
        assert!(is_object_id(&"a".repeat(64)));
        assert!(!is_object_id("0123456"));
        assert!(!is_object_id("zz23456789abcdef0123456789abcdef01234567"));
    }
}
