//! Reflog output parser.
//!
//! The accessor asks `git log --walk-reflogs --date=unix` for [`REFLOG_FORMAT`], which
//! puts one entry per line with its fields separated by the ASCII unit separator (`0x1f`).
//! Neither the selector, the reflog message nor a commit subject can contain that byte, so
//! splitting is unambiguous.
//!
//! With `--date=unix` git prints the selector as `ref@{<seconds>}`, the time the reflog
//! entry was written. The `N` of `ref@{N}` is the entry's position in the walk.

use super::is_object_id;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// `--format` for `git log --walk-reflogs`: hash, selector, reflog message,
/// committer timestamp, author name, author email, subject.
pub const REFLOG_FORMAT: &str = "%H%x1f%gD%x1f%gs%x1f%ct%x1f%an%x1f%ae%x1f%s";

/// Makes `%gD` carry the reflog time instead of the index.
pub const REFLOG_DATE: &str = "--date=unix";

const FIELD_SEPARATOR: char = '\u{1f}';

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReflogEntry {
    /// `N` of the `ref@{N}` selector.
    pub index: usize,
    pub selector: String,
    pub revision: String,
    pub message: String,
    /// When the reflog entry was written.
    pub timestamp: DateTime<Utc>,
    /// Committer time of `revision`.
    pub commit_time: DateTime<Utc>,
    pub author_name: String,
    pub author_email: String,
    pub subject: String,
}

pub fn parse_reflog(output: &str) -> Vec<ReflogEntry> {
    output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .enumerate()
        .filter_map(|(index, line)| {
            let entry = parse_line(index, line);
            if entry.is_none() {
                log::debug!("Skipping malformed reflog line: {line:?}");
            }
            entry
        })
        .collect()
}

fn parse_line(index: usize, line: &str) -> Option<ReflogEntry> {
    let fields: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
    let [revision, selector, message, commit_time, author_name, author_email, subject] =
        fields.as_slice()
    else {
        return None;
    };

    if !is_object_id(revision) {
        return None;
    }
    let (name, reflog_time) = split_selector(selector)?;
    let reflog_seconds = reflog_time.parse::<i64>().ok()?;
    let commit_seconds = commit_time.trim().parse::<i64>().ok()?;

    Some(ReflogEntry {
        index,
        selector: format!("{name}@{{{index}}}"),
        revision: revision.to_string(),
        message: message.to_string(),
        timestamp: DateTime::from_timestamp(reflog_seconds, 0)?,
        commit_time: DateTime::from_timestamp(commit_seconds, 0)?,
        author_name: author_name.to_string(),
        author_email: author_email.to_string(),
        subject: subject.to_string(),
    })
}

/// `("refs/heads/main", "N")` from `refs/heads/main@{N}`.
pub(crate) fn split_selector(selector: &str) -> Option<(&str, &str)> {
    let start = selector.rfind("@{")?;
    let value = selector[start + 2..].strip_suffix('}')?;
    Some((&selector[..start], value))
}
