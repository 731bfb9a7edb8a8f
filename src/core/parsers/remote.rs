//! `git remote -v` output parser.
//!
//! Each remote appears once per direction: `origin<TAB>https://host/repo.git (fetch)`.
//! Lines are folded into one [`Remote`] per name, in order of first appearance.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Remote {
    pub name: String,
    pub fetch_url: Option<String>,
    pub push_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Fetch,
    Push,
}

fn parse_line(line: &str) -> Option<(&str, &str, Direction)> {
    let (name, rest) = line.split_once('\t')?;
    let (url, direction) = rest.trim_end().rsplit_once(' ')?;
    let direction = match direction {
        "(fetch)" => Direction::Fetch,
        "(push)" => Direction::Push,
        _ => return None,
    };
    if name.is_empty() || url.is_empty() {
        return None;
    }
    Some((name, url, direction))
}

pub fn parse_remotes(output: &str) -> Vec<Remote> {
    let mut remotes: Vec<Remote> = Vec::new();
    for line in output.lines().filter(|line| !line.trim().is_empty()) {
        let Some((name, url, direction)) = parse_line(line) else {
            log::debug!("Skipping malformed remote line: {line:?}");
            continue;
        };
        let index = match remotes.iter().position(|remote| remote.name == name) {
            Some(index) => index,
            None => {
                remotes.push(Remote {
                    name: name.to_string(),
                    fetch_url: None,
                    push_url: None,
                });
                remotes.len() - 1
            }
        };
        let slot = match direction {
            Direction::Fetch => &mut remotes[index].fetch_url,
            Direction::Push => &mut remotes[index].push_url,
        };
        *slot = Some(url.to_string());
    }
    remotes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_and_push_are_merged() {
        let output = "origin\thttps://example.com/a.git (fetch)\n\
                      origin\tgit@example.com:a.git (push)\n\
                      upstream\t/srv/git/a.git (fetch)\n\
                      upstream\t/srv/git/a.git (push)\n";
        let remotes = parse_remotes(output);
        assert_eq!(remotes.len(), 2);
        assert_eq!(remotes[0].name, "origin");
        assert_eq!(remotes[0].fetch_url.as_deref(), Some("https://example.com/a.git"));
        assert_eq!(remotes[0].push_url.as_deref(), Some("git@example.com:a.git"));
        assert_eq!(remotes[1].name, "upstream");
    }

    #[test]
    fn test_url_with_spaces() {
        let remotes = parse_remotes("local\t/path/with space/repo (fetch)\n");
        assert_eq!(remotes[0].fetch_url.as_deref(), Some("/path/with space/repo"));
        assert_eq!(remotes[0].push_url, None);
    }

    #[test]
    fn test_malformed_lines_are_skipped() {
        let output = "origin\thttps://example.com/a.git (fetch)\n\
                      no tab here (fetch)\n\
                      origin\thttps://example.com/a.git (sideways)\n\
                      origin\thttps://example.com/a.git (push)\n";
        let remotes = parse_remotes(output);
        assert_eq!(remotes.len(), 1);
        assert!(remotes[0].push_url.is_some());
    }

    #[test]
    fn test_no_remotes() {
        assert!(parse_remotes("").is_empty());
    }
}
