//! `git shortlog -sne` output parser: `<count><TAB><name> <<email>>`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    pub email: String,
    pub commits: u32,
}

fn parse_line(line: &str) -> Option<User> {
    let (count, identity) = line.trim_start().split_once('\t')?;
    let commits = count.trim().parse().ok()?;
    let identity = identity.trim();
    let open = identity.rfind('<')?;
    let email = identity[open + 1..].strip_suffix('>')?;
    Some(User {
        name: identity[..open].trim().to_string(),
        email: email.to_string(),
        commits,
    })
}

pub fn parse_users(output: &str) -> Vec<User> {
    output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| {
            let user = parse_line(line);
            if user.is_none() {
                log::debug!("Skipping malformed shortlog line: {line:?}");
            }
            user
        })
        .collect()
}
