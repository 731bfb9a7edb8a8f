use super::{open_repository, print_json};
use crate::core::{error::Result, print_info, print_section_header, process::GitProcess};
use colored::*;

pub fn execute_users(process: &GitProcess, json: bool) -> Result<()> {
    let git_repo = open_repository(process)?;
    let users = if git_repo.is_empty()? {
        Vec::new()
    } else {
        git_repo.accessor()?.query_users()?
    };

    if json {
        return print_json(&users);
    }

    if users.is_empty() {
        print_info("No commits yet.");
        return Ok(());
    }

    print_section_header("Authors");
    let width = users
        .iter()
        .map(|user| user.commits.to_string().len())
        .max()
        .unwrap_or(1);
    for user in &users {
        println!(
            "  {} {} {}",
            format!("{:>width$}", user.commits).yellow(),
            user.name.white(),
            format!("<{}>", user.email).bright_black()
        );
    }
    println!();
    Ok(())
}
