use super::{open_repository, print_json};
use crate::core::{error::Result, print_detail, print_info, print_section_header, process::GitProcess};
use colored::*;

pub fn execute_remotes(process: &GitProcess, json: bool) -> Result<()> {
    let remotes = open_repository(process)?.accessor()?.query_remotes()?;

    if json {
        return print_json(&remotes);
    }

    if remotes.is_empty() {
        print_info("No remotes configured.");
        return Ok(());
    }

    print_section_header("Remotes");
    for remote in &remotes {
        println!("{}", remote.name.green());
        if let Some(url) = &remote.fetch_url {
            print_detail("fetch", url);
        }
        if let Some(url) = &remote.push_url {
            print_detail("push", url);
        }
    }
    println!();
    Ok(())
}
