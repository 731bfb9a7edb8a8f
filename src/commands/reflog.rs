use super::{open_repository, print_json, short_id};
use crate::core::{error::Result, print_info, print_section_header, process::GitProcess};
use colored::*;

pub fn execute_reflog(
    process: &GitProcess,
    reference: &str,
    max_count: Option<usize>,
    json: bool,
) -> Result<()> {
    let git_repo = open_repository(process)?;
    let reflog = git_repo.reflog(reference)?;
    let records = &reflog.records()[..max_count.unwrap_or(usize::MAX).min(reflog.len())];

    if json {
        return print_json(records);
    }

    if records.is_empty() {
        print_info("No reflog entries. Make your first commit to create one.");
        return Ok(());
    }

    print_section_header(&format!("Reflog of {reference}"));
    for record in records {
        let entry = &record.entry;
        println!(
            "  {} {} {} {}",
            short_id(&entry.revision).yellow(),
            entry.selector.blue(),
            entry.message.white(),
            format!("({})", entry.timestamp.format("%Y-%m-%d %H:%M")).bright_black()
        );
    }
    println!();
    Ok(())
}
