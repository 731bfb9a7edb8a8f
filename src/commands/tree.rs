use super::{open_repository, print_json, short_id};
use crate::core::{
    error::Result,
    print_info, print_section_header,
    process::GitProcess,
    tree::{Tree, TreeNodeKind},
};
use colored::*;

pub fn execute_tree(process: &GitProcess, treeish: &str, json: bool) -> Result<()> {
    let git_repo = open_repository(process)?;
    let tree = git_repo.load_tree(treeish)?;

    if json {
        return print_json(&tree.nodes());
    }

    if tree.is_empty() {
        print_info("Tree is empty.");
        return Ok(());
    }

    print_section_header(&format!("{} @ {}", git_repo.root_name(), tree.treeish()));
    print_tree(&tree);
    println!();
    Ok(())
}

fn print_tree(tree: &Tree) {
    for (depth, id) in tree.walk() {
        let Some(node) = tree.node(id) else { continue };
        let indent = "  ".repeat(depth + 1);
        match &node.kind {
            TreeNodeKind::Directory { .. } => {
                println!("{indent}{}", format!("{}/", node.name).blue())
            }
            TreeNodeKind::Submodule { commit } => println!(
                "{indent}{} {}",
                node.name.cyan(),
                format!("@ {}", short_id(commit)).bright_black()
            ),
            TreeNodeKind::File { size, .. } => match size {
                Some(size) => println!(
                    "{indent}{} {}",
                    node.name.white(),
                    format!("({size} bytes)").bright_black()
                ),
                None => println!("{indent}{}", node.name.white()),
            },
        }
    }
}
