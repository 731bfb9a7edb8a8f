//! Predefined repository scenarios.

#![allow(dead_code)]

use super::repository::*;
use git_accessor::core::error::Result;

/// Scenario: nested directories plus a binary file.
///
/// ```text
/// README.md
/// assets/logo.bin
/// src/lib.rs
/// src/core/mod.rs
/// ```
pub fn create_nested_repo() -> Result<TestRepo> {
    let repo = setup_test_repo()?;
    create_file(&repo.path, "README.md", "# readme\n")?;
    create_file(&repo.path, "src/lib.rs", "pub mod core;\n")?;
    create_file(&repo.path, "src/core/mod.rs", "// core\n")?;
    create_file(&repo.path, "assets/logo.bin", BINARY_CONTENT)?;
    git_add(&repo.path, ".")?;
    git_commit(&repo.path, "Initial layout")?;
    Ok(repo)
}

pub const BINARY_CONTENT: &[u8] = &[0x89, b'P', b'N', b'G', 0x00, 0xff, 0xfe, 0x01];

/// Scenario: `count` commits, one file each, so HEAD's reflog has `count` entries.
pub fn create_repo_with_history(count: usize) -> Result<TestRepo> {
    let repo = setup_test_repo()?;
    for i in 1..=count {
        commit_file(&repo.path, &format!("file{i}.txt"), format!("content{i}\n"))?;
    }
    Ok(repo)
}

/// Scenario: `origin` with a separate push URL and a fetch-only `upstream`.
pub fn create_repo_with_remotes() -> Result<TestRepo> {
    let repo = setup_test_repo_with_initial_commit()?;
    git(&repo.path, &["remote", "add", "origin", "https://example.com/a.git"])?;
    git(
        &repo.path,
        &["remote", "set-url", "--push", "origin", "ssh://git@example.com/a.git"],
    )?;
    git(&repo.path, &["remote", "add", "upstream", "/srv/git/upstream.git"])?;
    Ok(repo)
}

/// Scenario: commits by two authors, two by Alice and one by Bob.
pub fn create_repo_with_authors() -> Result<TestRepo> {
    let repo = setup_test_repo()?;
    for (i, author) in ["Alice <alice@example.com>", "Bob <bob@example.com>", "Alice <alice@example.com>"]
        .into_iter()
        .enumerate()
    {
        create_file(&repo.path, &format!("f{i}.txt"), "x")?;
        git_add(&repo.path, &format!("f{i}.txt"))?;
        git(&repo.path, &["commit", "-q", "--author", author, "-m", "work"])?;
    }
    Ok(repo)
}
