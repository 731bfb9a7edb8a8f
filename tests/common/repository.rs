//! Test repository setup.

#![allow(dead_code)]

use assert_cmd::prelude::*;
use git_accessor::core::error::{GitAccessorError, Result};
use git_accessor::core::git::GitRepo;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// A repository in a temporary directory. Both directories are removed on drop, so
/// keep the value alive for the duration of the test.
pub struct TestRepo {
    pub temp_dir: TempDir,
    pub path: PathBuf,
    /// Holds the XDG config and cache directories of the binary under test.
    pub home: TempDir,
}

impl TestRepo {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn cache_home(&self) -> PathBuf {
        self.home.path().join("cache")
    }

    pub fn config_home(&self) -> PathBuf {
        self.home.path().join("config")
    }

    /// `git-accessor` running in the repository with isolated config and cache.
    pub fn accessor_cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("git-accessor").expect("binary is built");
        cmd.current_dir(&self.path)
            .env("XDG_CONFIG_HOME", self.config_home())
            .env("XDG_CACHE_HOME", self.cache_home())
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG");
        cmd
    }

    pub fn open(&self) -> Result<GitRepo> {
        GitRepo::open(&self.path)
    }
}

/// Runs git in `repo_path` and returns its stdout. Fails on a nonzero exit.
pub fn git(repo_path: &Path, args: &[&str]) -> Result<String> {
    let output = Command::new("git")
        .args(args)
        .current_dir(repo_path)
        .output()?;
    if !output.status.success() {
        return Err(GitAccessorError::command_failed(
            args.join(" "),
            output.status.code().unwrap_or(-1),
            &String::from_utf8_lossy(&output.stderr),
        ));
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// A fresh repository on branch `main` with a test identity and no commits.
pub fn setup_test_repo() -> Result<TestRepo> {
    let temp_dir = TempDir::new()?;
    let home = TempDir::new()?;
    let repo_path = temp_dir.path().to_path_buf();

    git(&repo_path, &["init", "-q"])?;
    git(&repo_path, &["symbolic-ref", "HEAD", "refs/heads/main"])?;
    git(&repo_path, &["config", "user.name", "Test User"])?;
    git(&repo_path, &["config", "user.email", "test@example.com"])?;
    git(&repo_path, &["config", "commit.gpgsign", "false"])?;

    Ok(TestRepo {
        temp_dir,
        path: repo_path,
        home,
    })
}

/// A repository with one commit containing `initial.txt`.
pub fn setup_test_repo_with_initial_commit() -> Result<TestRepo> {
    let repo = setup_test_repo()?;
    create_file(&repo.path, "initial.txt", "initial content\n")?;
    git_add(&repo.path, "initial.txt")?;
    git_commit(&repo.path, "Initial commit")?;
    Ok(repo)
}

/// Writes `content` to `filename`, creating parent directories.
pub fn create_file(repo_path: &Path, filename: &str, content: impl AsRef<[u8]>) -> Result<()> {
    let path = repo_path.join(filename);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(())
}

pub fn git_add(repo_path: &Path, filename: &str) -> Result<()> {
    git(repo_path, &["add", "--", filename]).map(drop)
}

pub fn git_commit(repo_path: &Path, message: &str) -> Result<()> {
    git(repo_path, &["commit", "-q", "-m", message]).map(drop)
}

/// Creates, adds and commits a single file.
pub fn commit_file(repo_path: &Path, filename: &str, content: impl AsRef<[u8]>) -> Result<()> {
    create_file(repo_path, filename, content)?;
    git_add(repo_path, filename)?;
    git_commit(repo_path, &format!("Add {filename}"))
}

pub fn head_revision(repo_path: &Path) -> Result<String> {
    Ok(git(repo_path, &["rev-parse", "HEAD"])?.trim().to_string())
}
