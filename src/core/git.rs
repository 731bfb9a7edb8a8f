//! Repository handle.
//!
//! [`GitRepo`] uses `git2` to discover the repository and answer cheap metadata
//! questions (work tree, emptiness). Everything else goes through the git executable
//! via [`RepositoryAccessor`], running in the work tree.

use crate::core::{
    accessor::RepositoryAccessor,
    error::{GitAccessorError, Result},
    executor::GitCommandExecutor,
    process::GitProcess,
    reflog::Reflog,
    tree::Tree,
};
use git2::{ErrorCode, Repository};
use std::path::{Path, PathBuf};

pub struct GitRepo {
    repo: Repository,
    process: GitProcess,
}

impl GitRepo {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Repository::discover(path).map_err(|e| match e.code() {
            ErrorCode::NotFound => GitAccessorError::NotInGitRepo,
            _ => GitAccessorError::GitRepo(e),
        })?;
        Ok(GitRepo {
            repo,
            process: GitProcess::default(),
        })
    }

    /// Use another git executable for every command run through this repository.
    pub fn with_process(mut self, process: GitProcess) -> Self {
        self.process = process;
        self
    }

    pub fn workdir(&self) -> Result<&Path> {
        self.repo.workdir().ok_or(GitAccessorError::BareRepository)
    }

    /// Path of the `.git` directory.
    pub fn get_repo_path(&self) -> PathBuf {
        self.repo.path().to_path_buf()
    }

    /// True until the first commit.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.repo.is_empty()?)
    }

    /// Name of the work tree directory, used as the label of the tree root.
    pub fn root_name(&self) -> String {
        self.repo
            .workdir()
            .and_then(|dir| dir.file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn executor(&self) -> Result<GitCommandExecutor> {
        Ok(GitCommandExecutor::new(self.process.clone()).with_working_directory(self.workdir()?))
    }

    pub fn accessor(&self) -> Result<RepositoryAccessor> {
        Ok(RepositoryAccessor::new(self.executor()?))
    }

    /// Loads `treeish`. An empty repository yields an empty tree instead of an error.
    pub fn load_tree(&self, treeish: &str) -> Result<Tree> {
        if self.is_empty()? {
            log::debug!("Repository is empty, not querying tree {treeish}");
            return Ok(Tree::empty(treeish));
        }
        Tree::load(&self.accessor()?, treeish)
    }

    pub fn reflog(&self, reference: &str) -> Result<Reflog> {
        let mut reflog = Reflog::new(reference);
        if !self.is_empty()? {
            reflog.refresh(&self.accessor()?)?;
        }
        Ok(reflog)
    }
}
