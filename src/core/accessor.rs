//! Repository queries built on the executor façade.
//!
//! [`RepositoryAccessor`] knows which git command answers which question. It runs the
//! command through a [`CommandExecutor`], turns a nonzero exit into
//! [`GitAccessorError::CommandFailed`](crate::core::error::GitAccessorError::CommandFailed)
//! and hands stdout to the matching parser.

use crate::core::{
    command::{self, Command, NO_MORE_OPTIONS, NULL_TERMINATE},
    error::Result,
    executor::{CommandExecutor, GitCommandExecutor},
    parsers::{
        parse_reflog, parse_remotes, parse_tree_content, parse_users, Blob, ReflogEntry, Remote,
        TreeEntry, User, REFLOG_DATE, REFLOG_FORMAT,
    },
    process::GitOutput,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryReflogParameters {
    pub reference: String,
    pub max_count: Option<u32>,
}

impl QueryReflogParameters {
    pub fn new(reference: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            max_count: None,
        }
    }

    pub fn with_max_count(mut self, max_count: u32) -> Self {
        self.max_count = Some(max_count);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTreeContentParameters {
    pub treeish: String,
    pub recurse: bool,
    pub only_trees: bool,
}

impl QueryTreeContentParameters {
    /// Every blob under `treeish`, recursively.
    pub fn new(treeish: impl Into<String>) -> Self {
        Self {
            treeish: treeish.into(),
            recurse: true,
            only_trees: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryBlobBytesParameters {
    pub treeish: String,
    pub object_name: String,
}

impl QueryBlobBytesParameters {
    pub fn new(treeish: impl Into<String>, object_name: impl Into<String>) -> Self {
        Self {
            treeish: treeish.into(),
            object_name: object_name.into(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RepositoryAccessor<E = GitCommandExecutor> {
    executor: E,
}

impl<E: CommandExecutor> RepositoryAccessor<E> {
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    fn run(&self, command: &Command) -> Result<GitOutput> {
        self.executor.exec_command(command, None)?.into_result(command)
    }

    pub fn query_reflog(&self, parameters: &QueryReflogParameters) -> Result<Vec<ReflogEntry>> {
        let mut cmd = Command::new("log")
            .arg("--walk-reflogs")
            .arg(REFLOG_DATE)
            .arg(command::format(REFLOG_FORMAT));
        if let Some(max_count) = parameters.max_count {
            cmd = cmd.arg(command::max_count(max_count));
        }
        let cmd = cmd.arg(&parameters.reference).arg(NO_MORE_OPTIONS);
        Ok(parse_reflog(&self.run(&cmd)?.stdout))
    }

    pub fn query_tree_content(
        &self,
        parameters: &QueryTreeContentParameters,
    ) -> Result<Vec<TreeEntry>> {
        let mut cmd = Command::new("ls-tree")
            .arg(NULL_TERMINATE)
            .arg("--long")
            .arg("--full-tree");
        if parameters.recurse {
            cmd = cmd.arg("-r");
        }
        if parameters.only_trees {
            cmd = cmd.arg("-d");
        }
        let cmd = cmd.arg(&parameters.treeish);
        Ok(parse_tree_content(&self.run(&cmd)?.stdout))
    }

    pub fn query_blob_bytes(&self, parameters: &QueryBlobBytesParameters) -> Result<Blob> {
        let cmd = Command::new("cat-file").arg("blob").arg(format!(
            "{}:{}",
            parameters.treeish, parameters.object_name
        ));
        let output = self.executor.exec_command_bytes(&cmd)?.into_result(&cmd)?;
        Ok(Blob::new(output.stdout))
    }

    pub fn query_remotes(&self) -> Result<Vec<Remote>> {
        let cmd = Command::new("remote").arg("-v");
        Ok(parse_remotes(&self.run(&cmd)?.stdout))
    }

    pub fn query_users(&self) -> Result<Vec<User>> {
        let cmd = Command::new("shortlog").args(["-sne", "--all"]);
        Ok(parse_users(&self.run(&cmd)?.stdout))
    }
}
