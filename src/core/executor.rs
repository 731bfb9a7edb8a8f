//! Command executor façade.
//!
//! [`CommandExecutor`] is the single entry point the rest of the crate uses to run git.
//! It fills in the working directory and the process-wide default encoding, and logs
//! each call as `git <arguments>` when [`settings::log_cli_calls`] is on. With logging
//! off the command is never rendered for it.

use crate::core::{
    async_exec::GitAsync,
    command::Command,
    error::Result,
    process::{GitInput, GitOutput, GitProcess, RawOutput},
    settings,
};
use encoding_rs::Encoding;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Log target of the CLI call log.
pub const CLI_LOG_TARGET: &str = "git_accessor::cli";

/// Port for running git commands.
pub trait CommandExecutor: Send + Sync {
    /// Run `command` to completion. `None` selects the default encoding.
    fn exec_command(
        &self,
        command: &Command,
        encoding: Option<&'static Encoding>,
    ) -> Result<GitOutput>;

    /// Run `command` to completion and keep stdout as bytes.
    fn exec_command_bytes(&self, command: &Command) -> Result<RawOutput>;

    /// Start `command` and return a handle to it. Works with or without a tokio runtime.
    fn exec_async(
        &self,
        command: &Command,
        encoding: Option<&'static Encoding>,
    ) -> Result<GitAsync>;
}

/// [`CommandExecutor`] over a real git executable.
#[derive(Debug, Clone, Default)]
pub struct GitCommandExecutor {
    process: GitProcess,
    working_directory: PathBuf,
    environment: BTreeMap<String, String>,
}

impl GitCommandExecutor {
    pub fn new(process: GitProcess) -> Self {
        Self {
            process,
            working_directory: PathBuf::new(),
            environment: BTreeMap::new(),
        }
    }

    pub fn with_working_directory(mut self, working_directory: impl Into<PathBuf>) -> Self {
        self.working_directory = working_directory.into();
        self
    }

    /// Environment override applied to every invocation.
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.environment.insert(key.into(), value.into());
        self
    }

    pub fn process(&self) -> &GitProcess {
        &self.process
    }

    pub fn working_directory(&self) -> &Path {
        &self.working_directory
    }

    fn input(&self, command: &Command, encoding: Option<&'static Encoding>) -> GitInput {
        let input = GitInput::in_directory(&self.working_directory, command.clone())
            .with_environment(self.environment.clone());
        match encoding {
            Some(encoding) => input.with_encoding(encoding),
            None => input,
        }
    }

    fn log_call(&self, command: &Command) {
        if settings::log_cli_calls() {
            log::info!(target: CLI_LOG_TARGET, "git {command}");
        }
    }
}

impl CommandExecutor for GitCommandExecutor {
    fn exec_command(
        &self,
        command: &Command,
        encoding: Option<&'static Encoding>,
    ) -> Result<GitOutput> {
        self.log_call(command);
        self.process.exec(&self.input(command, encoding))
    }

    fn exec_command_bytes(&self, command: &Command) -> Result<RawOutput> {
        self.log_call(command);
        self.process.exec_raw(&self.input(command, None))
    }

    fn exec_async(
        &self,
        command: &Command,
        encoding: Option<&'static Encoding>,
    ) -> Result<GitAsync> {
        self.log_call(command);
        self.process.exec_async(&self.input(command, encoding))
    }
}
