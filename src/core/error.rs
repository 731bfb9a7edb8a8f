//! Domain-specific error types and error handling utilities.
//!
//! This module defines [`GitAccessorError`] which covers every failure the access layer
//! can report to its callers. It uses `thiserror` for ergonomic error definitions and
//! includes constructors for the common failure scenarios.
//!
//! # Public API
//! - [`GitAccessorError`]: Main error enum covering all failure modes
//! - [`Result<T>`]: Type alias for `std::result::Result<T, GitAccessorError>`
//!
//! # Error Categories
//! - **Process lifecycle**: executable could not be started, async task failures
//! - **Command outcome**: git ran but exited with a nonzero code
//! - **Repository**: not in a repository, git2 discovery errors
//! - **Configuration**: unknown encodings, config directory and file errors
//!
//! Decoding and parsing anomalies have no variant. They are recovered where they
//! happen and logged.

use std::path::PathBuf;
use thiserror::Error;

/// Domain-specific error types for git-accessor
#[derive(Error, Debug)]
pub enum GitAccessorError {
    // Process errors
    #[error("Failed to start '{}': {source}", program.display())]
    ProcessStart {
        program: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to collect output of '{}': {source}", program.display())]
    ProcessOutput {
        program: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to start the asynchronous runtime: {source}")]
    AsyncRuntime { source: std::io::Error },

    #[error("Asynchronous invocation task failed: {message}")]
    AsyncTask { message: String },

    // Command outcome errors
    #[error("No git command given")]
    MissingCommand,

    #[error("git {command} failed with exit code {exit_code}: {stderr}")]
    CommandFailed {
        command: String,
        exit_code: i32,
        stderr: String,
    },

    // Repository errors
    #[error("Not in a git repository")]
    NotInGitRepo,

    #[error("Git repository error: {0}")]
    GitRepo(#[from] git2::Error),

    #[error("Repository has no working directory")]
    BareRepository,

    // Blob extraction errors
    #[error("Invalid blob path: '{path}'")]
    InvalidBlobPath { path: String },

    // Configuration errors
    #[error("Unknown encoding label: '{label}'")]
    UnknownEncoding { label: String },

    #[error("Could not find configuration directory")]
    ConfigDirectoryNotFound,

    #[error("Failed to read config file '{}': {source}", path.display())]
    ConfigReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{}': {source}", path.display())]
    ConfigParseFailed {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience type alias for Results using GitAccessorError
pub type Result<T> = std::result::Result<T, GitAccessorError>;

impl GitAccessorError {
    /// Create a process start error for the given executable
    pub fn process_start(program: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ProcessStart {
            program: program.into(),
            source,
        }
    }

    /// Create a process output collection error
    pub fn process_output(program: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ProcessOutput {
            program: program.into(),
            source,
        }
    }

    /// Create a command failure error from a rendered command and its stderr
    pub fn command_failed(command: impl Into<String>, exit_code: i32, stderr: &str) -> Self {
        Self::CommandFailed {
            command: command.into(),
            exit_code,
            stderr: stderr.trim().to_string(),
        }
    }

    /// Create an async runtime startup error
    pub fn async_runtime(source: std::io::Error) -> Self {
        Self::AsyncRuntime { source }
    }

    /// Create an async task failure error
    pub fn async_task(message: impl Into<String>) -> Self {
        Self::AsyncTask {
            message: message.into(),
        }
    }

    /// Create an unknown encoding error
    pub fn unknown_encoding(label: impl Into<String>) -> Self {
        Self::UnknownEncoding {
            label: label.into(),
        }
    }

    /// Create an invalid blob path error
    pub fn invalid_blob_path(path: impl Into<String>) -> Self {
        Self::InvalidBlobPath { path: path.into() }
    }

    /// Create a config read failed error
    pub fn config_read_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ConfigReadFailed {
            path: path.into(),
            source,
        }
    }

    /// Create a config parse failed error
    pub fn config_parse_failed(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::ConfigParseFailed {
            path: path.into(),
            source,
        }
    }

    /// Exit code carried by a [`GitAccessorError::CommandFailed`], if any
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::CommandFailed { exit_code, .. } => Some(*exit_code),
            _ => None,
        }
    }
}
