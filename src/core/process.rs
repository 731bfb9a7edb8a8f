//! Process invocation engine: starting git and collecting its output.
//!
//! # Public API
//! - [`GitInput`]: what to run, where, with which encoding and environment
//! - [`GitOutput`]: decoded exit code, stdout and stderr
//! - [`RawOutput`]: the same, undecoded, for binary queries such as blobs
//! - [`GitProcess`]: the configured executable; synchronous execution lives here,
//!   asynchronous execution in [`crate::core::async_exec`]
//!
//! # Pipe draining
//! stdout and stderr are read on two scoped threads while the calling thread waits for
//! the process to exit. Reading them one after the other would deadlock as soon as git
//! fills the pipe we are not reading.

use crate::core::{
    command::Command,
    decoder,
    error::{GitAccessorError, Result},
    settings,
};
use encoding_rs::Encoding;
use std::collections::BTreeMap;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::thread;

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// Input data for one git invocation.
#[derive(Debug, Clone)]
pub struct GitInput {
    working_directory: PathBuf,
    command: Command,
    encoding: &'static Encoding,
    environment: BTreeMap<String, String>,
    stdin: Option<Vec<u8>>,
}

impl GitInput {
    /// Run `command` in the current directory with the default encoding.
    pub fn new(command: Command) -> Self {
        Self::in_directory(PathBuf::new(), command)
    }

    /// Run `command` in `working_directory`. An empty path means the current directory.
    pub fn in_directory(working_directory: impl Into<PathBuf>, command: Command) -> Self {
        Self {
            working_directory: working_directory.into(),
            command,
            encoding: settings::default_encoding(),
            environment: BTreeMap::new(),
            stdin: None,
        }
    }

    pub fn with_encoding(mut self, encoding: &'static Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Override one environment variable. Later overrides of the same key win.
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.environment.insert(key.into(), value.into());
        self
    }

    pub fn with_environment(mut self, environment: BTreeMap<String, String>) -> Self {
        self.environment.extend(environment);
        self
    }

    /// Bytes written to the child's stdin, which is closed afterwards.
    pub fn with_stdin(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.stdin = Some(bytes.into());
        self
    }

    pub fn working_directory(&self) -> &Path {
        &self.working_directory
    }

    pub fn command(&self) -> &Command {
        &self.command
    }

    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    pub fn environment(&self) -> &BTreeMap<String, String> {
        &self.environment
    }

    pub fn stdin(&self) -> Option<&[u8]> {
        self.stdin.as_deref()
    }

    /// The rendered argument string.
    pub fn arguments(&self) -> String {
        self.command.render()
    }
}

/// Decoded result of a finished invocation.
///
/// A nonzero exit code is not an error at this level; use [`GitOutput::into_result`]
/// when the caller wants it to be one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl GitOutput {
    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }

    /// Turn a nonzero exit into [`GitAccessorError::CommandFailed`].
    pub fn into_result(self, command: &Command) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(GitAccessorError::command_failed(
                command.render(),
                self.exit_code,
                &self.stderr,
            ))
        }
    }
}

/// Undecoded result of a finished invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawOutput {
    pub exit_code: i32,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl RawOutput {
    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }

    pub fn decode(&self, encoding: &'static Encoding) -> GitOutput {
        GitOutput {
            exit_code: self.exit_code,
            stdout: decoder::decode(&self.stdout, encoding),
            stderr: decoder::decode(&self.stderr, encoding),
        }
    }

    /// Like [`GitOutput::into_result`], keeping the bytes. stderr is decoded with the
    /// default encoding.
    pub fn into_result(self, command: &Command) -> Result<Self> {
        self.into_result_with(command, settings::default_encoding())
    }

    pub fn into_result_with(self, command: &Command, encoding: &'static Encoding) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(GitAccessorError::command_failed(
                command.render(),
                self.exit_code,
                &decoder::decode(&self.stderr, encoding),
            ))
        }
    }
}

/// Exit code of a finished process; `-1` when it was terminated by a signal.
pub(crate) fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(-1)
}

/// The git executable and the ways to run it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitProcess {
    executable: PathBuf,
}

impl Default for GitProcess {
    fn default() -> Self {
        Self::new("git")
    }
}

impl GitProcess {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// Build the OS command for `input` with all three standard streams configured.
    pub(crate) fn build_command(&self, input: &GitInput) -> std::process::Command {
        let mut cmd = std::process::Command::new(&self.executable);

        #[cfg(windows)]
        {
            use std::os::windows::process::CommandExt;
            cmd.raw_arg(input.arguments());
            cmd.creation_flags(CREATE_NO_WINDOW);
        }
        #[cfg(not(windows))]
        cmd.args(input.command().argv());

        if !input.working_directory().as_os_str().is_empty() {
            cmd.current_dir(input.working_directory());
        }
        cmd.envs(input.environment());

        cmd.stdin(if input.stdin().is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        });
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd
    }

    /// Run `input` to completion and decode its output.
    pub fn exec(&self, input: &GitInput) -> Result<GitOutput> {
        Ok(self.exec_raw(input)?.decode(input.encoding()))
    }

    /// Run `input` to completion and return its output undecoded.
    pub fn exec_raw(&self, input: &GitInput) -> Result<RawOutput> {
        let mut child = self
            .build_command(input)
            .spawn()
            .map_err(|e| GitAccessorError::process_start(&self.executable, e))?;
        log::debug!("Started {} (pid {})", self.executable.display(), child.id());

        let stdin = child.stdin.take();
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let (status, stdout, stderr) = thread::scope(|scope| {
            if let (Some(pipe), Some(bytes)) = (stdin, input.stdin()) {
                scope.spawn(move || feed(pipe, bytes));
            }
            let stdout = scope.spawn(move || drain(stdout));
            let stderr = scope.spawn(move || drain(stderr));
            let status = child.wait();
            (status, join_reader(stdout), join_reader(stderr))
        });

        let output_error = |e| GitAccessorError::process_output(&self.executable, e);
        let status = status.map_err(output_error)?;
        let output = RawOutput {
            exit_code: exit_code(status),
            stdout: stdout.map_err(output_error)?,
            stderr: stderr.map_err(output_error)?,
        };
        log::debug!(
            "{} exited with {} ({} bytes stdout, {} bytes stderr)",
            self.executable.display(),
            output.exit_code,
            output.stdout.len(),
            output.stderr.len()
        );
        Ok(output)
    }
}

fn feed(mut pipe: impl Write, bytes: &[u8]) {
    // The child may exit without reading everything; that is its business.
    if let Err(e) = pipe.write_all(bytes) {
        log::debug!("Stopped writing stdin: {e}");
    }
}

fn drain(pipe: Option<impl Read>) -> io::Result<Vec<u8>> {
    let mut buffer = Vec::new();
    if let Some(mut pipe) = pipe {
        pipe.read_to_end(&mut buffer)?;
    }
    Ok(buffer)
}

fn join_reader(handle: thread::ScopedJoinHandle<'_, io::Result<Vec<u8>>>) -> io::Result<Vec<u8>> {
    handle
        .join()
        .unwrap_or_else(|_| Err(io::Error::other("output reader panicked")))
}
