//! Asynchronous, cancellable git invocations.
//!
//! [`GitProcess::exec_async`] starts the process on the calling thread, so a missing
//! executable is reported immediately, and then drives it on the caller's tokio
//! runtime. Callers outside a runtime (plain worker threads) get a small shared
//! runtime owned by the crate instead. The returned [`GitAsync`] handle can be polled
//! for its state, cancelled from anywhere (including through a detached
//! [`Canceller`]), and awaited with `.await` or [`GitAsync::wait_blocking`].
//!
//! Each invocation moves through `Created -> Running -> {Completed | Failed | Cancelled}`;
//! the last three are terminal and sticky.

use crate::core::{
    error::{GitAccessorError, Result},
    process::{exit_code, GitInput, GitOutput, GitProcess, RawOutput},
    process_tree,
};
use encoding_rs::Encoding;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, ChildStdin};
use tokio::runtime::{Handle, Runtime};
use tokio::sync::watch;
use tokio::task::JoinHandle;

const FALLBACK_WORKER_THREADS: usize = 2;

static FALLBACK_RUNTIME: OnceLock<Runtime> = OnceLock::new();

/// The caller's runtime, or the shared fallback runtime when there is none.
fn runtime_handle() -> Result<Handle> {
    if let Ok(handle) = Handle::try_current() {
        return Ok(handle);
    }
    if let Some(runtime) = FALLBACK_RUNTIME.get() {
        return Ok(runtime.handle().clone());
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(FALLBACK_WORKER_THREADS)
        .thread_name("git-accessor-async")
        .enable_all()
        .build()
        .map_err(GitAccessorError::async_runtime)?;
    log::debug!("Started fallback runtime for asynchronous git invocations");
    // Another thread may have won the race; its runtime is used and ours is dropped.
    let _ = FALLBACK_RUNTIME.set(runtime);
    FALLBACK_RUNTIME
        .get()
        .map(|runtime| runtime.handle().clone())
        .ok_or_else(|| GitAccessorError::async_task("fallback runtime unavailable"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationState {
    Created,
    Running,
    Completed(i32),
    Failed,
    Cancelled,
}

impl InvocationState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed(_) | Self::Failed | Self::Cancelled)
    }
}

#[derive(Debug, Clone)]
struct StateCell(Arc<Mutex<InvocationState>>);

impl StateCell {
    fn new() -> Self {
        Self(Arc::new(Mutex::new(InvocationState::Created)))
    }

    fn get(&self) -> InvocationState {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Move to `next` unless already terminal. Returns whether the move happened.
    fn transition(&self, next: InvocationState) -> bool {
        let mut state = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        if state.is_terminal() {
            return false;
        }
        *state = next;
        true
    }
}

/// How an asynchronous invocation ended when it did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AsyncOutcome {
    Completed(GitOutput),
    Cancelled,
}

impl AsyncOutcome {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    pub fn into_output(self) -> Option<GitOutput> {
        match self {
            Self::Completed(output) => Some(output),
            Self::Cancelled => None,
        }
    }
}

/// Requests cancellation of one invocation. Cheap to clone and safe to call repeatedly.
#[derive(Debug, Clone)]
pub struct Canceller {
    sender: Arc<watch::Sender<bool>>,
    state: StateCell,
}

impl Canceller {
    pub fn cancel(&self) {
        if self.state.get().is_terminal() {
            return;
        }
        self.sender.send_replace(true);
    }
}

/// Handle to an in-flight git invocation.
#[derive(Debug)]
pub struct GitAsync {
    pid: Option<u32>,
    command: String,
    canceller: Canceller,
    task: JoinHandle<Result<AsyncOutcome>>,
}

impl GitAsync {
    /// OS process id of the git process.
    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// The rendered command line.
    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn state(&self) -> InvocationState {
        self.canceller.state.get()
    }

    pub fn is_completed(&self) -> bool {
        self.state().is_terminal()
    }

    /// Terminate the process tree. No effect once the invocation has finished.
    pub fn cancel(&self) {
        self.canceller.cancel();
    }

    pub fn canceller(&self) -> Canceller {
        self.canceller.clone()
    }

    /// Wait for the invocation to finish.
    pub async fn wait(self) -> Result<AsyncOutcome> {
        let joined = self.task.await;
        Self::finish(&self.canceller.state, joined)
    }

    /// Wait at most `limit`, cancelling the invocation if it has not finished by then.
    pub async fn wait_timeout(mut self, limit: Duration) -> Result<AsyncOutcome> {
        let joined = match tokio::time::timeout(limit, &mut self.task).await {
            Ok(joined) => joined,
            Err(_) => {
                log::debug!("git {} timed out after {:?}", self.command, limit);
                self.cancel();
                (&mut self.task).await
            }
        };
        Self::finish(&self.canceller.state, joined)
    }

    /// Block the current thread until the invocation finishes.
    ///
    /// For callers outside any runtime. Inside an async context this returns an error
    /// instead of blocking a runtime worker; use [`GitAsync::wait`] there.
    pub fn wait_blocking(self) -> Result<AsyncOutcome> {
        if Handle::try_current().is_ok() {
            return Err(GitAccessorError::async_task(
                "wait_blocking called from within an async context",
            ));
        }
        let (sender, receiver) = std::sync::mpsc::channel();
        let state = self.canceller.state.clone();
        let task = self.task;
        // The task may belong to any runtime; a watcher on that runtime forwards the result.
        let runtime = runtime_handle()?;
        runtime.spawn(async move {
            let _ = sender.send(task.await);
        });
        match receiver.recv() {
            Ok(joined) => Self::finish(&state, joined),
            Err(_) => {
                state.transition(InvocationState::Failed);
                Err(GitAccessorError::async_task("invocation task was dropped"))
            }
        }
    }

    fn finish(
        state: &StateCell,
        joined: std::result::Result<Result<AsyncOutcome>, tokio::task::JoinError>,
    ) -> Result<AsyncOutcome> {
        joined.unwrap_or_else(|e| {
            state.transition(InvocationState::Failed);
            Err(GitAccessorError::async_task(e.to_string()))
        })
    }
}

impl GitProcess {
    /// Start `input` and return immediately with a handle to it.
    ///
    /// Runs on the current tokio runtime, or on a shared crate-owned runtime when called
    /// from outside one.
    pub fn exec_async(&self, input: &GitInput) -> Result<GitAsync> {
        let runtime = runtime_handle()?;
        // Child reaping and pipe registration need the runtime's context.
        let _guard = runtime.enter();
        let state = StateCell::new();

        let mut command = tokio::process::Command::from(self.build_command(input));
        command.kill_on_drop(true);
        let child = command
            .spawn()
            .map_err(|e| GitAccessorError::process_start(self.executable(), e))?;
        let pid = child.id();
        state.transition(InvocationState::Running);
        log::debug!("Started {} asynchronously (pid {pid:?})", self.executable().display());

        let (sender, receiver) = watch::channel(false);
        let task = runtime.spawn(drive(
            child,
            input.stdin().map(<[u8]>::to_vec),
            input.encoding(),
            state.clone(),
            receiver,
            self.executable().to_path_buf(),
        ));

        Ok(GitAsync {
            pid,
            command: input.arguments(),
            canceller: Canceller {
                sender: Arc::new(sender),
                state,
            },
            task,
        })
    }
}

async fn drive(
    mut child: Child,
    stdin_bytes: Option<Vec<u8>>,
    encoding: &'static Encoding,
    state: StateCell,
    mut cancel: watch::Receiver<bool>,
    program: PathBuf,
) -> Result<AsyncOutcome> {
    let stdin = child.stdin.take();
    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    let cancelled = async move {
        // A dropped sender means nobody can cancel any more.
        if cancel.wait_for(|requested| *requested).await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    let finished = tokio::select! {
        biased;
        _ = cancelled => None,
        collected = async {
            let (status, stdout, stderr, ()) = tokio::join!(
                child.wait(),
                read_all(stdout),
                read_all(stderr),
                feed(stdin, stdin_bytes),
            );
            Ok::<_, io::Error>(RawOutput {
                exit_code: exit_code(status?),
                stdout: stdout?,
                stderr: stderr?,
            })
        } => Some(collected),
    };

    match finished {
        Some(Ok(raw)) => {
            state.transition(InvocationState::Completed(raw.exit_code));
            Ok(AsyncOutcome::Completed(raw.decode(encoding)))
        }
        Some(Err(e)) => {
            state.transition(InvocationState::Failed);
            Err(GitAccessorError::process_output(program, e))
        }
        None => {
            terminate(&mut child).await;
            state.transition(InvocationState::Cancelled);
            Ok(AsyncOutcome::Cancelled)
        }
    }
}

async fn read_all(pipe: Option<impl AsyncRead + Unpin>) -> io::Result<Vec<u8>> {
    let mut buffer = Vec::new();
    if let Some(mut pipe) = pipe {
        pipe.read_to_end(&mut buffer).await?;
    }
    Ok(buffer)
}

async fn feed(pipe: Option<ChildStdin>, bytes: Option<Vec<u8>>) {
    if let (Some(mut pipe), Some(bytes)) = (pipe, bytes) {
        if let Err(e) = pipe.write_all(&bytes).await {
            log::debug!("Stopped writing stdin: {e}");
        }
    }
}

async fn terminate(child: &mut Child) {
    if let Some(pid) = child.id() {
        let walked = tokio::task::spawn_blocking(move || {
            process_tree::terminate_tree(pid, process_tree::DEFAULT_GRACE_PERIOD)
        })
        .await;
        if let Err(e) = walked {
            log::debug!("Process tree termination of {pid} did not finish: {e}");
        }
    }
    // Last resort for the root; also reaps it.
    if let Err(e) = child.kill().await {
        log::debug!("Final kill failed: {e}");
    }
}
