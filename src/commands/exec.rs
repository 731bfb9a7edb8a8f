use crate::core::{
    async_exec::AsyncOutcome,
    command::Command,
    error::{GitAccessorError, Result},
    executor::{CommandExecutor, GitCommandExecutor},
    print_error,
    process::{GitOutput, GitProcess},
};
use std::env;
use std::time::Duration;

/// Exit code reported when `--timeout` cancels the command.
pub const TIMEOUT_EXIT_CODE: i32 = 124;

/// Runs `git <args>` in the current directory and echoes its output.
/// Returns the exit code to terminate with.
pub fn execute_exec(process: &GitProcess, args: Vec<String>, timeout: Option<u64>) -> Result<i32> {
    let mut args = args.into_iter();
    let Some(verb) = args.next() else {
        return Err(GitAccessorError::MissingCommand);
    };
    let command = Command::with_arguments(verb, args);
    let executor = GitCommandExecutor::new(process.clone()).with_working_directory(env::current_dir()?);

    let output = match timeout {
        None => executor.exec_command(&command, None)?,
        Some(seconds) => match run_with_timeout(&executor, &command, Duration::from_secs(seconds))? {
            AsyncOutcome::Completed(output) => output,
            AsyncOutcome::Cancelled => {
                print_error(&format!("git {command} timed out after {seconds}s"));
                return Ok(TIMEOUT_EXIT_CODE);
            }
        },
    };

    echo(&output);
    Ok(output.exit_code)
}

fn run_with_timeout(
    executor: &GitCommandExecutor,
    command: &Command,
    limit: Duration,
) -> Result<AsyncOutcome> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(async {
        let handle = executor.exec_async(command, None)?;
        log::debug!("Started git {} (pid {:?})", handle.command(), handle.pid());
        handle.wait_timeout(limit).await
    })
}

fn echo(output: &GitOutput) {
    print!("{}", output.stdout);
    eprint!("{}", output.stderr);
}
