pub mod blob;
pub mod exec;
pub mod reflog;
pub mod remotes;
pub mod tree;
pub mod users;

pub use blob::*;
pub use exec::*;
pub use reflog::*;
pub use remotes::*;
pub use tree::*;
pub use users::*;

use crate::core::{error::Result, git::GitRepo, process::GitProcess};
use serde::Serialize;
use std::env;

/// The repository containing the current directory, running git through `process`.
pub(crate) fn open_repository(process: &GitProcess) -> Result<GitRepo> {
    let current_dir = env::current_dir()?;
    Ok(GitRepo::open(&current_dir)?.with_process(process.clone()))
}

pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// First seven characters of an object id.
pub(crate) fn short_id(object: &str) -> &str {
    object.get(..7).unwrap_or(object)
}
