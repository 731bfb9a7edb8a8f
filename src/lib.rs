//! git-accessor - typed access to a git repository through the git command line.
//!
//! Commands are built as a verb plus arguments, run by [`GitProcess`] with both output
//! streams drained concurrently (or asynchronously with cancellation on a tokio
//! runtime), decoded tolerantly and parsed into typed records.
//!
//! ```no_run
//! use git_accessor::{GitRepo, QueryReflogParameters};
//!
//! # fn main() -> git_accessor::Result<()> {
//! let repo = GitRepo::open(".")?;
//! let entries = repo
//!     .accessor()?
//!     .query_reflog(&QueryReflogParameters::new("HEAD").with_max_count(10))?;
//! for entry in entries {
//!     println!("{} {}", entry.selector, entry.message);
//! }
//! # Ok(())
//! # }
//! ```

pub mod commands;
pub mod core;

pub use core::{
    AccessConfig,
    AsyncOutcome,
    Blob,
    BlobCache,
    Canceller,
    Command,
    CommandExecutor,
    GitAccessorError,
    GitAsync,
    GitCommandExecutor,
    GitInput,
    GitOutput,
    GitProcess,
    GitRepo,
    IdentityPolicy,
    InvocationState,
    QueryBlobBytesParameters,
    QueryReflogParameters,
    QueryTreeContentParameters,
    RawOutput,
    Reflog,
    ReflogEntry,
    ReflogEvent,
    ReflogRecord,
    Remote,
    RepositoryAccessor,
    Result,
    Tree,
    TreeEntry,
    TreeNode,
    User,
};
