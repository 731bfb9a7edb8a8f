//! Core functionality for git-accessor.
//!
//! Layered bottom-up: the command model and the process engine run git, the
//! executor façade is what everything above it talks to, and the accessor, the
//! parsers and the domain collections turn output into typed data.

pub mod accessor;
pub mod async_exec;
pub mod blob_cache;
pub mod command;
pub mod config;
pub mod decoder;
pub mod dirs;
pub mod error;
pub mod executor;
pub mod git;
pub mod output;
pub mod parsers;
pub mod process;
pub mod process_tree;
pub mod reflog;
pub mod settings;
pub mod tree;

// === Error handling ===
pub use error::{GitAccessorError, Result};

// === Command model ===
pub use command::{split_command_line, Command};

// === Process invocation ===
pub use async_exec::{AsyncOutcome, Canceller, GitAsync, InvocationState};
pub use process::{GitInput, GitOutput, GitProcess, RawOutput};

// === Executor façade ===
pub use executor::{CommandExecutor, GitCommandExecutor, CLI_LOG_TARGET};

// === Repository queries ===
pub use accessor::{
    QueryBlobBytesParameters, QueryReflogParameters, QueryTreeContentParameters,
    RepositoryAccessor,
};
pub use parsers::{Blob, ReflogEntry, Remote, TreeEntry, TreeEntryKind, User};

// === Domain collections ===
pub use reflog::{IdentityPolicy, RecordId, Reflog, ReflogEvent, ReflogRecord, SubscriptionId};
pub use tree::{NodeId, Tree, TreeNode, TreeNodeKind};

// === Repository and cache ===
pub use blob_cache::BlobCache;
pub use git::GitRepo;

// === Configuration ===
pub use config::AccessConfig;

// === Output formatting ===
pub use output::{print_detail, print_error, print_info, print_section_header, print_success};
