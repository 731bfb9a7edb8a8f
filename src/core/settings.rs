//! Process-wide settings for the access layer.
//!
//! There are exactly two: the CLI call logging toggle and the default output encoding.
//! Both are meant to be set once at startup (see [`crate::core::config::AccessConfig::install`])
//! and only read afterwards.

use encoding_rs::{Encoding, UTF_8};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::OnceLock;

static LOG_CLI_CALLS: AtomicBool = AtomicBool::new(false);
static DEFAULT_ENCODING: OnceLock<&'static Encoding> = OnceLock::new();

/// Whether every git invocation is logged with its rendered command line.
pub fn log_cli_calls() -> bool {
    LOG_CLI_CALLS.load(Ordering::Relaxed)
}

pub fn set_log_cli_calls(enabled: bool) {
    LOG_CLI_CALLS.store(enabled, Ordering::Relaxed);
}

/// Encoding used when a caller does not ask for one. UTF-8 unless configured.
pub fn default_encoding() -> &'static Encoding {
    DEFAULT_ENCODING.get().copied().unwrap_or(UTF_8)
}

/// Set the default encoding. Only the first call has an effect; returns whether it did.
pub fn set_default_encoding(encoding: &'static Encoding) -> bool {
    DEFAULT_ENCODING.set(encoding).is_ok()
}
