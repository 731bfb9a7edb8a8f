//! Tolerant decoding of captured process output.
//!
//! git writes whatever bytes it has: UTF-8 with the occasional byte-order mark, raw
//! 8-bit text from legacy commit encodings, or outright garbage from binary content.
//! Decoding therefore never fails. Malformed sequences become U+FFFD and a byte-order
//! mark, when present, takes precedence over the requested encoding.

use crate::core::error::{GitAccessorError, Result};
use encoding_rs::Encoding;

pub use encoding_rs::{UTF_8, WINDOWS_1252};

/// The replacement character substituted for malformed input.
pub const REPLACEMENT_CHARACTER: char = char::REPLACEMENT_CHARACTER;

/// Decode `bytes` using `encoding`, replacing malformed sequences.
pub fn decode(bytes: &[u8], encoding: &'static Encoding) -> String {
    let (text, actual, had_errors) = encoding.decode(bytes);
    if had_errors {
        log::debug!(
            "Replaced malformed {} sequences in {} bytes of output",
            actual.name(),
            bytes.len()
        );
    }
    if actual != encoding {
        log::debug!(
            "Byte-order mark selected {} instead of {}",
            actual.name(),
            encoding.name()
        );
    }
    text.into_owned()
}

/// Resolve a WHATWG encoding label such as `utf-8`, `latin1` or `utf-16le`.
pub fn encoding_for_label(label: &str) -> Result<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| GitAccessorError::unknown_encoding(label))
}
