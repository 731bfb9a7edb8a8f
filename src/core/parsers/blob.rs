//! Blob content returned by `git cat-file blob`.

use crate::core::decoder;
use encoding_rs::Encoding;

/// git's own binary heuristic looks for NUL in the first 8000 bytes.
const BINARY_SNIFF_LENGTH: usize = 8000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    bytes: Vec<u8>,
}

impl Blob {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn is_binary(&self) -> bool {
        let head = &self.bytes[..self.bytes.len().min(BINARY_SNIFF_LENGTH)];
        head.contains(&0)
    }

    pub fn text(&self, encoding: &'static Encoding) -> String {
        decoder::decode(&self.bytes, encoding)
    }
}
