//! Shared test utilities for git-accessor integration tests.
//!
//! Every test runs against a real repository in a temporary directory, with the
//! config and cache directories redirected into a second temporary directory.

pub mod assertions;
pub mod fixtures;
pub mod repository;
