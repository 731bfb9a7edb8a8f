//! Predicates for command output.

#![allow(dead_code)]

use predicates::prelude::*;

pub fn not_in_git_repo() -> impl Predicate<str> {
    predicates::str::contains("Not in a git repository")
}

/// `git <verb> ... failed with exit code <code>`
pub fn command_failed(verb: &str, code: i32) -> impl Predicate<str> {
    predicates::str::contains(format!("git {verb}"))
        .and(predicates::str::contains(format!("failed with exit code {code}")))
}

pub fn has_selector(reference: &str, index: usize) -> impl Predicate<str> {
    predicates::str::contains(format!("{reference}@{{{index}}}"))
}
