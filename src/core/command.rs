//! Git command model and command-line rendering.
//!
//! A [`Command`] is a verb plus an ordered list of arguments. It is an immutable value
//! once built and renders deterministically into the single argument string handed to
//! the git executable.
//!
//! # Quoting
//! Rendering follows the MSVC/`CommandLineToArgvW` convention, which is what git for
//! Windows uses to split its command line:
//! - arguments that are empty, contain whitespace, or contain `"` are wrapped in quotes
//! - an embedded `"` is escaped with a backslash
//! - backslashes are only special when they precede a quote; in that case they are doubled
//!
//! [`split_command_line`] implements the splitting side of the same convention, so
//! `split_command_line(&cmd.render())` reproduces the verb and arguments exactly.

use std::fmt;

/// Separates options from paths.
pub const NO_MORE_OPTIONS: &str = "--";

/// Makes git terminate records with NUL instead of newline.
pub const NULL_TERMINATE: &str = "-z";

/// `--max-count=<n>`
pub fn max_count(count: u32) -> String {
    format!("--max-count={count}")
}

/// `--format=<format>`
pub fn format(format: &str) -> String {
    format!("--format={format}")
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Command {
    verb: String,
    arguments: Vec<String>,
}

impl Command {
    pub fn new(verb: impl Into<String>) -> Self {
        Self {
            verb: verb.into(),
            arguments: Vec::new(),
        }
    }

    pub fn with_arguments<I, S>(verb: impl Into<String>, arguments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(verb).args(arguments)
    }

    pub fn arg(mut self, argument: impl Into<String>) -> Self {
        self.arguments.push(argument.into());
        self
    }

    pub fn args<I, S>(mut self, arguments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.arguments.extend(arguments.into_iter().map(Into::into));
        self
    }

    pub fn verb(&self) -> &str {
        &self.verb
    }

    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    /// Verb followed by the arguments, as passed to the process on unix.
    pub fn argv(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.verb.as_str()).chain(self.arguments.iter().map(String::as_str))
    }

    /// Render the verb and arguments into a single command-line string.
    pub fn render(&self) -> String {
        let mut line = String::new();
        for (i, argument) in self.argv().enumerate() {
            if i > 0 {
                line.push(' ');
            }
            append_argument(&mut line, argument);
        }
        line
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

fn needs_quoting(argument: &str) -> bool {
    argument.is_empty() || argument.chars().any(|c| c.is_whitespace() || c == '"')
}

fn push_backslashes(line: &mut String, count: usize) {
    line.extend(std::iter::repeat('\\').take(count));
}

fn append_argument(line: &mut String, argument: &str) {
    if !needs_quoting(argument) {
        line.push_str(argument);
        return;
    }

    line.push('"');
    let mut backslashes = 0;
    for c in argument.chars() {
        match c {
            '\\' => backslashes += 1,
            '"' => {
                push_backslashes(line, backslashes * 2 + 1);
                line.push('"');
                backslashes = 0;
            }
            _ => {
                push_backslashes(line, backslashes);
                line.push(c);
                backslashes = 0;
            }
        }
    }
    // Trailing backslashes precede the closing quote.
    push_backslashes(line, backslashes * 2);
    line.push('"');
}

/// Split a command line the way the MSVC runtime does.
pub fn split_command_line(line: &str) -> Vec<String> {
    let mut arguments = Vec::new();
    let mut current = String::new();
    let mut in_argument = false;
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            ' ' | '\t' if !in_quotes => {
                if in_argument {
                    arguments.push(std::mem::take(&mut current));
                    in_argument = false;
                }
            }
            '\\' => {
                in_argument = true;
                let mut count = 1;
                while chars.peek() == Some(&'\\') {
                    chars.next();
                    count += 1;
                }
                if chars.peek() == Some(&'"') {
                    push_backslashes(&mut current, count / 2);
                    if count % 2 == 1 {
                        chars.next();
                        current.push('"');
                    }
                } else {
                    push_backslashes(&mut current, count);
                }
            }
            '"' => {
                in_argument = true;
                if in_quotes && chars.peek() == Some(&'"') {
                    chars.next();
                    current.push('"');
                } else {
                    in_quotes = !in_quotes;
                }
            }
            _ => {
                in_argument = true;
                current.push(c);
            }
        }
    }

    if in_argument {
        arguments.push(current);
    }
    arguments
}
