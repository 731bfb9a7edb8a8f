use clap::{Parser, Subcommand};
use git_accessor::commands::*;
use git_accessor::core::{
    config::AccessConfig,
    error::{GitAccessorError, Result},
    print_error,
};
use std::env;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "git-accessor")]
#[command(about = "Typed access to a git repository through the git command line")]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Log every git invocation
    #[arg(long, global = true)]
    log_calls: bool,

    /// Default output encoding (WHATWG label, e.g. "utf-8", "windows-1252")
    #[arg(long, global = true, value_name = "LABEL")]
    encoding: Option<String>,

    /// git executable to run
    #[arg(long, global = true, value_name = "PATH")]
    git: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an arbitrary git command and exit with its exit code
    Exec {
        /// Cancel the command and its child processes after this many seconds
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,
        /// Arguments passed to git, after `--`
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Show the reflog of a reference
    Reflog {
        #[arg(default_value = "HEAD")]
        reference: String,
        /// Show at most N entries
        #[arg(long, value_name = "N")]
        max_count: Option<usize>,
        #[arg(long)]
        json: bool,
    },
    /// Show the content of a tree as a hierarchy
    Tree {
        #[arg(default_value = "HEAD")]
        treeish: String,
        #[arg(long)]
        json: bool,
    },
    /// Print a blob, or extract it into the blob cache
    Blob {
        treeish: String,
        path: String,
        /// Write the blob to the cache and print its path
        #[arg(long)]
        extract: bool,
    },
    /// List remotes with their fetch and push URLs
    Remotes {
        #[arg(long)]
        json: bool,
    },
    /// List commit authors by number of commits
    Users {
        #[arg(long)]
        json: bool,
    },
}

fn load_config(cli: &Cli) -> Result<AccessConfig> {
    let mut config = AccessConfig::load_or_create().unwrap_or_else(|e| {
        log::warn!("Using default configuration: {e}");
        AccessConfig::default()
    });
    if cli.log_calls {
        config.log_cli_calls = true;
    }
    if let Some(label) = &cli.encoding {
        config.default_encoding = label.clone();
    }
    if let Some(git) = &cli.git {
        config.git_path = git.clone();
    }
    config.install()?;
    Ok(config)
}

fn run(cli: Cli) -> Result<i32> {
    let config = load_config(&cli)?;
    let process = config.process();

    match cli.command {
        Commands::Exec { timeout, args } => return execute_exec(&process, args, timeout),
        Commands::Reflog {
            reference,
            max_count,
            json,
        } => execute_reflog(&process, &reference, max_count, json)?,
        Commands::Tree { treeish, json } => execute_tree(&process, &treeish, json)?,
        Commands::Blob {
            treeish,
            path,
            extract,
        } => execute_blob(&process, &treeish, &path, extract)?,
        Commands::Remotes { json } => execute_remotes(&process, json)?,
        Commands::Users { json } => execute_users(&process, json)?,
    }
    Ok(0)
}

fn main() {
    let cli = Cli::parse();

    // Configure logging based on --debug flag
    if cli.debug {
        env::set_var("RUST_LOG", "debug");
    } else {
        env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(GitAccessorError::NotInGitRepo) => {
            print_error("Not in a git repository");
            std::process::exit(1);
        }
        Err(e) => {
            print_error(&e.to_string());
            std::process::exit(1);
        }
    }
}
