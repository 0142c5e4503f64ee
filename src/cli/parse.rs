//! CLI parse: clap types for Grove. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Grove - read-only HTML views of content-addressed trees
#[derive(Parser, Debug)]
#[command(name = "grove")]
#[command(about = "Render tree listings and blobs of a content-addressed object store as HTML")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Object store directory (overrides [store] path)
    #[arg(long)]
    pub store: Option<PathBuf>,

    /// Branch being browsed (default: the repository's default branch)
    #[arg(long)]
    pub head: Option<String>,

    /// Enable verbose logging
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (when output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Snapshot a directory into the store as a new commit
    Import {
        /// Directory to import
        dir: PathBuf,
        /// Ref to update (default: the repository's default branch)
        #[arg(long)]
        rev: Option<String>,
        /// Commit message
        #[arg(long, default_value = "Import")]
        message: String,
    },
    /// Render a directory listing or a blob
    Tree {
        /// Revision to show (default: the head)
        #[arg(long)]
        rev: Option<String>,
        /// Path inside the tree (default: the root)
        #[arg(long)]
        path: Option<String>,
        /// Use the render filter or embed the file when one applies
        #[arg(long)]
        render: bool,
        /// Write the HTML fragment only, without the document wrapper
        #[arg(long)]
        fragment: bool,
        /// Carry the full-message toggle into log links
        #[arg(long)]
        show_msg: bool,
    },
    /// Render the commit log, optionally limited to commits touching a path
    Log {
        /// Revision to start from (default: the head)
        #[arg(long)]
        rev: Option<String>,
        /// Only list commits that change this path
        #[arg(long)]
        path: Option<String>,
        /// Matching commits to skip
        #[arg(long, default_value_t = 0)]
        ofs: usize,
        /// Commits per page (default: [site] max_commit_count)
        #[arg(long)]
        count: Option<usize>,
        /// Write the HTML fragment only, without the document wrapper
        #[arg(long)]
        fragment: bool,
        /// Show full commit messages
        #[arg(long)]
        show_msg: bool,
    },
    /// List refs
    Refs {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Print the effective configuration
    Config {
        /// Only validate; print problems and exit non-zero on failure
        #[arg(long)]
        validate: bool,
    },
}
