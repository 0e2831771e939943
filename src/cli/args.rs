//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--modules-dir <path>`: Use this modules root instead of the configured one
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Minimal output

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Bespoke - install and manage client modules from GitHub
#[derive(Parser, Debug)]
#[command(name = "bespoke")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Modules root (overrides the `modules_dir` config key)
    #[arg(long, global = true, value_name = "DIR")]
    pub modules_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the modules root and an empty vault
    #[command(
        name = "init",
        long_about = "Create the modules root and an empty vault.\n\n\
            The vault records every installed module. Package commands refuse \
            to run until it exists. Running init again is harmless."
    )]
    Init,

    /// Install, update and remove modules
    #[command(
        name = "pkg",
        after_help = "\
WORKFLOW EXAMPLES:
    # Install a module from its metadata URL
    bespoke pkg add Delusoire/bespoke-modules/main/stats/metadata.json

    # Pinned to a tag (escape slashes in tag names)
    bespoke pkg add octo/repo/release%2F1.0/metadata.json

    # Update, then list
    bespoke pkg update Delusoire/stats
    bespoke pkg list"
    )]
    Pkg {
        #[command(subcommand)]
        action: PkgAction,
    },

    /// Get, set, or list configuration values
    #[command(
        name = "config",
        after_help = "\
WORKFLOW EXAMPLES:
    # See all configuration
    bespoke config list

    # Point at a different modules root
    bespoke config set modules_dir /opt/client/modules

    # Read one value
    bespoke config get github.api_base"
    )]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completion scripts
    #[command(
        name = "completion",
        long_about = "Generate shell completion scripts for tab-completion.\n\n\
            Outputs a completion script for the specified shell. Add the output \
            to your shell's configuration to enable tab-completion for bespoke commands.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Bash (add to ~/.bashrc)
    bespoke completion bash >> ~/.bashrc

    # Zsh (add to ~/.zshrc)
    bespoke completion zsh >> ~/.zshrc

    # Fish
    bespoke completion fish > ~/.config/fish/completions/bespoke.fish

    # PowerShell
    bespoke completion powershell >> $PROFILE"
    )]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Module subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum PkgAction {
    /// Install modules from their metadata URLs
    Add {
        /// `owner/repo/version/path/metadata.json`, optionally prefixed with
        /// the raw.githubusercontent.com host
        #[arg(required = true, value_name = "METADATA_URL")]
        murls: Vec<String>,
    },
    /// Remove installed modules (missing ones are ignored)
    #[command(visible_alias = "rm")]
    Rem {
        /// Module identifiers (`author/name`)
        #[arg(required = true, value_name = "ID")]
        ids: Vec<String>,
    },
    /// Update installed modules to the version their metadata URL serves
    Update {
        /// Module identifiers (`author/name`)
        #[arg(required = true, value_name = "ID")]
        ids: Vec<String>,
    },
    /// Mark a module enabled
    Enable {
        /// Module identifier (`author/name`)
        id: String,
    },
    /// Mark a module disabled
    Disable {
        /// Module identifier (`author/name`)
        id: String,
    },
    /// List installed modules
    #[command(visible_alias = "ls")]
    List,
}

/// Config subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Get a configuration value
    Get {
        /// Configuration key
        key: String,
    },
    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,
        /// Value to set
        value: String,
    },
    /// List all configuration values
    List,
}

/// Supported shells for completion
#[derive(clap::ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}
