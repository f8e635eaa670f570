//! CLI argument definitions for Collet.
//!
//! Uses `clap` derive macros to define the command surface. Each command
//! corresponds to a handler in the [`super::commands`] module.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "collet",
    version,
    about = "Resolve collection dependencies",
    long_about = "Collet picks one mutually compatible version of every collection named in \
                  collections.toml, following transitive dependencies, and can record the \
                  result in collet.lock."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve requirements and print the chosen versions
    Resolve {
        #[command(flatten)]
        resolve: ResolveArgs,
    },

    /// Resolve requirements and write collet.lock
    Lock {
        #[command(flatten)]
        resolve: ResolveArgs,
    },

    /// Print the resolved dependency tree
    Tree {
        #[command(flatten)]
        resolve: ResolveArgs,
        /// Maximum depth
        #[arg(long)]
        depth: Option<usize>,
        /// Explain why a collection is included
        #[arg(long)]
        why: Option<String>,
        /// Show what depends on a collection
        #[arg(long, short = 'i')]
        invert: Option<String>,
    },
}

/// Flags shared by every resolving command.
#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Requirements file (default: nearest collections.toml)
    #[arg(short, long)]
    pub requirements: Option<PathBuf>,
    /// Resolve against a JSON index file instead of the configured registries
    #[arg(long)]
    pub index: Option<PathBuf>,
    /// Use only cached metadata
    #[arg(long)]
    pub offline: bool,
    /// Allow pre-release versions
    #[arg(long)]
    pub pre: bool,
    /// Prefer the newest versions over locked ones
    #[arg(short = 'U', long)]
    pub upgrade: bool,
    /// Resolve only the listed collections, not their dependencies
    #[arg(long)]
    pub no_deps: bool,
    /// Only accept signed collection versions
    #[arg(long)]
    pub signatures: bool,
    /// Give up after this many resolution rounds
    #[arg(long, env = "COLLET_MAX_ROUNDS")]
    pub max_rounds: Option<usize>,
    /// Re-download metadata even when cached
    #[arg(long)]
    pub refresh: bool,
}

pub fn parse() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn tree_flags() {
        let cli = Cli::parse_from([
            "collet",
            "tree",
            "--depth",
            "2",
            "--why",
            "ansible.utils",
            "--offline",
        ]);
        match cli.command {
            Command::Tree {
                depth,
                why,
                resolve,
                ..
            } => {
                assert_eq!(depth, Some(2));
                assert_eq!(why.as_deref(), Some("ansible.utils"));
                assert!(resolve.offline);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
