//! Command dispatch and handler modules.

mod lock;
mod resolve;
mod tree;

use miette::Result;

use collet_ops::session::ResolveOptions;

use crate::cli::{Cli, Command, ResolveArgs};

/// Route a parsed CLI invocation to the appropriate command handler.
pub async fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Resolve { resolve } => resolve::exec(resolve.into()).await,
        Command::Lock { resolve } => lock::exec(resolve.into()).await,
        Command::Tree {
            resolve,
            depth,
            why,
            invert,
        } => tree::exec(resolve.into(), depth, why, invert).await,
    }
}

impl From<ResolveArgs> for ResolveOptions {
    fn from(args: ResolveArgs) -> Self {
        Self {
            requirements: args.requirements,
            index: args.index,
            config: None,
            offline: args.offline,
            pre: args.pre,
            upgrade: args.upgrade,
            no_deps: args.no_deps,
            signatures: args.signatures,
            max_rounds: args.max_rounds,
            refresh: args.refresh,
        }
    }
}
