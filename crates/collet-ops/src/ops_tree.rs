//! Operation: display the resolved dependency tree.

use collet_core::name::CollectionName;
use collet_core::{LOCKFILE, REQUIREMENTS_FILE};
use collet_util::errors::CollectError;

use crate::ops_resolve;
use crate::session::{ResolveOptions, Session};

/// Options for `collet tree`.
#[derive(Debug, Default)]
pub struct TreeOptions {
    /// Maximum tree depth to display.
    pub depth: Option<usize>,
    /// Explain why a collection is included.
    pub why: Option<String>,
    /// Show what depends on a collection instead of what it depends on.
    pub invert: Option<String>,
}

/// Resolve and print the tree for the project.
pub async fn tree(opts: &ResolveOptions, tree: &TreeOptions) -> miette::Result<()> {
    let session = Session::load(opts).await?;
    let resolution = ops_resolve::run(&session)?;
    let graph = resolution.graph();

    if let Some(target) = &tree.why {
        let name = parse_name(target)?;
        match graph.find_path(&name) {
            Some(path) => {
                println!("Path to {name}:");
                for (i, candidate) in path.iter().enumerate() {
                    let indent = "  ".repeat(i);
                    println!("{indent}{candidate}");
                }
                let locked = session
                    .lockfile
                    .as_ref()
                    .and_then(|lock| lock.locked_version(&name.to_string()));
                if let Some(version) = locked {
                    println!("Locked at {version} in {LOCKFILE}");
                }
            }
            None => println!("Collection '{name}' is not part of the resolution."),
        }
        return Ok(());
    }

    if let Some(target) = &tree.invert {
        let name = parse_name(target)?;
        let output = graph.print_inverted_tree(&name);
        if output.is_empty() {
            println!("Collection '{name}' is not part of the resolution.");
        } else {
            print!("{output}");
        }
        return Ok(());
    }

    if graph.is_empty() {
        println!("No collections.");
        return Ok(());
    }
    let label = session
        .requirements_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| REQUIREMENTS_FILE.to_string());
    print!("{}", graph.print_tree(&label, tree.depth));
    Ok(())
}

fn parse_name(s: &str) -> miette::Result<CollectionName> {
    CollectionName::parse(s).map_err(|e| {
        CollectError::Requirement {
            message: e.to_string(),
        }
        .into()
    })
}
