//! Operation: resolve the requirements and regenerate `collet.lock`.

use collet_core::lockfile::{LockedCollection, Lockfile};
use collet_core::LOCKFILE;
use collet_resolver::collection::CollectionResolution;
use collet_util::progress;

use crate::ops_resolve;
use crate::session::{ResolveOptions, Session};

/// Force a fresh resolution and write the lockfile next to the requirements.
pub async fn lock(opts: &ResolveOptions) -> miette::Result<()> {
    let session = Session::load(opts).await?;
    let resolution = ops_resolve::run(&session)?;

    let lockfile = lockfile_from(&resolution, Some(session.requirements_hash.clone()));
    lockfile.write_to(&session.lockfile_path())?;

    progress::status(
        "Locked",
        &format!("{} collection(s) to {LOCKFILE}", lockfile.collection.len()),
    );
    Ok(())
}

/// Lockfile entries for every resolved collection, each listing the
/// collections its pinned version depends on.
pub fn lockfile_from(resolution: &CollectionResolution, requirements_hash: Option<String>) -> Lockfile {
    let graph = resolution.graph();
    let entries = resolution
        .mapping
        .iter()
        .map(|(name, candidate)| {
            let dependencies = graph
                .find(name)
                .map(|idx| {
                    graph
                        .dependencies_of(idx)
                        .into_iter()
                        .filter_map(|dep| graph.node(dep).identifier())
                        .map(ToString::to_string)
                        .collect()
                })
                .unwrap_or_default();
            LockedCollection::from_candidate(candidate, dependencies)
        })
        .collect();
    Lockfile::generate(entries, requirements_hash)
}
