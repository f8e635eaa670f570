//! Operation: resolve the requirements and print the chosen versions.

use collet_util::progress;

use crate::reporter::ProgressReporter;
use crate::session::{ResolveOptions, Session};

/// Resolve and print one `name version source` line per collection.
pub async fn resolve(opts: &ResolveOptions) -> miette::Result<()> {
    let session = Session::load(opts).await?;
    let resolution = run(&session)?;

    for candidate in resolution.mapping.values() {
        println!("{} {} {}", candidate.name, candidate.version, candidate.source);
    }
    progress::status(
        "Resolved",
        &format!("{} collection(s)", resolution.mapping.len()),
    );
    Ok(())
}

/// Resolve the session's requirements behind a spinner.
pub fn run(session: &Session) -> miette::Result<collet_resolver::collection::CollectionResolution> {
    let bar = if console::user_attended_stderr() {
        progress::spinner("Resolving collections")
    } else {
        progress::hidden_spinner()
    };
    let mut reporter = ProgressReporter::new(bar);
    let result = session.resolve_with(&mut reporter);
    reporter.finish();
    result
}
