//! Handler for `collet tree`.

use miette::Result;

use collet_ops::ops_tree::{self, TreeOptions};
use collet_ops::session::ResolveOptions;

pub async fn exec(
    opts: ResolveOptions,
    depth: Option<usize>,
    why: Option<String>,
    invert: Option<String>,
) -> Result<()> {
    if depth == Some(0) {
        return Err(collet_util::errors::CollectError::Generic {
            message: "--depth must be at least 1".to_string(),
        }
        .into());
    }
    let tree = TreeOptions { depth, why, invert };
    ops_tree::tree(&opts, &tree).await
}
