//! Handler for `collet resolve`.

use miette::Result;

use collet_ops::ops_resolve;
use collet_ops::session::ResolveOptions;

pub async fn exec(opts: ResolveOptions) -> Result<()> {
    ops_resolve::resolve(&opts).await
}
