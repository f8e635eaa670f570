//! Handler for `collet lock`.

use miette::Result;

use collet_ops::ops_lock;
use collet_ops::session::ResolveOptions;

pub async fn exec(opts: ResolveOptions) -> Result<()> {
    ops_lock::lock(&opts).await
}
