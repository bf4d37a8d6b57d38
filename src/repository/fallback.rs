//! Remote-first-with-local-fallback combinator.
//!
//! Every repository write follows the same shape: attempt the preferred
//! (remote) operation; on any failure, log it and redirect to the local
//! store. Only the fallback's own failure escalates to the caller.

use crate::remote::store::RemoteError;
use crate::storage::database::DatabaseError;
use std::future::Future;

/// Which store ended up serving an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorePath {
    Remote,
    Local,
}

/// Run the preferred remote operation, falling back to the local store.
///
/// The remote error is absorbed (logged at warn); only a failure of the
/// local fallback propagates.
pub async fn with_fallback<T, P, F, PFut, FFut>(
    what: &str,
    preferred: P,
    fallback: F,
) -> Result<(T, StorePath), DatabaseError>
where
    P: FnOnce() -> PFut,
    PFut: Future<Output = Result<T, RemoteError>>,
    F: FnOnce() -> FFut,
    FFut: Future<Output = Result<T, DatabaseError>>,
{
    match preferred().await {
        Ok(value) => Ok((value, StorePath::Remote)),
        Err(remote_err) => {
            tracing::warn!("{what}: remote store failed, using local store: {remote_err}");
            let value = fallback().await?;
            Ok((value, StorePath::Local))
        }
    }
}
