//! Resolution error types.

use thiserror::Error;

pub type ResolveResult<T> = Result<T, ResolveError>;

/// Errors surfaced by a resync.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("failed to list members of group {group_id}: {source}")]
    Lister {
        group_id: String,
        #[source]
        source: anyhow::Error,
    },
}
