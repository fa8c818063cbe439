//! Signing error types.

use thiserror::Error;

pub type SignResult<T> = Result<T, SignError>;

/// Errors raised while computing a signature.
///
/// A signature that fails verification is not an error; `verify` reports it
/// as `false` and leaves the reaction to the caller.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignError {
    #[error("generate sign parameters error: {0}")]
    InvalidInput(String),
}
