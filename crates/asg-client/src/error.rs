//! Client error types.

use thiserror::Error;

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("transport error: {0}")]
    Transport(#[source] anyhow::Error),

    #[error(
        "api call to [{url}], requestId [{request_id}], api router [{route}], \
         got HTTP response status code {status} error code {code:?}: {message}"
    )]
    Api {
        url: String,
        status: u16,
        code: String,
        message: String,
        request_id: String,
        route: String,
    },

    #[error("decoding response body failed: {0}")]
    Decode(String),

    #[error("signing error: {0}")]
    Sign(#[from] asg_sign::SignError),

    #[error("configuration error: {0}")]
    Config(#[from] asg_core::CoreError),

    #[error("resolution error: {0}")]
    Resolve(#[from] asg_cache::ResolveError),

    #[error("size bounds violated: {0}")]
    Bounds(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
