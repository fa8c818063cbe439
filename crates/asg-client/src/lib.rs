//! asg-client: signed calls against the scaling-group API.
//!
//! Wraps the four upstream operations the autoscaler needs (list groups,
//! describe one group, add instances, remove instances) and the
//! [`GroupManager`] that builds scaling decisions on top of them and on the
//! [`ResolutionCache`](asg_cache::ResolutionCache).
//!
//! The HTTP exchange itself is behind the [`Transport`] trait. This crate
//! only produces fully signed [`SignedRequest`]s and interprets the
//! [`RawResponse`] that comes back.
//!
//! # Request envelope
//!
//! ```text
//! algorithm:    HmacSHA256
//! accessKey:    <access key>
//! signedHeader: 1
//! requestTime:  <unix millis>
//! sign:         HMAC over body (+ GET query) + all of the above
//! Content-Type: application/json   (POST/DELETE, added after signing)
//! ```

pub mod client;
pub mod error;
pub mod manager;
pub mod models;
pub mod request;
pub mod response;
pub mod transport;

pub use client::{ApiClient, Clock, Credential};
pub use error::{ClientError, ClientResult};
pub use manager::{GroupManager, MASTER_ROLE_LABEL, NodeRef};
pub use models::*;
pub use response::{ApiResponse, check_response};
pub use transport::{RawResponse, SignedRequest, Transport};
