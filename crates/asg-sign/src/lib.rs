//! asg-sign: canonical request signing for the scaling-group API.
//!
//! Every outbound call is authenticated with an HMAC-SHA256 over a
//! canonical rendering of its parameters. The signer is a pure function of
//! its inputs: same parameters, secret, and metadata always produce the same
//! signature, which is what lets the receiving side verify by recomputation.
//!
//! # Canonical string
//!
//! ```text
//! params   = body fields ∪ signed metadata   (metadata wins on clashes)
//! tokens   = for key in sorted(params):
//!              string     → key="value"
//!              number     → key=42
//!              structured → key=<compact JSON>
//! message  = tokens joined by "&"
//! sign     = lowercase hex(HMAC-SHA256(secret, message))
//! ```
//!
//! # Signed metadata
//!
//! If the request metadata already carries `signedHeader=1`, every metadata
//! entry except `sign` is folded into the parameter set. Otherwise only
//! `requestTime` is.

pub mod canonical;
pub mod error;
pub mod metadata;
pub mod signer;
pub mod value;

pub use canonical::canonical_string;
pub use error::{SignError, SignResult};
pub use metadata::RequestMetadata;
pub use signer::{Signer, sign, sign_request, string_to_sign, verify, verify_request};
pub use value::{ParamValue, SignParams, params_from_json};

/// Metadata key naming the MAC algorithm.
pub const HEADER_ALGORITHM: &str = "algorithm";
/// The only algorithm the API accepts.
pub const ALGORITHM_HMAC_SHA256: &str = "HmacSHA256";
/// Metadata key carrying the caller's access key.
pub const HEADER_ACCESS_KEY: &str = "accessKey";
/// Metadata key carrying the request time in unix milliseconds.
pub const HEADER_REQUEST_TIME: &str = "requestTime";
/// Metadata key carrying the signature itself.
pub const HEADER_SIGN: &str = "sign";
/// Metadata key marking the metadata as part of the signed material.
pub const HEADER_SIGNED: &str = "signedHeader";
/// Value of [`HEADER_SIGNED`] that enables metadata signing.
pub const SIGNED_HEADER_VALUE: &str = "1";
