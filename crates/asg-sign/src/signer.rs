//! Signature computation and verification.

use std::fmt;

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use tracing::debug;

use crate::canonical::canonical_string;
use crate::error::{SignError, SignResult};
use crate::metadata::RequestMetadata;
use crate::value::{ParamValue, SignParams};
use crate::{HEADER_REQUEST_TIME, HEADER_SIGN};

type HmacSha256 = Hmac<Sha256>;

/// Compute the signature for a parameter set.
///
/// `params` is never modified; metadata is merged into a private copy.
/// With `already_signed`, every metadata entry except the signature joins
/// the parameter set. Without it, only `requestTime` does, and it must be
/// present. Metadata wins over body fields with the same key.
pub fn sign(
    params: &SignParams,
    secret: &str,
    already_signed: bool,
    metadata: &RequestMetadata,
) -> SignResult<String> {
    if secret.is_empty() {
        return Err(SignError::InvalidInput(
            "secret key must not be empty".to_string(),
        ));
    }

    let message = string_to_sign(params, already_signed, metadata)?;
    compute_mac(secret.as_bytes(), message.as_bytes())
}

/// The exact canonical string [`sign`] feeds to the MAC.
pub fn string_to_sign(
    params: &SignParams,
    already_signed: bool,
    metadata: &RequestMetadata,
) -> SignResult<String> {
    let merged = merge_metadata(params, already_signed, metadata)?;
    Ok(canonical_string(&merged))
}

/// [`sign`], taking the merge mode from the metadata's `signedHeader` flag.
pub fn sign_request(
    params: &SignParams,
    secret: &str,
    metadata: &RequestMetadata,
) -> SignResult<String> {
    sign(params, secret, metadata.is_signed(), metadata)
}

/// Recompute and compare against `signature`.
///
/// Any mismatch, including a failure to recompute, is `false`.
pub fn verify(
    params: &SignParams,
    signature: &str,
    secret: &str,
    already_signed: bool,
    metadata: &RequestMetadata,
) -> bool {
    match sign(params, secret, already_signed, metadata) {
        Ok(expected) => {
            let matches: bool = expected.as_bytes().ct_eq(signature.as_bytes()).into();
            if !matches {
                debug!(received = %signature, "signature mismatch");
            }
            matches
        }
        Err(e) => {
            debug!(error = %e, "signature could not be recomputed");
            false
        }
    }
}

/// Verify an inbound request whose signature travels in the `sign` entry.
pub fn verify_request(params: &SignParams, secret: &str, metadata: &RequestMetadata) -> bool {
    match metadata.signature() {
        Some(signature) => verify(params, signature, secret, metadata.is_signed(), metadata),
        None => {
            debug!("request carries no signature");
            false
        }
    }
}

fn merge_metadata(
    params: &SignParams,
    already_signed: bool,
    metadata: &RequestMetadata,
) -> SignResult<SignParams> {
    let mut merged = params.clone();

    if already_signed {
        for (name, value) in metadata.iter() {
            if name.eq_ignore_ascii_case(HEADER_SIGN) {
                continue;
            }
            merged.insert(name.to_string(), ParamValue::String(value.to_string()));
        }
    } else {
        let request_time = metadata.request_time().ok_or_else(|| {
            SignError::InvalidInput(format!("{HEADER_REQUEST_TIME} is required"))
        })?;
        merged.insert(
            HEADER_REQUEST_TIME.to_string(),
            ParamValue::String(request_time.to_string()),
        );
    }

    Ok(merged)
}

fn compute_mac(secret: &[u8], message: &[u8]) -> SignResult<String> {
    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| SignError::InvalidInput(format!("invalid secret key: {e}")))?;
    mac.update(message);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// A signer bound to one static secret.
#[derive(Clone)]
pub struct Signer {
    secret: String,
}

impl Signer {
    /// Fails if the secret is empty.
    pub fn new(secret: impl Into<String>) -> SignResult<Self> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(SignError::InvalidInput(
                "secret key must not be empty".to_string(),
            ));
        }
        Ok(Self { secret })
    }

    pub fn sign(&self, params: &SignParams, metadata: &RequestMetadata) -> SignResult<String> {
        sign_request(params, &self.secret, metadata)
    }

    pub fn verify(&self, params: &SignParams, metadata: &RequestMetadata) -> bool {
        verify_request(params, &self.secret, metadata)
    }
}

impl fmt::Debug for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signer").field("secret", &"<redacted>").finish()
    }
}
