//! The HTTP boundary.

use async_trait::async_trait;
use http::{HeaderMap, Method, StatusCode};
use serde_json::{Map, Value};

use asg_sign::RequestMetadata;

/// A request ready to go on the wire: URL resolved, metadata signed.
#[derive(Debug, Clone)]
pub struct SignedRequest {
    pub method: Method,
    pub url: String,
    /// Header names keep their exact spelling; the upstream signs them as-is.
    pub metadata: RequestMetadata,
    pub body: Map<String, Value>,
}

impl SignedRequest {
    pub fn body_bytes(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(&self.body)
    }
}

/// What came back from the upstream, before envelope checking.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

/// Sends signed requests. Retries and timeouts live here, not in the client.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: SignedRequest) -> anyhow::Result<RawResponse>;
}
