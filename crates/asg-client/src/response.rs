//! Response envelope checking.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ClientError, ClientResult};
use crate::transport::RawResponse;

/// Header naming the gateway route that served the call.
const ROUTE_HEADER: &str = "X-Gateway-Route-No";

/// Envelope wrapped around every upstream payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiResponse {
    /// `"200"` or `200` on success.
    #[serde(default)]
    pub code: Value,
    #[serde(default)]
    pub result: Value,
    #[serde(default)]
    pub message: String,
    #[serde(rename = "requestId", default)]
    pub request_id: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(rename = "isSuccess", default)]
    pub is_success: bool,
}

impl ApiResponse {
    /// Code as text, whether the upstream sent it as a string or a number.
    pub fn code(&self) -> String {
        match &self.code {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    /// Decode `result` into a typed model.
    pub fn decode<T: DeserializeOwned>(&self) -> ClientResult<T> {
        serde_json::from_value(self.result.clone()).map_err(|e| ClientError::Decode(e.to_string()))
    }
}

/// Accept a 2xx response carrying code 200; anything else is an API error.
pub fn check_response(url: &str, raw: &RawResponse) -> ClientResult<ApiResponse> {
    let route = raw
        .headers
        .get(ROUTE_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let body_text = String::from_utf8_lossy(&raw.body).into_owned();

    if !raw.status.is_success() {
        return Err(ClientError::Api {
            url: url.to_string(),
            status: raw.status.as_u16(),
            code: String::new(),
            message: body_text,
            request_id: String::new(),
            route,
        });
    }

    let response: ApiResponse =
        serde_json::from_slice(&raw.body).map_err(|e| ClientError::Decode(e.to_string()))?;
    if response.code() != "200" {
        let message = if response.message.is_empty() {
            body_text
        } else {
            response.message.clone()
        };
        return Err(ClientError::Api {
            url: url.to_string(),
            status: raw.status.as_u16(),
            code: response.code(),
            message,
            request_id: response.request_id.clone(),
            route,
        });
    }

    Ok(response)
}
