//! Signed API client.

use std::fmt;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use http::{Method, Uri};
use serde_json::Value;
use tracing::{debug, error, info};

use asg_core::CloudConfig;
use asg_sign::{
    ALGORITHM_HMAC_SHA256, HEADER_ACCESS_KEY, HEADER_ALGORITHM, HEADER_REQUEST_TIME, HEADER_SIGN,
    HEADER_SIGNED, ParamValue, RequestMetadata, SIGNED_HEADER_VALUE, params_from_json,
    sign_request,
};

use crate::error::{ClientError, ClientResult};
use crate::models::{ListScalingGroupResponse, ScaleType, ScalingGroup};
use crate::request::{
    ApiRequest, CreateScalingGroupInstancesRequest, DESCRIBE_SCALING_GROUP_URI,
    DeleteScalingGroupInstancesRequest, DescribeScalingGroupRequest, LIST_SCALING_GROUPS_URI,
    ListScalingGroupsRequest, SCALING_GROUP_INSTANCES_URI,
};
use crate::response::{ApiResponse, check_response};
use crate::transport::{SignedRequest, Transport};

const CONTENT_TYPE: &str = "Content-Type";
const APPLICATION_JSON: &str = "application/json";

/// Source of `requestTime`, in unix milliseconds.
pub type Clock = Arc<dyn Fn() -> u64 + Send + Sync>;

fn system_clock() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

/// Access key / secret key pair.
#[derive(Clone)]
pub struct Credential {
    pub access_key: String,
    pub secret_key: String,
}

impl Credential {
    pub fn new(access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

/// Client for one cluster's scaling-group API.
pub struct ApiClient {
    /// `scheme://authority`, no trailing slash.
    base_url: String,
    region_id: String,
    cluster_id: String,
    credential: Credential,
    transport: Arc<dyn Transport>,
    clock: Clock,
}

impl ApiClient {
    pub fn new(
        endpoint: &str,
        region_id: impl Into<String>,
        cluster_id: impl Into<String>,
        credential: Credential,
        transport: Arc<dyn Transport>,
    ) -> ClientResult<Self> {
        Ok(Self {
            base_url: base_url(endpoint)?,
            region_id: region_id.into(),
            cluster_id: cluster_id.into(),
            credential,
            transport,
            clock: Arc::new(system_clock),
        })
    }

    /// Build a client from a validated cloud configuration.
    pub fn from_config(config: &CloudConfig, transport: Arc<dyn Transport>) -> ClientResult<Self> {
        config.validate()?;
        let global = &config.global;
        Self::new(
            &global.endpoint,
            global.region_id.clone(),
            global.cluster_id.clone(),
            Credential::new(global.access_key.clone(), global.secret_key.clone()),
            transport,
        )
    }

    /// Replace the clock used for `requestTime`.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Substitute cluster and per-request parameters into `template`.
    pub fn render_uri(&self, template: &str, request: &impl ApiRequest) -> ClientResult<String> {
        let mut path = template
            .replace("{region_id}", &self.region_id)
            .replace("{ckecluster_id}", &self.cluster_id);
        for (name, value) in request.path_params() {
            path = path.replace(&format!("{{{name}}}"), &value);
        }
        if path.contains('{') {
            return Err(ClientError::InvalidArgument(format!(
                "unresolved path parameter in {path}"
            )));
        }

        let query = request.query_params();
        if !query.is_empty() {
            let pairs: Vec<String> = query.iter().map(|(k, v)| format!("{k}={v}")).collect();
            path.push('?');
            path.push_str(&pairs.join("&"));
        }
        Ok(format!("{}{}", self.base_url, path))
    }

    /// Render, sign, and package a request without sending it.
    pub fn build_request(
        &self,
        method: Method,
        template: &str,
        request: &impl ApiRequest,
    ) -> ClientResult<SignedRequest> {
        let url = self.render_uri(template, request)?;
        let body = request.body();

        let mut params = params_from_json(&body);
        if method == Method::GET {
            for (name, value) in request.query_params() {
                params.insert(name.to_string(), ParamValue::String(value));
            }
        }

        let mut metadata = RequestMetadata::new();
        metadata.insert(HEADER_ALGORITHM, ALGORITHM_HMAC_SHA256);
        metadata.insert(HEADER_ACCESS_KEY, self.credential.access_key.as_str());
        metadata.insert(HEADER_SIGNED, SIGNED_HEADER_VALUE);
        metadata.insert(HEADER_REQUEST_TIME, (self.clock)().to_string());

        let signature = sign_request(&params, &self.credential.secret_key, &metadata)?;
        metadata.insert(HEADER_SIGN, signature);

        if method != Method::GET {
            metadata.insert(CONTENT_TYPE, APPLICATION_JSON);
        }

        Ok(SignedRequest {
            method,
            url,
            metadata,
            body,
        })
    }

    async fn call(
        &self,
        method: Method,
        template: &str,
        request: &impl ApiRequest,
    ) -> ClientResult<ApiResponse> {
        let signed = self.build_request(method, template, request)?;
        let url = signed.url.clone();
        debug!(method = %signed.method, url = %url, "sending request");

        let raw = self
            .transport
            .send(signed)
            .await
            .map_err(ClientError::Transport)?;
        check_response(&url, &raw)
    }

    /// List every scaling group in the cluster.
    pub async fn list_scaling_groups(&self) -> ClientResult<ListScalingGroupResponse> {
        let response = self
            .call(Method::GET, LIST_SCALING_GROUPS_URI, &ListScalingGroupsRequest)
            .await?;
        response.decode()
    }

    /// Fetch one scaling group, members included.
    pub async fn describe_scaling_group(&self, group_id: &str) -> ClientResult<ScalingGroup> {
        let request = DescribeScalingGroupRequest {
            group_id: group_id.to_string(),
        };
        let response = self
            .call(Method::GET, DESCRIBE_SCALING_GROUP_URI, &request)
            .await?;
        response.decode()
    }

    /// Ask the upstream to add `delta` instances.
    pub async fn create_instances(
        &self,
        group_id: &str,
        delta: u32,
        scale_type: ScaleType,
        rule_name: &str,
    ) -> ClientResult<Value> {
        let request = CreateScalingGroupInstancesRequest {
            group_id: group_id.to_string(),
            delta,
            scale_type,
            rule_name: rule_name.to_string(),
        };
        match self
            .call(Method::POST, SCALING_GROUP_INSTANCES_URI, &request)
            .await
        {
            Ok(response) => {
                info!(group = %group_id, delta, rule = %rule_name, "requested scaling group instances");
                Ok(response.result)
            }
            Err(e) => {
                error!(group = %group_id, error = %e, "failed to create scaling instances");
                Err(e)
            }
        }
    }

    /// Ask the upstream to remove specific instances.
    pub async fn delete_instances(
        &self,
        group_id: &str,
        instance_ids: &[String],
        scale_type: ScaleType,
        rule_name: &str,
    ) -> ClientResult<Value> {
        let request = DeleteScalingGroupInstancesRequest {
            group_id: group_id.to_string(),
            instance_ids: instance_ids.to_vec(),
            rule_name: rule_name.to_string(),
            scale_type,
        };
        match self
            .call(Method::DELETE, SCALING_GROUP_INSTANCES_URI, &request)
            .await
        {
            Ok(response) => {
                info!(group = %group_id, count = instance_ids.len(), rule = %rule_name, "requested instance removal");
                Ok(response.result)
            }
            Err(e) => {
                error!(group = %group_id, error = %e, "failed to delete scaling instances");
                Err(e)
            }
        }
    }
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("region_id", &self.region_id)
            .field("cluster_id", &self.cluster_id)
            .field("credential", &self.credential)
            .finish_non_exhaustive()
    }
}

/// Reduce an endpoint to `scheme://authority`.
fn base_url(endpoint: &str) -> ClientResult<String> {
    let uri: Uri = endpoint
        .parse()
        .map_err(|e| ClientError::InvalidArgument(format!("invalid endpoint {endpoint:?}: {e}")))?;
    match (uri.scheme_str(), uri.authority()) {
        (Some(scheme), Some(authority)) => Ok(format!("{scheme}://{authority}")),
        _ => Err(ClientError::InvalidArgument(format!(
            "endpoint {endpoint:?} needs a scheme and host"
        ))),
    }
}
