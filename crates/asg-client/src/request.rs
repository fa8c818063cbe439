//! Request descriptions: which path, query, and body parameters each
//! upstream call carries.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::models::ScaleType;

pub const LIST_SCALING_GROUPS_URI: &str =
    "/csk-open/api/csk/{region_id}/clusters/{ckecluster_id}/scalingGroups";
pub const DESCRIBE_SCALING_GROUP_URI: &str =
    "/csk-open/api/csk/{region_id}/clusters/{ckecluster_id}/scalingGroups/{group_id}";
pub const SCALING_GROUP_INSTANCES_URI: &str =
    "/csk-open/api/csk/{region_id}/clusters/{ckecluster_id}/scalingGroups/{group_id}/instances";

/// Parameters of one upstream call.
pub trait ApiRequest {
    /// `{name}` placeholders substituted into the URI template.
    fn path_params(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }

    /// Appended to the URI as `?k=v&...`.
    fn query_params(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }

    /// JSON body; also the signed parameter set.
    fn body(&self) -> Map<String, Value> {
        Map::new()
    }
}

fn to_body<T: Serialize>(request: &T) -> Map<String, Value> {
    match serde_json::to_value(request) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

#[derive(Debug, Clone, Default)]
pub struct ListScalingGroupsRequest;

impl ApiRequest for ListScalingGroupsRequest {}

#[derive(Debug, Clone)]
pub struct DescribeScalingGroupRequest {
    pub group_id: String,
}

impl ApiRequest for DescribeScalingGroupRequest {
    fn path_params(&self) -> Vec<(&'static str, String)> {
        vec![("group_id", self.group_id.clone())]
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateScalingGroupInstancesRequest {
    #[serde(skip)]
    pub group_id: String,
    pub delta: u32,
    pub scale_type: ScaleType,
    pub rule_name: String,
}

impl ApiRequest for CreateScalingGroupInstancesRequest {
    fn path_params(&self) -> Vec<(&'static str, String)> {
        vec![("group_id", self.group_id.clone())]
    }

    fn body(&self) -> Map<String, Value> {
        to_body(self)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteScalingGroupInstancesRequest {
    #[serde(skip)]
    pub group_id: String,
    #[serde(rename = "instanceIds")]
    pub instance_ids: Vec<String>,
    pub rule_name: String,
    pub scale_type: ScaleType,
}

impl ApiRequest for DeleteScalingGroupInstancesRequest {
    fn path_params(&self) -> Vec<(&'static str, String)> {
        vec![("group_id", self.group_id.clone())]
    }

    fn body(&self) -> Map<String, Value> {
        to_body(self)
    }
}
