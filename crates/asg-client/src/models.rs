//! Upstream payload models.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use asg_core::{Group, Instance, InstanceState};

/// How a scaling request was triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleType {
    Auto,
    Hand,
    Cron,
    Target,
    Once,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListScalingGroupResponse {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub items: Vec<ScalingGroup>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScalingGroup {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub cke_cluster_id: String,
    #[serde(default)]
    pub regions_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub node_num: i64,
    #[serde(default)]
    pub node_real_num: i64,
    #[serde(rename = "disk", default)]
    pub disk_config: Option<DiskConfig>,
    #[serde(default)]
    pub node_config: Option<NodeConfig>,
    #[serde(default)]
    pub auto_scale: Option<AutoScale>,
    #[serde(rename = "scale_node", default)]
    pub scale_nodes: Vec<ScaleNodeInstance>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiskConfig {
    #[serde(default)]
    pub system_disk: Disk,
    #[serde(default)]
    pub data_disk: Disk,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Disk {
    #[serde(default)]
    pub disk_capacity: i64,
    #[serde(default)]
    pub disk_type: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeConfig {
    #[serde(default)]
    pub res: NodeRes,
    #[serde(default)]
    pub system: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeRes {
    #[serde(default)]
    pub type_name: String,
    #[serde(default)]
    pub resource: ResourceReference,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceReference {
    #[serde(default)]
    pub cpu: i64,
    #[serde(default)]
    pub mem: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AutoScale {
    #[serde(default)]
    pub node_max: u32,
    #[serde(default)]
    pub node_min: u32,
    #[serde(default)]
    pub priority: i64,
    #[serde(default)]
    pub cooling_time: i64,
}

/// One member as the upstream reports it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScaleNodeInstance {
    /// Empty while the instance is still joining.
    #[serde(rename = "providerID", default)]
    pub provider_id: String,
    #[serde(default)]
    pub status: String,
}

impl ScalingGroup {
    /// Default pools come back without scaling, node, or disk settings and
    /// cannot be managed.
    pub fn is_manageable(&self) -> bool {
        self.auto_scale.is_some() && self.node_config.is_some() && self.disk_config.is_some()
    }

    /// Convert to a managed [`Group`], if manageable.
    pub fn to_group(&self) -> Option<Group> {
        let auto_scale = self.auto_scale.as_ref().filter(|_| self.is_manageable())?;
        Some(Group::new(
            self.id.to_string(),
            self.name.clone(),
            auto_scale.node_min,
            auto_scale.node_max,
        ))
    }

    /// Current members, minus joining instances and instances already gone.
    ///
    /// A status outside the known set is kept as [`InstanceState::Unknown`]
    /// so the instance still resolves to this group.
    pub fn members(&self) -> Vec<Instance> {
        let mut instances = Vec::with_capacity(self.scale_nodes.len());
        for node in &self.scale_nodes {
            if node.provider_id.is_empty() {
                info!(group = %self.id, "ignore instance without instance id, maybe instance is joining");
                continue;
            }
            let state = match node.status.parse::<InstanceState>() {
                Ok(state) => state,
                Err(e) => {
                    warn!(group = %self.id, instance = %node.provider_id, error = %e, "keeping instance with unknown state");
                    InstanceState::Unknown
                }
            };
            if state.is_terminal() {
                continue;
            }
            instances.push(Instance::new(node.provider_id.clone(), state));
        }
        instances
    }
}
