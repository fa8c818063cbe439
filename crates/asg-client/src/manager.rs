//! Group manager: scaling decisions on top of the client and the cache.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use asg_cache::{GroupLister, ResolutionCache};
use asg_core::{CloudConfig, Group, Instance, InstanceState, NodeGroupSpec};

use crate::client::ApiClient;
use crate::error::{ClientError, ClientResult};
use crate::models::ScaleType;
use crate::transport::Transport;

/// Label marking control-plane nodes, which never belong to a scaling group.
pub const MASTER_ROLE_LABEL: &str = "node-role.kubernetes.io/master";

#[async_trait]
impl GroupLister for ApiClient {
    async fn list_members(&self, group_id: &str) -> anyhow::Result<Vec<Instance>> {
        let group = self
            .describe_scaling_group(group_id)
            .await
            .with_context(|| format!("describing scaling group {group_id}"))?;
        Ok(group.members())
    }
}

/// The parts of a cluster node needed to find its group.
#[derive(Debug, Clone, Default)]
pub struct NodeRef {
    pub name: String,
    pub provider_id: String,
    pub labels: BTreeMap<String, String>,
}

impl NodeRef {
    pub fn new(name: impl Into<String>, provider_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            provider_id: provider_id.into(),
            labels: BTreeMap::new(),
        }
    }

    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    pub fn is_master(&self) -> bool {
        self.labels.contains_key(MASTER_ROLE_LABEL)
    }

    /// Provider id, or the node name while the provider id is unset.
    pub fn instance_id(&self) -> &str {
        if self.provider_id.is_empty() {
            &self.name
        } else {
            &self.provider_id
        }
    }
}

pub struct GroupManager {
    client: Arc<ApiClient>,
    cache: Arc<ResolutionCache>,
}

impl fmt::Debug for GroupManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroupManager")
            .field("client", &self.client)
            .finish_non_exhaustive()
    }
}

impl GroupManager {
    pub fn new(client: Arc<ApiClient>) -> Self {
        let lister: Arc<dyn GroupLister> = client.clone();
        Self {
            client,
            cache: Arc::new(ResolutionCache::new(lister)),
        }
    }

    /// Build the client from `config`, discover groups, and register every
    /// configured node-group spec.
    pub async fn from_config(
        config: &CloudConfig,
        transport: Arc<dyn Transport>,
    ) -> ClientResult<Self> {
        let client = ApiClient::from_config(config, transport)?;
        let manager = Self::new(Arc::new(client));
        let specs = config.node_group_specs()?;
        manager.register_specs(&specs).await?;
        Ok(manager)
    }

    pub fn client(&self) -> &Arc<ApiClient> {
        &self.client
    }

    pub fn cache(&self) -> &Arc<ResolutionCache> {
        &self.cache
    }

    /// Groups the upstream reports that can be managed.
    pub async fn list_scaling_groups(&self) -> ClientResult<Vec<Group>> {
        let listed = self.client.list_scaling_groups().await?;
        let mut groups = Vec::with_capacity(listed.items.len());
        for item in &listed.items {
            match item.to_group() {
                Some(group) => groups.push(group),
                None => {
                    info!(group = %item.id, name = %item.name, "skipping scaling group without scaling configuration");
                }
            }
        }
        Ok(groups)
    }

    /// Resolve each spec against the discovered groups and register it.
    pub async fn register_specs(&self, specs: &[NodeGroupSpec]) -> ClientResult<Vec<Arc<Group>>> {
        if specs.is_empty() {
            return Ok(Vec::new());
        }
        let discovered = self.list_scaling_groups().await?;
        let mut registered = Vec::with_capacity(specs.len());
        for spec in specs {
            let group = spec.resolve(&discovered)?;
            registered.push(self.cache.register(group).await);
        }
        Ok(registered)
    }

    pub async fn group_for_instance(&self, instance_id: &str) -> ClientResult<Option<Arc<Group>>> {
        Ok(self.cache.find_group(instance_id).await?)
    }

    /// Group owning `node`; control-plane nodes have none.
    pub async fn group_for_node(&self, node: &NodeRef) -> ClientResult<Option<Arc<Group>>> {
        if node.is_master() {
            return Ok(None);
        }
        self.group_for_instance(node.instance_id()).await
    }

    /// Current members of a group.
    pub async fn instances(&self, group_id: &str) -> ClientResult<Vec<Instance>> {
        Ok(self.client.describe_scaling_group(group_id).await?.members())
    }

    /// Member count, not counting instances on their way out.
    pub async fn desired_size(&self, group_id: &str) -> ClientResult<u32> {
        let instances = self.instances(group_id).await?;
        let size = instances
            .iter()
            .filter(|i| i.state != InstanceState::Deleting)
            .count();
        Ok(size as u32)
    }

    /// Add `delta` instances to a managed group.
    pub async fn increase_size(&self, group_id: &str, delta: i64) -> ClientResult<()> {
        if delta <= 0 {
            return Err(ClientError::InvalidArgument(
                "size increase must be positive".to_string(),
            ));
        }
        let group = self.managed_group(group_id).await?;
        let size = self.desired_size(group_id).await?;
        let target = i64::from(size) + delta;
        if target > i64::from(group.max_size()) {
            return Err(ClientError::Bounds(format!(
                "size increase too large, desired: {target} max: {}",
                group.max_size()
            )));
        }
        let delta = u32::try_from(delta)
            .map_err(|_| ClientError::InvalidArgument(format!("delta {delta} out of range")))?;

        self.client
            .create_instances(
                group.id(),
                delta,
                ScaleType::Auto,
                group.rule_name().unwrap_or_default(),
            )
            .await?;
        Ok(())
    }

    /// Remove specific instances from a managed group.
    ///
    /// Every instance must belong to the group, and the group must stay at
    /// or above its minimum size.
    pub async fn delete_instances(&self, group_id: &str, instance_ids: &[String]) -> ClientResult<()> {
        if instance_ids.is_empty() {
            return Ok(());
        }
        let group = self.managed_group(group_id).await?;
        let size = self.desired_size(group_id).await?;
        let remaining = i64::from(size) - instance_ids.len() as i64;
        if remaining < i64::from(group.min_size()) {
            return Err(ClientError::Bounds(format!(
                "min size reached, {} nodes will not be deleted from group {}",
                instance_ids.len(),
                group.id()
            )));
        }

        for id in instance_ids {
            match self.cache.find_group(id).await? {
                Some(owner) if owner.id() == group.id() => {}
                _ => {
                    warn!(group = %group.id(), instance = %id, "refusing to delete instance outside group");
                    return Err(ClientError::InvalidArgument(format!(
                        "{id} does not belong to group {}",
                        group.id()
                    )));
                }
            }
        }

        self.client
            .delete_instances(
                group.id(),
                instance_ids,
                ScaleType::Auto,
                group.rule_name().unwrap_or_default(),
            )
            .await?;
        Ok(())
    }

    /// Start the background resync loop.
    pub fn start_refresh(&self, interval: Duration, shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        self.cache.spawn_refresh(interval, shutdown)
    }

    async fn managed_group(&self, group_id: &str) -> ClientResult<Arc<Group>> {
        self.cache
            .group_by_id(group_id)
            .await
            .ok_or_else(|| ClientError::InvalidArgument(format!("group {group_id} is not managed")))
    }
}
