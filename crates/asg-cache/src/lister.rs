//! Upstream membership source.

use async_trait::async_trait;

use asg_core::Instance;

/// Supplies the live membership of one scaling group.
///
/// Called once per registered group per resync. Timeouts, if any, are the
/// implementation's business; the cache waits as long as the call takes.
#[async_trait]
pub trait GroupLister: Send + Sync {
    async fn list_members(&self, group_id: &str) -> anyhow::Result<Vec<Instance>>;
}
