//! Resolution cache: instance id → owning group.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use asg_core::config::DEFAULT_REFRESH_INTERVAL;
use asg_core::{Group, InstanceId};

use crate::error::{ResolveError, ResolveResult};
use crate::lister::GroupLister;
use crate::registry::GroupRegistry;

/// Counters accumulated over the cache's lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from the forward index.
    pub hits: u64,
    /// Lookups answered from the negative set.
    pub negative_hits: u64,
    /// Lookups that needed a resync.
    pub misses: u64,
    /// Completed resyncs (on-demand and scheduled).
    pub resyncs: u64,
    /// Resyncs aborted by a lister failure.
    pub failed_resyncs: u64,
}

/// Outcome of one successful resync.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResyncStats {
    pub groups: usize,
    pub instances: usize,
}

/// Everything the lock protects.
struct CacheState {
    registry: GroupRegistry,
    /// Authoritative forward index, replaced wholesale on every resync.
    by_instance: HashMap<InstanceId, Arc<Group>>,
    /// Instances seen to belong to no group. Disjoint from `by_instance`.
    known_absent: HashSet<InstanceId>,
    stats: CacheStats,
}

/// Process-wide instance → group resolver.
pub struct ResolutionCache {
    state: Mutex<CacheState>,
    lister: Arc<dyn GroupLister>,
}

impl ResolutionCache {
    /// Create an empty cache with no registered groups.
    pub fn new(lister: Arc<dyn GroupLister>) -> Self {
        Self::with_registry(lister, GroupRegistry::new())
    }

    /// Create a cache that starts out managing `registry`.
    ///
    /// The forward index stays empty until the first resync.
    pub fn with_registry(lister: Arc<dyn GroupLister>, registry: GroupRegistry) -> Self {
        Self {
            state: Mutex::new(CacheState {
                registry,
                by_instance: HashMap::new(),
                known_absent: HashSet::new(),
                stats: CacheStats::default(),
            }),
            lister,
        }
    }

    /// Add a group to the managed set.
    ///
    /// The group has no members until the next resync runs. Instances
    /// already in the negative set stay there until then.
    pub async fn register(&self, group: Group) -> Arc<Group> {
        let mut state = self.state.lock().await;
        let group = state.registry.register(group);
        info!(group = %group, "registered scaling group");
        group
    }

    /// Resolve the group owning `instance_id`.
    ///
    /// `Ok(None)` means the instance belongs to no managed group; that
    /// answer is memoized until a later resync claims the instance.
    pub async fn find_group(&self, instance_id: &str) -> ResolveResult<Option<Arc<Group>>> {
        let mut state = self.state.lock().await;

        if let Some(group) = state.by_instance.get(instance_id).cloned() {
            state.stats.hits += 1;
            return Ok(Some(group));
        }
        if state.known_absent.contains(instance_id) {
            state.stats.negative_hits += 1;
            debug!(instance = %instance_id, "instance known to be outside managed groups");
            return Ok(None);
        }

        state.stats.misses += 1;
        debug!(instance = %instance_id, "cache miss, resyncing");
        self.resync_locked(&mut state).await?;

        if let Some(group) = state.by_instance.get(instance_id).cloned() {
            return Ok(Some(group));
        }

        state.known_absent.insert(instance_id.to_string());
        debug!(instance = %instance_id, "instance does not belong to any managed group");
        Ok(None)
    }

    /// Rebuild the forward index from the lister now.
    pub async fn resync(&self) -> ResolveResult<ResyncStats> {
        let mut state = self.state.lock().await;
        self.resync_locked(&mut state).await
    }

    /// Snapshot of the managed groups.
    pub async fn groups(&self) -> Vec<Arc<Group>> {
        self.state.lock().await.registry.groups().to_vec()
    }

    /// Look up a managed group by its upstream id.
    pub async fn group_by_id(&self, group_id: &str) -> Option<Arc<Group>> {
        self.state.lock().await.registry.find_by_id(group_id).cloned()
    }

    /// Whether `instance_id` is currently memoized as belonging to no group.
    pub async fn is_known_absent(&self, instance_id: &str) -> bool {
        self.state.lock().await.known_absent.contains(instance_id)
    }

    pub async fn stats(&self) -> CacheStats {
        self.state.lock().await.stats
    }

    /// Build a fresh index and publish it only if every lister call succeeded.
    async fn resync_locked(&self, state: &mut CacheState) -> ResolveResult<ResyncStats> {
        let rebuilt = build_index(state.registry.groups(), self.lister.as_ref()).await;
        match rebuilt {
            Ok(index) => {
                state.known_absent.retain(|id| !index.contains_key(id));
                let stats = ResyncStats {
                    groups: state.registry.len(),
                    instances: index.len(),
                };
                state.by_instance = index;
                state.stats.resyncs += 1;
                info!(
                    groups = stats.groups,
                    instances = stats.instances,
                    known_absent = state.known_absent.len(),
                    "group cache resynced"
                );
                Ok(stats)
            }
            Err(e) => {
                state.stats.failed_resyncs += 1;
                Err(e)
            }
        }
    }

    /// Resync every `interval` until `shutdown` flips.
    ///
    /// The first resync runs immediately. A failed resync is logged and the
    /// loop carries on with the next tick. A zero `interval` is replaced by
    /// [`DEFAULT_REFRESH_INTERVAL`].
    pub async fn run_refresh(&self, interval: Duration, mut shutdown: watch::Receiver<bool>) {
        let interval = if interval.is_zero() {
            warn!("zero refresh interval, using default");
            DEFAULT_REFRESH_INTERVAL
        } else {
            interval
        };
        info!(interval_secs = interval.as_secs(), "group cache refresh started");

        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.resync().await {
                        error!(error = %e, "failed to regenerate group cache");
                    }
                }
                _ = shutdown.changed() => {
                    info!("group cache refresh shutting down");
                    break;
                }
            }
        }
    }

    /// Spawn [`run_refresh`](Self::run_refresh) on the current runtime.
    pub fn spawn_refresh(
        self: &Arc<Self>,
        interval: Duration,
        shutdown: watch::Receiver<bool>,
    ) -> JoinHandle<()> {
        let cache = Arc::clone(self);
        tokio::spawn(async move {
            cache.run_refresh(interval, shutdown).await;
        })
    }
}

/// Ask the lister for every group's members. Later groups win when an
/// instance is reported twice.
async fn build_index(
    groups: &[Arc<Group>],
    lister: &dyn GroupLister,
) -> ResolveResult<HashMap<InstanceId, Arc<Group>>> {
    let mut index = HashMap::new();
    for group in groups {
        let members = lister
            .list_members(group.id())
            .await
            .map_err(|source| ResolveError::Lister {
                group_id: group.id().to_string(),
                source,
            })?;
        for member in members {
            index.insert(member.id, Arc::clone(group));
        }
    }
    Ok(index)
}
