//! The set of groups under management.

use std::sync::Arc;

use asg_core::Group;

/// Groups known to the cache, in registration order.
///
/// Filled at startup from configuration and grown by runtime registration.
/// Not synchronized on its own; the [`ResolutionCache`](crate::ResolutionCache)
/// owns it behind its lock.
#[derive(Debug, Default, Clone)]
pub struct GroupRegistry {
    groups: Vec<Arc<Group>>,
}

impl GroupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a group and return the shared handle the cache will hand out.
    pub fn register(&mut self, group: Group) -> Arc<Group> {
        let group = Arc::new(group);
        self.groups.push(group.clone());
        group
    }

    pub fn groups(&self) -> &[Arc<Group>] {
        &self.groups
    }

    pub fn find_by_id(&self, group_id: &str) -> Option<&Arc<Group>> {
        self.groups.iter().find(|g| g.id() == group_id)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl FromIterator<Group> for GroupRegistry {
    fn from_iter<I: IntoIterator<Item = Group>>(iter: I) -> Self {
        let mut registry = GroupRegistry::new();
        for group in iter {
            registry.register(group);
        }
        registry
    }
}
