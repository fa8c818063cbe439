//! Domain types: scaling groups and their member instances.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Opaque upstream identifier of a scaling group.
pub type GroupId = String;

/// Opaque upstream identifier of a compute instance (the provider id).
pub type InstanceId = String;

// ── Group ─────────────────────────────────────────────────────────

/// A scaling group under management.
///
/// Immutable once built. The rule name narrows the group to one of its
/// independently triggerable scaling rules; scaling calls carry it so the
/// upstream knows which rule fired.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    id: GroupId,
    name: String,
    rule_name: Option<String>,
    min_size: u32,
    max_size: u32,
}

impl Group {
    /// Create a group without a rule selector.
    pub fn new(id: impl Into<GroupId>, name: impl Into<String>, min_size: u32, max_size: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            rule_name: None,
            min_size,
            max_size,
        }
    }

    /// Return a copy of this group bound to the given scaling rule.
    ///
    /// An empty rule name means "no rule".
    pub fn with_rule(mut self, rule_name: impl Into<String>) -> Self {
        let rule = rule_name.into();
        self.rule_name = if rule.is_empty() { None } else { Some(rule) };
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rule_name(&self) -> Option<&str> {
        self.rule_name.as_deref()
    }

    pub fn min_size(&self) -> u32 {
        self.min_size
    }

    pub fn max_size(&self) -> u32 {
        self.max_size
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.rule_name {
            Some(rule) => write!(f, "{rule}---{} ({})", self.name, self.id),
            None => write!(f, "{} ({})", self.name, self.id),
        }
    }
}

// ── Instance ──────────────────────────────────────────────────────

/// Lifecycle state reported by the upstream for a group member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstanceState {
    Running,
    Creating,
    Pending,
    Deleting,
    Deleted,
    Failed,
    /// A status this build does not recognize. Still a member.
    #[serde(other)]
    Unknown,
}

/// Coarse phase an autoscaler cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstancePhase {
    Running,
    Creating,
    Deleting,
}

impl InstanceState {
    /// Map to the autoscaler phase. `Deleted`, `Failed` and `Unknown` have none.
    pub fn phase(self) -> Option<InstancePhase> {
        match self {
            InstanceState::Running => Some(InstancePhase::Running),
            InstanceState::Creating | InstanceState::Pending => Some(InstancePhase::Creating),
            InstanceState::Deleting => Some(InstancePhase::Deleting),
            InstanceState::Deleted | InstanceState::Failed | InstanceState::Unknown => None,
        }
    }

    /// Whether the instance is gone for good and no longer a group member.
    pub fn is_terminal(self) -> bool {
        matches!(self, InstanceState::Deleted | InstanceState::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            InstanceState::Running => "running",
            InstanceState::Creating => "creating",
            InstanceState::Pending => "pending",
            InstanceState::Deleting => "deleting",
            InstanceState::Deleted => "deleted",
            InstanceState::Failed => "failed",
            InstanceState::Unknown => "unknown",
        }
    }
}

impl FromStr for InstanceState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "running" => Ok(InstanceState::Running),
            "creating" => Ok(InstanceState::Creating),
            "pending" => Ok(InstanceState::Pending),
            "deleting" => Ok(InstanceState::Deleting),
            "deleted" => Ok(InstanceState::Deleted),
            "failed" => Ok(InstanceState::Failed),
            other => Err(format!("invalid instance state: {other}")),
        }
    }
}

impl fmt::Display for InstanceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A group member as observed during one resync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    pub id: InstanceId,
    pub state: InstanceState,
}

impl Instance {
    pub fn new(id: impl Into<InstanceId>, state: InstanceState) -> Self {
        Self {
            id: id.into(),
            state,
        }
    }

    pub fn running(id: impl Into<InstanceId>) -> Self {
        Self::new(id, InstanceState::Running)
    }
}
