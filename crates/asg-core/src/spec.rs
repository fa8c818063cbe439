//! Node-group spec strings.
//!
//! Operators name the groups to manage as `min:max:name`. The name part
//! either names an upstream group directly or pins one of its scaling
//! rules with `rule---group`.

use std::str::FromStr;

use crate::error::{CoreError, CoreResult};
use crate::types::Group;

/// Separator between rule name and group name.
pub const RULE_SEPARATOR: &str = "---";

/// A group name with an optional rule selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupRule {
    pub rule_name: Option<String>,
    pub group_name: String,
}

impl GroupRule {
    pub fn parse(value: &str) -> CoreResult<Self> {
        if !value.contains(RULE_SEPARATOR) {
            // Plain group names predate rule selectors.
            return Ok(Self {
                rule_name: None,
                group_name: value.to_string(),
            });
        }

        let tokens: Vec<&str> = value.split(RULE_SEPARATOR).collect();
        if tokens.len() != 2 {
            return Err(CoreError::InvalidSpec(format!(
                "wrong group configuration: {value}"
            )));
        }

        Ok(Self {
            rule_name: Some(tokens[0].to_string()).filter(|r| !r.is_empty()),
            group_name: tokens[1].to_string(),
        })
    }
}

/// A parsed `min:max:name` node-group spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeGroupSpec {
    pub min_size: u32,
    pub max_size: u32,
    pub name: String,
}

impl NodeGroupSpec {
    /// Split the name part into rule and group.
    pub fn group_rule(&self) -> CoreResult<GroupRule> {
        GroupRule::parse(&self.name)
    }

    /// Match this spec against discovered groups by group name.
    ///
    /// Id and bounds come from the upstream group; the rule name comes from
    /// the spec.
    pub fn resolve(&self, discovered: &[Group]) -> CoreResult<Group> {
        let rule = self.group_rule()?;
        discovered
            .iter()
            .find(|g| g.name() == rule.group_name)
            .map(|g| {
                Group::new(g.id(), g.name(), g.min_size(), g.max_size())
                    .with_rule(rule.rule_name.clone().unwrap_or_default())
            })
            .ok_or_else(|| {
                CoreError::InvalidSpec(format!("no auto scaling group found, spec: {}", self.name))
            })
    }
}

impl FromStr for NodeGroupSpec {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        let mut parts = s.splitn(3, ':');
        let (Some(min), Some(max), Some(name)) = (parts.next(), parts.next(), parts.next()) else {
            return Err(CoreError::InvalidSpec(format!(
                "expected min:max:name, got {s:?}"
            )));
        };

        let min_size = min
            .parse::<u32>()
            .map_err(|e| CoreError::InvalidSpec(format!("bad min size {min:?}: {e}")))?;
        let max_size = max
            .parse::<u32>()
            .map_err(|e| CoreError::InvalidSpec(format!("bad max size {max:?}: {e}")))?;
        if min_size > max_size {
            return Err(CoreError::InvalidSpec(format!(
                "min size {min_size} is greater than max size {max_size}"
            )));
        }
        if name.is_empty() {
            return Err(CoreError::InvalidSpec("empty group name".to_string()));
        }

        Ok(Self {
            min_size,
            max_size,
            name: name.to_string(),
        })
    }
}
