//! asg-core: shared data model for scaling-group resolution.
//!
//! Holds the types every other crate in the workspace passes around:
//! [`Group`] (an upstream scaling group, optionally narrowed to one scaling
//! rule), [`Instance`] (a member fetched from upstream), node-group spec
//! parsing, and the TOML cloud configuration.
//!
//! # Node-group specs
//!
//! ```text
//! min:max:name          name = "group" | "rule---group"
//! 1:10:workers          → group "workers", no rule
//! 0:5:burst---workers   → group "workers", rule "burst"
//! ```

pub mod config;
pub mod duration;
pub mod error;
pub mod spec;
pub mod types;

pub use config::{CacheConfig, CloudConfig, GlobalConfig};
pub use duration::parse_duration;
pub use error::{CoreError, CoreResult};
pub use spec::{GroupRule, NodeGroupSpec};
pub use types::*;
