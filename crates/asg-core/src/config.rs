//! Cloud configuration file (TOML).

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::duration::parse_duration;
use crate::error::{CoreError, CoreResult};
use crate::spec::NodeGroupSpec;

/// Refresh interval used when the config does not set one.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(3600);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudConfig {
    pub global: GlobalConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub node_groups: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub access_key: String,
    #[serde(default)]
    pub secret_key: String,
    #[serde(default)]
    pub cluster_id: String,
    #[serde(default)]
    pub region_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Background resync interval (e.g. "1h").
    pub refresh_interval: Option<String>,
}

impl CloudConfig {
    pub fn from_file(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| CoreError::Io {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&content).map_err(|e| CoreError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Check that every required global field is present.
    pub fn validate(&self) -> CoreResult<()> {
        let g = &self.global;
        let required = [
            (&g.endpoint, "endpoint"),
            (&g.access_key, "access key"),
            (&g.secret_key, "secret key"),
            (&g.region_id, "region id"),
            (&g.cluster_id, "cluster id"),
        ];
        for (value, what) in required {
            if value.is_empty() {
                return Err(CoreError::Config(format!(
                    "{what} missing from cloud configuration"
                )));
            }
        }
        Ok(())
    }

    /// Parsed background refresh interval, falling back to one hour.
    ///
    /// Unparseable and zero intervals fall back too; the result is never zero.
    pub fn refresh_interval(&self) -> Duration {
        match self.cache.refresh_interval.as_deref() {
            None => DEFAULT_REFRESH_INTERVAL,
            Some(raw) => match parse_duration(raw) {
                Some(interval) if !interval.is_zero() => interval,
                Some(_) => {
                    warn!(value = %raw, "zero refresh interval, using default");
                    DEFAULT_REFRESH_INTERVAL
                }
                None => {
                    warn!(value = %raw, "unparseable refresh interval, using default");
                    DEFAULT_REFRESH_INTERVAL
                }
            },
        }
    }

    /// Parse every configured node-group spec.
    pub fn node_group_specs(&self) -> CoreResult<Vec<NodeGroupSpec>> {
        if self.node_groups.is_empty() {
            return Err(CoreError::Config("no auto scaling group specified".to_string()));
        }
        self.node_groups.iter().map(|s| s.parse()).collect()
    }
}
