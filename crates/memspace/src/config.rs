use crate::{Error, Result};

use serde::{Deserialize, Serialize};

/// Settings a [`Workspace`](crate::Workspace) is built with.
///
/// Every field has a default, so a configuration file only needs to name
/// what it changes:
///
/// ```
/// # use memspace::{CollisionPolicy, WorkspaceConfig};
/// let config = WorkspaceConfig::from_json(r#"{ "collision_policy": "suffix" }"#).unwrap();
/// assert_eq!(config.name_prefix, "mem_");
/// assert_eq!(config.collision_policy, CollisionPolicy::Suffix);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorkspaceConfig {
    /// Name of the engine workspace datasets are copied into.
    pub path: String,

    /// Prepended to the base name of every loaded dataset.
    pub name_prefix: String,

    /// What happens when a derived name is already registered.
    pub collision_policy: CollisionPolicy,
}

/// Outcome of registering a name that is already taken.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionPolicy {
    /// Fail with a name collision error.
    #[default]
    Reject,

    /// Append `_1`, `_2`, ... and take the first free name.
    Suffix,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            path: "in_memory".to_string(),
            name_prefix: "mem_".to_string(),
            collision_policy: CollisionPolicy::Reject,
        }
    }
}

impl WorkspaceConfig {
    /// Parses a configuration from JSON.
    pub fn from_json(src: &str) -> Result<WorkspaceConfig> {
        serde_json::from_str(src).map_err(|err| {
            Error::from(anyhow::Error::from(err))
                .context(Error::invalid_argument("invalid workspace configuration"))
        })
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|err| Error::from(anyhow::Error::from(err)))
    }
}
