use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{AzureResource, TrackedResource};

/// `Microsoft.ContainerService/managedClusters`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ManagedCluster {
    #[serde(flatten)]
    pub tracked: TrackedResource,
    #[serde(default)]
    pub sku: Option<ManagedClusterSku>,
    #[serde(default)]
    pub properties: Option<ManagedClusterProperties>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagedClusterSku {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub tier: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagedClusterProperties {
    #[serde(default)]
    pub agent_pool_profiles: Option<Vec<AgentPoolProfile>>,
    #[serde(default)]
    pub api_server_access_profile: Option<ApiServerAccessProfile>,
    #[serde(default)]
    pub aad_profile: Option<serde_json::Value>,
    #[serde(default, rename = "enableRBAC")]
    pub enable_rbac: Option<bool>,
    #[serde(default)]
    pub disable_local_accounts: Option<bool>,
    #[serde(default)]
    pub addon_profiles: Option<HashMap<String, AddonProfile>>,
    #[serde(default)]
    pub network_profile: Option<NetworkProfile>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentPoolProfile {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub availability_zones: Option<Vec<String>>,
    #[serde(default)]
    pub enable_auto_scaling: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiServerAccessProfile {
    #[serde(default)]
    pub enable_private_cluster: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddonProfile {
    #[serde(default)]
    pub enabled: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkProfile {
    #[serde(default)]
    pub network_plugin: Option<String>,
    #[serde(default)]
    pub outbound_type: Option<String>,
}

impl AzureResource for ManagedCluster {
    const ARM_TYPE: &'static str = "Microsoft.ContainerService/managedClusters";

    fn tracked(&self) -> &TrackedResource {
        &self.tracked
    }
}

impl ManagedCluster {
    /// SKU tier. Clusters created without an explicit tier run on "Free".
    pub fn sku_tier(&self) -> &str {
        self.sku
            .as_ref()
            .and_then(|s| s.tier.as_deref())
            .unwrap_or("Free")
    }

    pub fn agent_pools(&self) -> &[AgentPoolProfile] {
        self.properties
            .as_ref()
            .and_then(|p| p.agent_pool_profiles.as_deref())
            .unwrap_or(&[])
    }

    /// True only when there is at least one pool and every pool spans more
    /// than one availability zone.
    pub fn zone_redundant(&self) -> bool {
        let pools = self.agent_pools();
        !pools.is_empty()
            && pools.iter().all(|p| {
                p.availability_zones
                    .as_ref()
                    .is_some_and(|zones| zones.len() > 1)
            })
    }

    pub fn private_cluster(&self) -> bool {
        self.properties
            .as_ref()
            .and_then(|p| p.api_server_access_profile.as_ref())
            .and_then(|a| a.enable_private_cluster)
            .unwrap_or(false)
    }

    /// `None` when the addon is not configured at all, otherwise whether it
    /// is enabled (an entry without the flag counts as disabled).
    pub fn addon_enabled(&self, addon: &str) -> Option<bool> {
        self.properties
            .as_ref()
            .and_then(|p| p.addon_profiles.as_ref())
            .and_then(|addons| addons.get(addon))
            .map(|profile| profile.enabled.unwrap_or(false))
    }

    pub fn network_profile(&self) -> Option<&NetworkProfile> {
        self.properties
            .as_ref()
            .and_then(|p| p.network_profile.as_ref())
    }
}
