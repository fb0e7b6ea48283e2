use serde::{Deserialize, Serialize};

use super::{AzureResource, TrackedResource};

/// `Microsoft.App/managedEnvironments`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagedEnvironment {
    #[serde(flatten)]
    pub tracked: TrackedResource,
    #[serde(default)]
    pub properties: Option<ManagedEnvironmentProperties>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagedEnvironmentProperties {
    #[serde(default)]
    pub zone_redundant: Option<bool>,
    #[serde(default)]
    pub vnet_configuration: Option<VnetConfiguration>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VnetConfiguration {
    #[serde(default)]
    pub internal: Option<bool>,
}

impl AzureResource for ManagedEnvironment {
    const ARM_TYPE: &'static str = "Microsoft.App/managedEnvironments";

    fn tracked(&self) -> &TrackedResource {
        &self.tracked
    }
}

impl ManagedEnvironment {
    pub fn zone_redundant(&self) -> bool {
        self.properties
            .as_ref()
            .and_then(|p| p.zone_redundant)
            .unwrap_or(false)
    }

    /// Internal environments are only reachable through the VNet.
    pub fn internal(&self) -> bool {
        self.properties
            .as_ref()
            .and_then(|p| p.vnet_configuration.as_ref())
            .and_then(|v| v.internal)
            .unwrap_or(false)
    }
}
