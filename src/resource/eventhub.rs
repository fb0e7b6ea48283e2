use serde::{Deserialize, Serialize};

use super::{AzureResource, PrivateEndpointConnection, Sku, TrackedResource};

/// `Microsoft.EventHub/namespaces`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventHubNamespace {
    #[serde(flatten)]
    pub tracked: TrackedResource,
    #[serde(default)]
    pub sku: Option<Sku>,
    #[serde(default)]
    pub properties: Option<EventHubProperties>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventHubProperties {
    #[serde(default)]
    pub zone_redundant: Option<bool>,
    #[serde(default)]
    pub disable_local_auth: Option<bool>,
    #[serde(default)]
    pub private_endpoint_connections: Option<Vec<PrivateEndpointConnection>>,
}

impl AzureResource for EventHubNamespace {
    const ARM_TYPE: &'static str = "Microsoft.EventHub/namespaces";

    fn tracked(&self) -> &TrackedResource {
        &self.tracked
    }
}

impl EventHubNamespace {
    pub fn zone_redundant(&self) -> bool {
        self.properties
            .as_ref()
            .and_then(|p| p.zone_redundant)
            .unwrap_or(false)
    }

    pub fn disable_local_auth(&self) -> Option<bool> {
        self.properties.as_ref().and_then(|p| p.disable_local_auth)
    }

    pub fn has_private_endpoints(&self) -> bool {
        self.properties
            .as_ref()
            .and_then(|p| p.private_endpoint_connections.as_ref())
            .is_some_and(|c| !c.is_empty())
    }
}
