use serde::{Deserialize, Serialize};

use super::{AzureResource, PrivateEndpointConnection, Sku, TrackedResource};

/// `Microsoft.SignalRService/signalR`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalR {
    #[serde(flatten)]
    pub tracked: TrackedResource,
    #[serde(default)]
    pub sku: Option<Sku>,
    #[serde(default)]
    pub properties: Option<SignalRProperties>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalRProperties {
    #[serde(default)]
    pub private_endpoint_connections: Option<Vec<PrivateEndpointConnection>>,
}

impl AzureResource for SignalR {
    const ARM_TYPE: &'static str = "Microsoft.SignalRService/signalR";

    fn tracked(&self) -> &TrackedResource {
        &self.tracked
    }
}

impl SignalR {
    pub fn has_private_endpoints(&self) -> bool {
        self.properties
            .as_ref()
            .and_then(|p| p.private_endpoint_connections.as_ref())
            .is_some_and(|c| !c.is_empty())
    }
}
