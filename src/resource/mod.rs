//! Typed ARM resource models.
//!
//! Every model deserializes from the JSON that the ARM list APIs return, and
//! exposes its tracked-resource envelope through [`AzureResource`]. Rule sets
//! are generic over these types, so a rule can only ever be evaluated
//! against the resource shape it was written for.

pub mod aks;
pub mod appservice;
pub mod container_apps;
pub mod eventhub;
pub mod front_door;
pub mod signalr;

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

pub use aks::ManagedCluster;
pub use appservice::{AppServicePlan, Site};
pub use container_apps::ManagedEnvironment;
pub use eventhub::EventHubNamespace;
pub use front_door::FrontDoorProfile;
pub use signalr::SignalR;

/// Fields shared by every tracked ARM resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedResource {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub resource_type: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub tags: Option<HashMap<String, String>>,
}

/// A resource model the scanner can list and evaluate.
pub trait AzureResource: DeserializeOwned + Send + Sync + 'static {
    /// ARM resource type used to select items from a list response.
    const ARM_TYPE: &'static str;

    fn tracked(&self) -> &TrackedResource;

    fn id(&self) -> &str {
        &self.tracked().id
    }

    fn name(&self) -> &str {
        &self.tracked().name
    }

    fn resource_type(&self) -> &str {
        &self.tracked().resource_type
    }

    fn tags(&self) -> Option<&HashMap<String, String>> {
        self.tracked().tags.as_ref()
    }
}

/// SKU block as returned by most resource providers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sku {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub tier: Option<String>,
}

/// SKU name, or "None" when the provider omitted it.
pub fn sku_name(sku: Option<&Sku>) -> &str {
    sku.and_then(|s| s.name.as_deref()).unwrap_or("None")
}

/// A private endpoint connection embedded in a resource's properties.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivateEndpointConnection {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// The resource types the scanner knows how to review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ServiceKind {
    #[serde(rename = "aks")]
    Aks,
    #[serde(rename = "plan")]
    AppServicePlan,
    #[serde(rename = "app")]
    WebApp,
    #[serde(rename = "func")]
    FunctionApp,
    #[serde(rename = "evh")]
    EventHub,
    #[serde(rename = "sigr")]
    SignalR,
    #[serde(rename = "cae")]
    ContainerApps,
    #[serde(rename = "afd")]
    FrontDoor,
}

impl ServiceKind {
    pub const ALL: [ServiceKind; 8] = [
        Self::Aks,
        Self::AppServicePlan,
        Self::WebApp,
        Self::FunctionApp,
        Self::EventHub,
        Self::SignalR,
        Self::ContainerApps,
        Self::FrontDoor,
    ];

    /// Short name used on the command line and in rule ids.
    pub fn abbreviation(&self) -> &'static str {
        match self {
            Self::Aks => "aks",
            Self::AppServicePlan => "plan",
            Self::WebApp => "app",
            Self::FunctionApp => "func",
            Self::EventHub => "evh",
            Self::SignalR => "sigr",
            Self::ContainerApps => "cae",
            Self::FrontDoor => "afd",
        }
    }

    /// Cloud Adoption Framework name prefix.
    pub fn caf_prefix(&self) -> &'static str {
        match self {
            Self::AppServicePlan => "asp",
            other => other.abbreviation(),
        }
    }

    pub fn from_str_lenient(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "aks" => Some(Self::Aks),
            "plan" | "asp" => Some(Self::AppServicePlan),
            "app" | "webapp" => Some(Self::WebApp),
            "func" | "function" | "functionapp" => Some(Self::FunctionApp),
            "evh" | "eventhub" => Some(Self::EventHub),
            "sigr" | "signalr" => Some(Self::SignalR),
            "cae" | "containerapps" => Some(Self::ContainerApps),
            "afd" | "frontdoor" => Some(Self::FrontDoor),
            _ => None,
        }
    }
}

impl std::fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Aks => write!(f, "AKS Cluster"),
            Self::AppServicePlan => write!(f, "App Service Plan"),
            Self::WebApp => write!(f, "App Service"),
            Self::FunctionApp => write!(f, "Function App"),
            Self::EventHub => write!(f, "Event Hub Namespace"),
            Self::SignalR => write!(f, "SignalR"),
            Self::ContainerApps => write!(f, "Container Apps Environment"),
            Self::FrontDoor => write!(f, "Front Door"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_prefix_differs_from_abbreviation() {
        assert_eq!(ServiceKind::AppServicePlan.abbreviation(), "plan");
        assert_eq!(ServiceKind::AppServicePlan.caf_prefix(), "asp");
        assert_eq!(ServiceKind::Aks.caf_prefix(), "aks");
    }

    #[test]
    fn lenient_parse_accepts_abbreviations() {
        let parse = ServiceKind::from_str_lenient;
        for kind in ServiceKind::ALL {
            assert_eq!(parse(kind.abbreviation()), Some(kind));
        }
        assert_eq!(parse("SignalR"), Some(ServiceKind::SignalR));
        assert_eq!(parse("storage"), None);
    }

    #[test]
    fn missing_sku_name_reads_none() {
        assert_eq!(sku_name(None), "None");
        let sku = Sku {
            name: Some("Premium".into()),
            tier: None,
        };
        assert_eq!(sku_name(Some(&sku)), "Premium");
    }
}
