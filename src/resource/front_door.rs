use serde::{Deserialize, Serialize};

use super::{AzureResource, Sku, TrackedResource};

/// `Microsoft.Cdn/profiles` (Standard/Premium Front Door).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrontDoorProfile {
    #[serde(flatten)]
    pub tracked: TrackedResource,
    #[serde(default)]
    pub sku: Option<Sku>,
}

impl AzureResource for FrontDoorProfile {
    const ARM_TYPE: &'static str = "Microsoft.Cdn/profiles";

    fn tracked(&self) -> &TrackedResource {
        &self.tracked
    }
}
