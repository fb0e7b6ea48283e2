use serde::{Deserialize, Serialize};

use super::{AzureResource, Sku, TrackedResource};

/// `Microsoft.Web/serverfarms`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppServicePlan {
    #[serde(flatten)]
    pub tracked: TrackedResource,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub sku: Option<Sku>,
    #[serde(default)]
    pub properties: Option<PlanProperties>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanProperties {
    #[serde(default)]
    pub zone_redundant: Option<bool>,
}

impl AzureResource for AppServicePlan {
    const ARM_TYPE: &'static str = "Microsoft.Web/serverfarms";

    fn tracked(&self) -> &TrackedResource {
        &self.tracked
    }
}

impl AppServicePlan {
    pub fn sku_tier(&self) -> Option<&str> {
        self.sku.as_ref().and_then(|s| s.tier.as_deref())
    }

    pub fn zone_redundant(&self) -> bool {
        self.properties
            .as_ref()
            .and_then(|p| p.zone_redundant)
            .unwrap_or(false)
    }
}

/// `Microsoft.Web/sites`. Web apps and function apps share this type and
/// are told apart by `kind`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Site {
    #[serde(flatten)]
    pub tracked: TrackedResource,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub properties: Option<SiteProperties>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteProperties {
    #[serde(default)]
    pub https_only: Option<bool>,
    #[serde(default)]
    pub server_farm_id: Option<String>,
}

impl AzureResource for Site {
    const ARM_TYPE: &'static str = "Microsoft.Web/sites";

    fn tracked(&self) -> &TrackedResource {
        &self.tracked
    }
}

impl Site {
    pub fn is_function_app(&self) -> bool {
        self.kind
            .as_deref()
            .is_some_and(|kind| kind.to_lowercase().contains("functionapp"))
    }

    pub fn is_web_app(&self) -> bool {
        !self.is_function_app()
    }

    pub fn https_only(&self) -> bool {
        self.properties
            .as_ref()
            .and_then(|p| p.https_only)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site(kind: Option<&str>) -> Site {
        Site {
            kind: kind.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn function_apps_are_split_by_kind() {
        assert!(site(Some("functionapp,linux")).is_function_app());
        assert!(site(Some("FunctionApp")).is_function_app());
        assert!(site(Some("app,linux")).is_web_app());
        assert!(site(None).is_web_app());
    }

    #[test]
    fn plan_reads_zone_redundancy() {
        let plan: AppServicePlan = serde_json::from_str(
            r#"{"id":"p","name":"asp-1","type":"Microsoft.Web/serverfarms",
                "sku":{"name":"P1v3","tier":"PremiumV3"},
                "properties":{"zoneRedundant":true}}"#,
        )
        .unwrap();
        assert!(plan.zone_redundant());
        assert_eq!(plan.sku_tier(), Some("PremiumV3"));
    }
}
