use serde::{Deserialize, Serialize};

use crate::resource::AzureResource;
use crate::rules::{Outcome, RuleViolation, StructuralKey};

/// One summary row per reviewed resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AzureServiceResult {
    pub subscription_id: String,
    pub resource_group: String,
    /// Resource name.
    pub service_name: String,
    pub resource_type: String,
    pub resource_id: String,
    pub sku: String,
    pub sla: String,
    pub availability_zones: bool,
    pub private_endpoints: bool,
    /// `None` when the lookup failed and the scan was told to carry on.
    pub diagnostic_settings: Option<bool>,
    pub caf_naming: bool,
}

impl AzureServiceResult {
    pub fn new<R: AzureResource>(
        subscription_id: &str,
        resource_group: &str,
        resource: &R,
    ) -> Self {
        Self {
            subscription_id: subscription_id.to_string(),
            resource_group: resource_group.to_string(),
            service_name: resource.name().to_string(),
            resource_type: resource.resource_type().to_string(),
            resource_id: resource.id().to_string(),
            sku: "None".into(),
            sla: "None".into(),
            availability_zones: false,
            private_endpoints: false,
            diagnostic_settings: Some(false),
            caf_naming: false,
        }
    }

    /// Copy a structural rule's outcome into the matching field.
    pub fn fold(&mut self, key: StructuralKey, outcome: &Outcome) {
        match key {
            StructuralKey::DiagnosticSettings => self.diagnostic_settings = Some(!outcome.broken),
            StructuralKey::AvailabilityZones => self.availability_zones = !outcome.broken,
            StructuralKey::Sla => self.sla = outcome.value.clone(),
            StructuralKey::Private => self.private_endpoints = !outcome.broken,
            StructuralKey::Sku => self.sku = outcome.value.clone(),
            StructuralKey::Caf => self.caf_naming = !outcome.broken,
        }
    }
}

/// Everything one analyzer produced for one resource group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceReview {
    pub rows: Vec<AzureServiceResult>,
    pub violations: Vec<RuleViolation>,
}

impl ServiceReview {
    pub fn extend(&mut self, other: ServiceReview) {
        self.rows.extend(other.rows);
        self.violations.extend(other.violations);
    }
}
