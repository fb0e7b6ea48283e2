use serde::{Deserialize, Serialize};

use crate::resource::ServiceKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn from_str_lenient(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" | "med" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

/// Reference metadata for a rule. Never affects evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleMetadata {
    /// Stable reporting id (e.g., "aks-007").
    pub id: String,
    pub category: String,
    pub subcategory: String,
    pub description: String,
    pub severity: Severity,
    pub url: Option<String>,
}

/// Outcome of a rule that does not shape the summary row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleViolation {
    pub rule_id: String,
    pub category: String,
    pub subcategory: String,
    pub severity: Severity,
    pub description: String,
    pub service: ServiceKind,
    pub resource_id: String,
    pub resource_name: String,
    /// Whether the resource fails the check. Passing outcomes only appear
    /// when the report is configured to include them.
    pub broken: bool,
    pub value: String,
    pub url: Option<String>,
}

impl RuleViolation {
    pub fn new(
        metadata: &RuleMetadata,
        service: ServiceKind,
        resource_id: &str,
        resource_name: &str,
        broken: bool,
        value: String,
    ) -> Self {
        Self {
            rule_id: metadata.id.clone(),
            category: metadata.category.clone(),
            subcategory: metadata.subcategory.clone(),
            severity: metadata.severity,
            description: metadata.description.clone(),
            service,
            resource_id: resource_id.to_string(),
            resource_name: resource_name.to_string(),
            broken,
            value,
            url: metadata.url.clone(),
        }
    }
}
