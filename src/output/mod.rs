pub mod console;
pub mod json;
pub mod sarif;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::ScanReport;

/// Output format selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Console,
    Json,
    Sarif,
}

impl OutputFormat {
    pub fn from_str_lenient(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "console" | "text" | "table" => Some(Self::Console),
            "json" => Some(Self::Json),
            "sarif" => Some(Self::Sarif),
            _ => None,
        }
    }
}

/// Render a report into the specified format.
pub fn render(report: &ScanReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Console => Ok(console::render(report)),
        OutputFormat::Json => json::render(report),
        OutputFormat::Sarif => sarif::render(report),
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{TimeZone, Utc};

    use crate::analyzer::AzureServiceResult;
    use crate::resource::ServiceKind;
    use crate::rules::policy::Policy;
    use crate::rules::{RuleMetadata, RuleViolation, Severity};
    use crate::ScanReport;

    const SITES: &str = "/subscriptions/sub-1/resourceGroups/rg-prod/providers/Microsoft.Web/sites";
    const HTTPS_URL: &str =
        "https://learn.microsoft.com/azure/app-service/configure-ssl-bindings#enforce-https";

    pub fn row(name: &str, diagnostics: Option<bool>) -> AzureServiceResult {
        AzureServiceResult {
            subscription_id: "sub-1".into(),
            resource_group: "rg-prod".into(),
            service_name: name.into(),
            resource_type: "Microsoft.Web/sites".into(),
            resource_id: format!("{SITES}/{name}"),
            sku: "None".into(),
            sla: "None".into(),
            availability_zones: false,
            private_endpoints: true,
            diagnostic_settings: diagnostics,
            caf_naming: true,
        }
    }

    pub fn violation(rule_id: &str, severity: Severity, resource: &str) -> RuleViolation {
        let meta = RuleMetadata {
            id: rule_id.into(),
            category: "Security".into(),
            subcategory: "Network Security".into(),
            description: "Function should use HTTPS only".into(),
            severity,
            url: Some(HTTPS_URL.into()),
        };
        RuleViolation::new(
            &meta,
            ServiceKind::FunctionApp,
            &format!("{SITES}/{resource}"),
            resource,
            true,
            String::new(),
        )
    }

    pub fn report(rows: Vec<AzureServiceResult>, violations: Vec<RuleViolation>) -> ScanReport {
        let verdict = Policy::default().evaluate(&violations);
        ScanReport {
            subscription_id: "sub-1".into(),
            resource_groups: vec!["rg-prod".into()],
            services: vec![ServiceKind::FunctionApp],
            rows,
            violations,
            verdict,
            generated_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        }
    }
}
