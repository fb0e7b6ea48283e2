use std::collections::BTreeMap;

use crate::error::Result;
use crate::rules::{RuleViolation, Severity};
use crate::ScanReport;

use serde_json::{json, Value};

/// Render broken rules as SARIF 2.1.0.
///
/// ARM resources have no file location, so each result points at its
/// resource id through a logical location.
pub fn render(report: &ScanReport) -> Result<String> {
    let broken: Vec<&RuleViolation> = report.violations.iter().filter(|v| v.broken).collect();

    let mut by_rule: BTreeMap<&str, &RuleViolation> = BTreeMap::new();
    for violation in &broken {
        let id = violation.rule_id.as_str();
        by_rule.entry(id).or_insert(*violation);
    }

    let rules: Vec<Value> = by_rule
        .values()
        .map(|v| {
            let mut rule = json!({
                "id": v.rule_id,
                "name": v.subcategory,
                "shortDescription": { "text": v.description },
                "defaultConfiguration": {
                    "level": severity_to_sarif_level(v.severity),
                },
                "properties": {
                    "tags": [v.category, v.service.abbreviation()],
                },
            });
            if let Some(url) = &v.url {
                rule["helpUri"] = json!(url);
            }
            rule
        })
        .collect();

    let results: Vec<Value> = broken
        .iter()
        .map(|v| {
            let mut result = json!({
                "ruleId": v.rule_id,
                "level": severity_to_sarif_level(v.severity),
                "message": { "text": format!("{}: {}", v.resource_name, v.description) },
                "locations": [{
                    "logicalLocations": [{
                        "name": v.resource_name,
                        "fullyQualifiedName": v.resource_id,
                        "kind": "resource",
                    }],
                }],
            });
            if !v.value.is_empty() {
                result["properties"] = json!({ "value": v.value });
            }
            result
        })
        .collect();

    let sarif = json!({
        "$schema": "https://docs.oasis-open.org/sarif/sarif/v2.1.0/errata01/os/schemas/sarif-schema-2.1.0.json",
        "version": "2.1.0",
        "runs": [{
            "tool": {
                "driver": {
                    "name": "azposture",
                    "version": env!("CARGO_PKG_VERSION"),
                    "semanticVersion": env!("CARGO_PKG_VERSION"),
                    "rules": rules,
                },
            },
            "results": results,
            "automationDetails": {
                "id": format!("azposture/{}", report.subscription_id),
            },
        }],
    });

    let output = serde_json::to_string_pretty(&sarif)?;
    Ok(output)
}

fn severity_to_sarif_level(severity: Severity) -> &'static str {
    match severity {
        Severity::High => "error",
        Severity::Medium => "warning",
        Severity::Low => "note",
    }
}
