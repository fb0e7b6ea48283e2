use crate::analyzer::AzureServiceResult;
use crate::rules::{RuleViolation, Severity};
use crate::ScanReport;

fn mark(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

fn diagnostics_mark(row: &AzureServiceResult) -> &'static str {
    match row.diagnostic_settings {
        Some(flag) => mark(flag),
        None => "?",
    }
}

/// Render the report as a plain console table followed by violations,
/// highest severity first.
pub fn render(report: &ScanReport) -> String {
    let mut output = String::new();

    if report.rows.is_empty() {
        output.push_str("\n  No resources found.\n");
    } else {
        output.push_str(&format!(
            "\n  {} resource(s) in {} resource group(s):\n\n",
            report.rows.len(),
            report.resource_groups.len()
        ));
        output.push_str(&format!(
            "  {:<16} {:<28} {:<44} {:<16} {:<8} {:<5} {:<7} {:<5} {:<4}\n",
            "RESOURCE GROUP", "NAME", "TYPE", "SKU", "SLA", "AZ", "PRIVATE", "DIAG", "CAF"
        ));
        output.push_str(&format!("  {}\n", "-".repeat(140)));
        for row in &report.rows {
            output.push_str(&format!(
                "  {:<16} {:<28} {:<44} {:<16} {:<8} {:<5} {:<7} {:<5} {:<4}\n",
                row.resource_group,
                row.service_name,
                row.resource_type,
                row.sku,
                row.sla,
                mark(row.availability_zones),
                mark(row.private_endpoints),
                diagnostics_mark(row),
                mark(row.caf_naming),
            ));
        }
    }

    let broken: Vec<&RuleViolation> = report.violations.iter().filter(|v| v.broken).collect();
    if broken.is_empty() {
        output.push_str("\n  No rule violations detected.\n\n");
    } else {
        let mut sorted = broken;
        sorted.sort_by(|a, b| {
            b.severity
                .cmp(&a.severity)
                .then_with(|| a.rule_id.cmp(&b.rule_id))
                .then_with(|| a.resource_name.cmp(&b.resource_name))
        });

        output.push_str(&format!("\n  {} violation(s) detected:\n\n", sorted.len()));
        for violation in &sorted {
            let severity_tag = match violation.severity {
                Severity::High => "[HIGH]  ",
                Severity::Medium => "[MEDIUM]",
                Severity::Low => "[LOW]   ",
            };
            output.push_str(&format!(
                "  {} {} {}\n",
                severity_tag, violation.rule_id, violation.description
            ));
            output.push_str(&format!("           at {}\n", violation.resource_id));
            if let Some(url) = &violation.url {
                output.push_str(&format!("           see: {}\n", url));
            }
            output.push('\n');
        }
    }

    let status = if report.verdict.pass { "PASS" } else { "FAIL" };
    output.push_str(&format!(
        "  Result: {} (threshold: {}, highest: {})\n\n",
        status,
        report.verdict.fail_threshold,
        report
            .verdict
            .highest_severity
            .map(|s| s.to_string())
            .unwrap_or_else(|| "none".into()),
    ));

    output
}
