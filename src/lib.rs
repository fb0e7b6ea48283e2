//! azposture: posture scanner for Azure resources.
//!
//! Evaluates declarative rule sets against ARM resource metadata and
//! reports one summary row per resource plus a list of rule violations.
//! Resources are read from an offline snapshot of ARM list responses.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::path::Path;
//! use azposture::{scan, ScanOptions};
//!
//! let options = ScanOptions::default();
//! let report = scan(Path::new("./snapshot"), &options).unwrap();
//! println!("Pass: {}, Violations: {}", report.verdict.pass, report.violations.len());
//! ```

pub mod analyzer;
pub mod config;
pub mod context;
pub mod error;
pub mod lister;
pub mod output;
pub mod resource;
pub mod rules;
pub mod scanner;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use analyzer::AzureServiceResult;
use config::{parse_services, Config};
use context::ScanContext;
use error::Result;
use lister::Snapshot;
use output::OutputFormat;
use resource::ServiceKind;
use rules::policy::PolicyVerdict;
use rules::{RuleDeps, RuleViolation};
use scanner::Scanner;

/// Config file looked up in the snapshot root when none is given.
pub const DEFAULT_CONFIG_FILE: &str = ".azposture.toml";

/// Options for a scan invocation. Anything set here wins over the config
/// file.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Path to config file (defaults to `.azposture.toml` in the snapshot).
    pub config_path: Option<PathBuf>,
    /// Output format.
    pub format: OutputFormat,
    /// CLI override for fail_on threshold.
    pub fail_on_override: Option<rules::Severity>,
    pub subscription_id: Option<String>,
    pub resource_groups: Vec<String>,
    pub services: Vec<String>,
    pub parallel: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            config_path: None,
            format: OutputFormat::Console,
            fail_on_override: None,
            subscription_id: None,
            resource_groups: Vec::new(),
            services: Vec::new(),
            parallel: false,
        }
    }
}

/// Complete scan report.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub subscription_id: String,
    pub resource_groups: Vec<String>,
    pub services: Vec<ServiceKind>,
    pub rows: Vec<AzureServiceResult>,
    pub violations: Vec<RuleViolation>,
    pub verdict: PolicyVerdict,
    pub generated_at: DateTime<Utc>,
}

/// Run a complete scan: load config, index private endpoints, review every
/// resource group, evaluate policy.
pub fn scan(root: &Path, options: &ScanOptions) -> Result<ScanReport> {
    let config_path = options
        .config_path
        .clone()
        .unwrap_or_else(|| root.join(DEFAULT_CONFIG_FILE));
    let mut config = Config::load(&config_path)?;

    if let Some(fail_on) = options.fail_on_override {
        config.policy.fail_on = fail_on;
    }
    if options.parallel {
        config.scan.parallel = true;
    }

    let services = if options.services.is_empty() {
        config.services()?
    } else {
        parse_services(&options.services)?
    };

    let snapshot = Arc::new(Snapshot::open(root)?);

    let resource_groups = if !options.resource_groups.is_empty() {
        options.resource_groups.clone()
    } else if !config.scan.resource_groups.is_empty() {
        config.scan.resource_groups.clone()
    } else {
        snapshot.resource_groups()?
    };

    let subscription_id = options
        .subscription_id
        .clone()
        .or_else(|| config.scan.subscription_id.clone())
        .unwrap_or_else(|| "unknown".into());

    let ctx = ScanContext::build(snapshot.as_ref(), snapshot.clone())?;
    let deps = RuleDeps::from_context(&ctx, config.rules.local_auth);
    let scanner = Scanner::for_services(snapshot, &services, &deps, config.evaluation_options())?
        .parallel(config.scan.parallel);

    let review = scanner.run(&subscription_id, &resource_groups, &ctx)?;

    let violations = config.policy.apply(&review.violations);
    let verdict = config.policy.evaluate(&review.violations);

    Ok(ScanReport {
        subscription_id,
        resource_groups,
        services,
        rows: review.rows,
        violations,
        verdict,
        generated_at: Utc::now(),
    })
}

/// Render a scan report in the specified format.
pub fn render_report(report: &ScanReport, format: OutputFormat) -> Result<String> {
    output::render(report, format)
}

#[cfg(test)]
mod integration_tests {
    use super::*;
    use crate::analyzer::AzureServiceResult;
    use crate::rules::Severity;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    const CONTOSO: &str = "tests/fixtures/snapshots/contoso";

    fn options() -> ScanOptions {
        ScanOptions {
            subscription_id: Some("00000000-0000-0000-0000-000000000001".into()),
            ..Default::default()
        }
    }

    fn row<'a>(report: &'a ScanReport, name: &str) -> &'a AzureServiceResult {
        report
            .rows
            .iter()
            .find(|r| r.service_name == name)
            .unwrap_or_else(|| panic!("no row for {name}"))
    }

    #[test]
    fn contoso_rows() {
        let report = scan(Path::new(CONTOSO), &options()).unwrap();

        assert_eq!(report.resource_groups, vec!["rg-edge", "rg-prod"]);
        let rows = &report.rows;
        let names: Vec<&str> = rows.iter().map(|r| r.service_name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "cae-contoso",
                "afd-contoso",
                "aks-contoso-prod",
                "asp-contoso",
                "app-contoso-web",
                "func-contoso-jobs",
                "evh-contoso-orders",
                "chat-contoso",
            ]
        );

        let aks = row(&report, "aks-contoso-prod");
        assert_eq!(aks.sla, "99.95%");
        assert_eq!(aks.sku, "Standard");
        assert!(aks.availability_zones && aks.private_endpoints && aks.caf_naming);
        assert_eq!(aks.diagnostic_settings, Some(true));

        let web = row(&report, "app-contoso-web");
        assert!(web.private_endpoints);
        assert_eq!(web.diagnostic_settings, Some(false));

        let plan = row(&report, "asp-contoso");
        assert_eq!((plan.sku.as_str(), plan.sla.as_str()), ("P1v3", "99.95%"));
        assert!(plan.caf_naming);

        let signalr = row(&report, "chat-contoso");
        assert!(!signalr.caf_naming && !signalr.availability_zones && !signalr.private_endpoints);
        assert_eq!(signalr.sla, "99.9%");

        assert_eq!(row(&report, "evh-contoso-orders").sla, "99.99%");
        assert_eq!(row(&report, "afd-contoso").sku, "Premium_AzureFrontDoor");
    }

    #[test]
    fn contoso_fails_on_https() {
        let report = scan(Path::new(CONTOSO), &options()).unwrap();

        let violations = &report.violations;
        let mut ids: Vec<&str> = violations.iter().map(|v| v.rule_id.as_str()).collect();
        ids.sort();
        assert_eq!(ids, vec!["func-007", "func-008", "sigr-007"]);
        assert!(!report.verdict.pass);
        assert_eq!(report.verdict.highest_severity, Some(Severity::High));
    }

    #[test]
    fn config_can_ignore_and_narrow() {
        let dir = TempDir::new().unwrap();
        let config = dir.path().join("azposture.toml");
        std::fs::write(
            &config,
            r#"
[scan]
resource_groups = ["rg-prod"]
services = ["func", "sigr"]

[policy]
ignore_rules = ["func-007"]
"#,
        )
        .unwrap();

        let report = scan(
            Path::new(CONTOSO),
            &ScanOptions {
                config_path: Some(config),
                ..options()
            },
        )
        .unwrap();

        assert_eq!(report.rows.len(), 2);
        let expected = vec![ServiceKind::FunctionApp, ServiceKind::SignalR];
        assert_eq!(report.services, expected);
        assert!(report.verdict.pass);
        assert_eq!(report.verdict.effective_violations, 2);
    }

    #[test]
    fn cli_options_override_config() {
        let report = scan(
            Path::new(CONTOSO),
            &ScanOptions {
                resource_groups: vec!["rg-edge".into()],
                services: vec!["afd".into()],
                fail_on_override: Some(Severity::Low),
                parallel: true,
                ..options()
            },
        )
        .unwrap();

        assert_eq!(report.rows.len(), 1);
        assert!(report.violations.is_empty());
        assert!(report.verdict.pass);
        assert_eq!(report.verdict.fail_threshold, Severity::Low);
    }

    #[test]
    fn unknown_resource_group_fails() {
        let result = scan(
            Path::new(CONTOSO),
            &ScanOptions {
                resource_groups: vec!["rg-missing".into()],
                ..options()
            },
        );
        assert!(result.is_err());
    }

    #[test]
    fn parallel_scan_matches_sequential() {
        let sequential = scan(Path::new(CONTOSO), &options()).unwrap();
        let parallel = scan(
            Path::new(CONTOSO),
            &ScanOptions {
                parallel: true,
                ..options()
            },
        )
        .unwrap();
        assert_eq!(sequential.rows, parallel.rows);
        assert_eq!(sequential.violations, parallel.violations);
    }
}
