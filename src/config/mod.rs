use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::analyzer::{DiagnosticsErrorMode, EvaluationOptions};
use crate::error::{PostureError, Result};
use crate::resource::ServiceKind;
use crate::rules::policy::Policy;
use crate::rules::LocalAuthMode;

/// Top-level configuration from `.azposture.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub rules: RulesConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub policy: Policy,
}

/// `[scan]`: what to scan and how.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Subscription recorded on every row.
    #[serde(default)]
    pub subscription_id: Option<String>,
    /// Resource groups to review. Empty means every group in the snapshot.
    #[serde(default)]
    pub resource_groups: Vec<String>,
    /// Service abbreviations to review. Empty means all of them.
    #[serde(default)]
    pub services: Vec<String>,
    #[serde(default)]
    pub parallel: bool,
    #[serde(default)]
    pub on_diagnostics_error: DiagnosticsErrorMode,
}

/// `[rules]`: knobs for individual rules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RulesConfig {
    #[serde(default)]
    pub local_auth: LocalAuthMode,
}

/// `[report]`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Keep passing outcomes of non-structural rules in the report.
    #[serde(default)]
    pub include_passed: bool,
}

impl Config {
    /// Load config from a TOML file. Returns default if file doesn't exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Services selected by `[scan] services`, in the order given. Unknown
    /// names are a configuration error.
    pub fn services(&self) -> Result<Vec<ServiceKind>> {
        parse_services(&self.scan.services)
    }

    pub fn evaluation_options(&self) -> EvaluationOptions {
        EvaluationOptions {
            on_diagnostics_error: self.scan.on_diagnostics_error,
            include_passed: self.report.include_passed,
        }
    }

    /// Generate a starter config file.
    pub fn starter_toml() -> &'static str {
        r#"# azposture configuration

[scan]
# Subscription id written to every row.
# subscription_id = "00000000-0000-0000-0000-000000000000"

# Resource groups to review. Defaults to every group in the snapshot.
# resource_groups = ["rg-prod"]

# Services to review (aks, plan, app, func, evh, sigr, cae, afd). Defaults to all.
# services = ["aks", "evh"]

# Review services of one resource group concurrently.
parallel = false

# What to do when a diagnostic settings lookup fails: "abort" or "degrade".
on_diagnostics_error = "abort"

[rules]
# evh-008 reading of disableLocalAuth: "literal" passes when the flag is
# absent, "strict" requires it to be set to true.
local_auth = "literal"

[report]
# Also list rules that passed.
include_passed = false

[policy]
# Minimum severity to fail the scan (low, medium, high).
fail_on = "high"

# Rule IDs to ignore entirely.
# ignore_rules = ["aks-012"]

# Per-rule severity overrides.
# [policy.overrides]
# "aks-015" = "medium"
"#
    }
}

/// Parse service names leniently. An empty list selects every service.
pub fn parse_services(names: &[String]) -> Result<Vec<ServiceKind>> {
    if names.is_empty() {
        return Ok(ServiceKind::ALL.to_vec());
    }
    names
        .iter()
        .map(|name| {
            ServiceKind::from_str_lenient(name)
                .ok_or_else(|| PostureError::Config(format!("unknown service '{name}'")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Severity;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn missing_file_is_default() {
        let dir = TempDir::new().unwrap();
        let config = Config::load(&dir.path().join(".azposture.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.services().unwrap(), ServiceKind::ALL.to_vec());
    }

    #[test]
    fn starter_config_parses_to_defaults() {
        let config: Config = toml::from_str(Config::starter_toml()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn full_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".azposture.toml");
        std::fs::write(
            &path,
            r#"
[scan]
subscription_id = "sub-1"
resource_groups = ["rg-a", "rg-b"]
services = ["aks", "EventHub"]
parallel = true
on_diagnostics_error = "degrade"

[rules]
local_auth = "strict"

[report]
include_passed = true

[policy]
fail_on = "medium"
ignore_rules = ["aks-012"]

[policy.overrides]
"aks-015" = "high"
"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.scan.subscription_id.as_deref(), Some("sub-1"));
        assert_eq!(config.scan.resource_groups, vec!["rg-a", "rg-b"]);
        let services = config.services().unwrap();
        assert_eq!(services, vec![ServiceKind::Aks, ServiceKind::EventHub]);
        assert!(config.scan.parallel);
        assert_eq!(config.rules.local_auth, LocalAuthMode::Strict);
        assert_eq!(
            config.evaluation_options(),
            EvaluationOptions {
                on_diagnostics_error: DiagnosticsErrorMode::Degrade,
                include_passed: true,
            }
        );
        assert_eq!(config.policy.fail_on, Severity::Medium);
        assert!(config.policy.ignore_rules.contains("aks-012"));
        let overrides = &config.policy.overrides;
        assert_eq!(overrides.get("aks-015"), Some(&Severity::High));
    }

    #[test]
    fn unknown_service_rejected() {
        let err = parse_services(&["aks".into(), "storage".into()]).unwrap_err();
        assert!(matches!(err, PostureError::Config(_)));
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".azposture.toml");
        std::fs::write(&path, "[scan\nparallel = true").unwrap();
        assert!(matches!(Config::load(&path), Err(PostureError::Toml(_))));
    }
}
