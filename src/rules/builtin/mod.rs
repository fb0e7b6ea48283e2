//! Built-in rule tables, one module per resource type.
//!
//! Rules that every type carries (diagnostics, naming, tags) come from the
//! shared builders below; each table supplies only its own ids, wording and
//! reference links.

pub mod aks;
pub mod container_apps;
pub mod eventhub;
pub mod front_door;
pub mod plan;
pub mod signalr;
pub mod site;

use std::sync::Arc;

use crate::context::{DiagnosticsSettings, ScanContext};
use crate::error::Result;
use crate::resource::{AzureResource, ServiceKind};
use crate::rules::{Check, LocalAuthMode, Outcome, Rule, RuleDeps, RuleMetadata, Severity};

pub(crate) const MONITORING: &str = "Monitoring and Logging";
pub(crate) const RESILIENCY: &str = "High Availability and Resiliency";
pub(crate) const SECURITY: &str = "Security";
pub(crate) const GOVERNANCE: &str = "Governance";

const CAF_URL: &str = "https://learn.microsoft.com/en-us/azure/cloud-adoption-framework/ready/azure-best-practices/resource-abbreviations";
const TAGS_URL: &str =
    "https://learn.microsoft.com/en-us/azure/azure-resource-manager/management/tag-resources?tabs=json";

pub(crate) fn meta(
    id: &str,
    category: &str,
    subcategory: &str,
    severity: Severity,
    description: &str,
    url: Option<&str>,
) -> RuleMetadata {
    RuleMetadata {
        id: id.into(),
        category: category.into(),
        subcategory: subcategory.into(),
        description: description.into(),
        severity,
        url: url.map(String::from),
    }
}

/// Broken when the resource has no diagnostic settings.
pub struct DiagnosticsCheck {
    settings: Arc<DiagnosticsSettings>,
}

impl<R: AzureResource> Check<R> for DiagnosticsCheck {
    fn eval(&self, resource: &R, _ctx: &ScanContext) -> Result<Outcome> {
        let has = self.settings.has_diagnostics(resource.id())?;
        Ok(Outcome::broken(!has))
    }
}

/// Broken when the name lacks the CAF prefix. Case-sensitive.
pub struct CafCheck {
    prefix: &'static str,
}

impl<R: AzureResource> Check<R> for CafCheck {
    fn eval(&self, resource: &R, _ctx: &ScanContext) -> Result<Outcome> {
        Ok(Outcome::broken(!resource.name().starts_with(self.prefix)))
    }
}

/// Broken when the tag map is absent or empty.
pub struct TagsCheck;

impl<R: AzureResource> Check<R> for TagsCheck {
    fn eval(&self, resource: &R, _ctx: &ScanContext) -> Result<Outcome> {
        let untagged = resource.tags().is_none_or(|t| t.is_empty());
        Ok(Outcome::broken(untagged))
    }
}

pub(crate) fn diagnostics_rule<R: AzureResource>(
    id: &str,
    noun: &str,
    url: Option<&str>,
    deps: &RuleDeps,
) -> Rule<R> {
    Rule::new(
        meta(
            id,
            MONITORING,
            "Diagnostic Logs",
            Severity::Medium,
            &format!("{noun} should have diagnostic settings enabled"),
            url,
        ),
        DiagnosticsCheck {
            settings: Arc::clone(&deps.diagnostics),
        },
    )
}

pub(crate) fn caf_rule<R: AzureResource>(id: &str, noun: &str, service: ServiceKind) -> Rule<R> {
    Rule::new(
        meta(
            id,
            GOVERNANCE,
            "Naming Convention (CAF)",
            Severity::Low,
            &format!("{noun} Name should comply with naming conventions"),
            Some(CAF_URL),
        ),
        CafCheck {
            prefix: service.caf_prefix(),
        },
    )
}

pub(crate) fn tags_rule<R: AzureResource>(id: &str, noun: &str) -> Rule<R> {
    Rule::new(
        meta(
            id,
            GOVERNANCE,
            "Use tags to organize your resources",
            Severity::Low,
            &format!("{noun} should have tags"),
            Some(TAGS_URL),
        ),
        TagsCheck,
    )
}

/// Every built-in rule, grouped by the service it belongs to.
pub fn catalog(local_auth: LocalAuthMode) -> Result<Vec<(ServiceKind, RuleMetadata)>> {
    let deps = RuleDeps::detached(local_auth);
    let mut all = Vec::new();
    for service in ServiceKind::ALL {
        let metadata = match service {
            ServiceKind::Aks => aks::rules(&deps)?.metadata(),
            ServiceKind::AppServicePlan => plan::rules(&deps)?.metadata(),
            ServiceKind::WebApp => site::app_rules(&deps)?.metadata(),
            ServiceKind::FunctionApp => site::function_rules(&deps)?.metadata(),
            ServiceKind::EventHub => eventhub::rules(&deps)?.metadata(),
            ServiceKind::SignalR => signalr::rules(&deps)?.metadata(),
            ServiceKind::ContainerApps => container_apps::rules(&deps)?.metadata(),
            ServiceKind::FrontDoor => front_door::rules(&deps)?.metadata(),
        };
        all.extend(metadata.into_iter().map(|m| (service, m)));
    }
    Ok(all)
}
