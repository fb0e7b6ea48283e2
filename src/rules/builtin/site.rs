use crate::context::ScanContext;
use crate::error::Result;
use crate::resource::{AzureResource, ServiceKind, Site};
use crate::rules::{keys, Outcome, Rule, RuleDeps, RuleSet, Severity};

use super::{caf_rule, diagnostics_rule, meta, tags_rule, SECURITY};

const HTTPS_URL: &str =
    "https://learn.microsoft.com/azure/app-service/configure-ssl-bindings#enforce-https";

/// Per-flavour wording and links; web apps and function apps otherwise
/// share the same checks.
struct SiteTable {
    service: ServiceKind,
    noun: &'static str,
    diagnostics_url: &'static str,
    private_url: &'static str,
}

const WEB_APP: SiteTable = SiteTable {
    service: ServiceKind::WebApp,
    noun: "App Service",
    diagnostics_url: "https://learn.microsoft.com/en-us/azure/app-service/troubleshoot-diagnostic-logs#send-logs-to-azure-monitor",
    private_url: "https://learn.microsoft.com/en-us/azure/app-service/networking/private-endpoint",
};

const FUNCTION_APP: SiteTable = SiteTable {
    service: ServiceKind::FunctionApp,
    noun: "Function",
    diagnostics_url: "https://learn.microsoft.com/en-us/azure/azure-functions/functions-monitor-log-analytics?tabs=csharp",
    private_url: "https://learn.microsoft.com/en-us/azure/azure-functions/functions-create-vnet",
};

fn private_endpoint(site: &Site, ctx: &ScanContext) -> Outcome {
    Outcome::broken(!ctx.private_endpoints().contains(site.id()))
}

fn https_only(site: &Site, _: &ScanContext) -> Outcome {
    Outcome::broken(!site.https_only())
}

fn build(table: &SiteTable, deps: &RuleDeps) -> Result<RuleSet<Site>> {
    let prefix = table.service.abbreviation();
    let id = |n: u8| format!("{prefix}-{n:03}");

    RuleSet::<Site>::new(table.service)
        .with(
            keys::DIAGNOSTIC_SETTINGS,
            diagnostics_rule(&id(1), table.noun, Some(table.diagnostics_url), deps),
        )?
        .with(
            keys::PRIVATE,
            Rule::predicate(
                meta(
                    &id(4),
                    SECURITY,
                    "Networking",
                    Severity::High,
                    &format!("{} should have private endpoints enabled", table.noun),
                    Some(table.private_url),
                ),
                private_endpoint,
            ),
        )?
        .with(keys::CAF, caf_rule(&id(6), table.noun, table.service))?
        .with(
            &id(7),
            Rule::predicate(
                meta(
                    &id(7),
                    SECURITY,
                    "Network Security",
                    Severity::High,
                    &format!("{} should use HTTPS only", table.noun),
                    Some(HTTPS_URL),
                ),
                https_only,
            ),
        )?
        .with(&id(8), tags_rule(&id(8), table.noun))
}

pub fn app_rules(deps: &RuleDeps) -> Result<RuleSet<Site>> {
    build(&WEB_APP, deps)
}

pub fn function_rules(deps: &RuleDeps) -> Result<RuleSet<Site>> {
    build(&FUNCTION_APP, deps)
}
