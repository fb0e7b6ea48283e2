use crate::error::Result;
use crate::resource::{ManagedEnvironment, ServiceKind};
use crate::rules::{keys, Outcome, Rule, RuleDeps, RuleSet, Severity};

use super::{caf_rule, diagnostics_rule, meta, tags_rule, RESILIENCY, SECURITY};

const NOUN: &str = "ContainerApp";

pub fn rules(deps: &RuleDeps) -> Result<RuleSet<ManagedEnvironment>> {
    RuleSet::<ManagedEnvironment>::new(ServiceKind::ContainerApps)
        .with(
            keys::DIAGNOSTIC_SETTINGS,
            diagnostics_rule(
                "cae-001",
                NOUN,
                Some("https://learn.microsoft.com/en-us/azure/container-apps/log-options#diagnostic-settings"),
                deps,
            ),
        )?
        .with(
            keys::AVAILABILITY_ZONES,
            Rule::predicate(
                meta(
                    "cae-002",
                    RESILIENCY,
                    "Availability Zones",
                    Severity::High,
                    "ContainerApp should have availability zones enabled",
                    Some("https://learn.microsoft.com/en-us/azure/container-apps/disaster-recovery?tabs=bash#set-up-zone-redundancy-in-your-container-apps-environment"),
                ),
                |e, _| Outcome::broken(!e.zone_redundant()),
            ),
        )?
        .with(
            keys::SLA,
            Rule::predicate(
                meta(
                    "cae-003",
                    RESILIENCY,
                    "SLA",
                    Severity::High,
                    "ContainerApp should have a SLA",
                    Some("https://azure.microsoft.com/en-us/support/legal/sla/container-apps/v1_0/"),
                ),
                |_, _| Outcome::with_value(false, "99.95%"),
            ),
        )?
        .with(
            keys::PRIVATE,
            Rule::predicate(
                meta(
                    "cae-004",
                    SECURITY,
                    "Networking",
                    Severity::High,
                    "ContainerApp should have private endpoints enabled",
                    Some("https://learn.microsoft.com/en-us/azure/container-apps/vnet-custom-internal?tabs=bash&pivots=azure-portal"),
                ),
                |e, _| Outcome::broken(!e.internal()),
            ),
        )?
        .with(
            keys::CAF,
            caf_rule("cae-006", NOUN, ServiceKind::ContainerApps),
        )?
        .with("cae-007", tags_rule("cae-007", NOUN))
}
