use crate::error::Result;
use crate::resource::{sku_name, FrontDoorProfile, ServiceKind};
use crate::rules::{keys, Outcome, Rule, RuleDeps, RuleSet, Severity};

use super::{caf_rule, diagnostics_rule, meta, tags_rule, RESILIENCY};

const NOUN: &str = "Azure FrontDoor";

pub fn rules(deps: &RuleDeps) -> Result<RuleSet<FrontDoorProfile>> {
    RuleSet::<FrontDoorProfile>::new(ServiceKind::FrontDoor)
        .with(
            keys::DIAGNOSTIC_SETTINGS,
            diagnostics_rule(
                "afd-001",
                NOUN,
                Some("https://learn.microsoft.com/en-us/azure/frontdoor/standard-premium/how-to-logs"),
                deps,
            ),
        )?
        .with(
            keys::SLA,
            Rule::predicate(
                meta(
                    "afd-003",
                    RESILIENCY,
                    "SLA",
                    Severity::High,
                    "Azure FrontDoor SLA",
                    Some("https://www.azure.cn/en-us/support/sla/cdn/"),
                ),
                |_, _| Outcome::with_value(false, "99.99%"),
            ),
        )?
        .with(
            keys::SKU,
            Rule::predicate(
                meta(
                    "afd-005",
                    RESILIENCY,
                    "SKU",
                    Severity::High,
                    "Azure FrontDoor SKU",
                    Some("https://learn.microsoft.com/en-us/azure/frontdoor/standard-premium/tier-comparison"),
                ),
                |p, _| Outcome::with_value(false, sku_name(p.sku.as_ref())),
            ),
        )?
        .with(keys::CAF, caf_rule("afd-006", NOUN, ServiceKind::FrontDoor))?
        .with("afd-007", tags_rule("afd-007", NOUN))
}
