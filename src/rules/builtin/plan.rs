use crate::context::ScanContext;
use crate::error::Result;
use crate::resource::{sku_name, AppServicePlan, ServiceKind};
use crate::rules::{keys, Outcome, Rule, RuleDeps, RuleSet, Severity};

use super::{caf_rule, diagnostics_rule, meta, tags_rule, RESILIENCY};

const NOUN: &str = "Plan";

fn sla(plan: &AppServicePlan, _: &ScanContext) -> Outcome {
    match plan.sku_tier() {
        None | Some("Free" | "Shared") => Outcome::with_value(true, "None"),
        Some(_) => Outcome::with_value(false, "99.95%"),
    }
}

pub fn rules(deps: &RuleDeps) -> Result<RuleSet<AppServicePlan>> {
    RuleSet::<AppServicePlan>::new(ServiceKind::AppServicePlan)
        .with(
            keys::DIAGNOSTIC_SETTINGS,
            diagnostics_rule("plan-001", NOUN, None, deps),
        )?
        .with(
            keys::AVAILABILITY_ZONES,
            Rule::predicate(
                meta(
                    "plan-002",
                    RESILIENCY,
                    "Availability Zones",
                    Severity::High,
                    "Plan should have availability zones enabled",
                    Some("https://learn.microsoft.com/en-us/azure/reliability/migrate-app-service"),
                ),
                |p, _| Outcome::broken(!p.zone_redundant()),
            ),
        )?
        .with(
            keys::SLA,
            Rule::predicate(
                meta(
                    "plan-003",
                    RESILIENCY,
                    "SLA",
                    Severity::High,
                    "Plan should have a SLA",
                    Some("https://www.azure.cn/en-us/support/sla/app-service/"),
                ),
                sla,
            ),
        )?
        .with(
            keys::SKU,
            Rule::predicate(
                meta(
                    "plan-005",
                    RESILIENCY,
                    "SKU",
                    Severity::High,
                    "Plan SKU",
                    Some("https://learn.microsoft.com/en-us/azure/app-service/overview-hosting-plans"),
                ),
                |p, _| Outcome::with_value(false, sku_name(p.sku.as_ref())),
            ),
        )?
        .with(
            keys::CAF,
            caf_rule("plan-006", NOUN, ServiceKind::AppServicePlan),
        )?
        .with("plan-007", tags_rule("plan-007", NOUN))
}
