use crate::context::ScanContext;
use crate::error::Result;
use crate::resource::{sku_name, EventHubNamespace, ServiceKind};
use crate::rules::{keys, Check, LocalAuthMode, Outcome, Rule, RuleDeps, RuleSet, Severity};

use super::{caf_rule, diagnostics_rule, meta, tags_rule, RESILIENCY, SECURITY};

const NOUN: &str = "Event Hub Namespace";

/// evh-008. Reads `disableLocalAuth` according to the configured mode.
struct LocalAuthCheck {
    mode: LocalAuthMode,
}

impl Check<EventHubNamespace> for LocalAuthCheck {
    fn eval(&self, namespace: &EventHubNamespace, _ctx: &ScanContext) -> Result<Outcome> {
        Ok(Outcome::broken(self.mode.is_broken(namespace.disable_local_auth())))
    }
}

fn sla(namespace: &EventHubNamespace, _: &ScanContext) -> Outcome {
    match namespace.sku.as_ref().and_then(|s| s.name.as_deref()) {
        None => Outcome::with_value(true, "None"),
        Some(sku) if sku.contains("Basic") || sku.contains("Standard") => {
            Outcome::with_value(false, "99.95%")
        }
        Some(_) => Outcome::with_value(false, "99.99%"),
    }
}

pub fn rules(deps: &RuleDeps) -> Result<RuleSet<EventHubNamespace>> {
    RuleSet::<EventHubNamespace>::new(ServiceKind::EventHub)
        .with(
            keys::DIAGNOSTIC_SETTINGS,
            diagnostics_rule(
                "evh-001",
                NOUN,
                Some("https://learn.microsoft.com/en-us/azure/event-hubs/monitor-event-hubs#collection-and-routing"),
                deps,
            ),
        )?
        .with(
            keys::AVAILABILITY_ZONES,
            Rule::predicate(
                meta(
                    "evh-002",
                    RESILIENCY,
                    "Availability Zones",
                    Severity::High,
                    "Event Hub Namespace should have availability zones enabled",
                    Some("https://learn.microsoft.com/en-us/azure/event-hubs/event-hubs-premium-overview#high-availability-with-availability-zones"),
                ),
                |n, _| Outcome::broken(!n.zone_redundant()),
            ),
        )?
        .with(
            keys::SLA,
            Rule::predicate(
                meta(
                    "evh-003",
                    RESILIENCY,
                    "SLA",
                    Severity::High,
                    "Event Hub Namespace should have a SLA",
                    Some("https://www.azure.cn/en-us/support/sla/event-hubs/"),
                ),
                sla,
            ),
        )?
        .with(
            keys::PRIVATE,
            Rule::predicate(
                meta(
                    "evh-004",
                    SECURITY,
                    "Networking",
                    Severity::High,
                    "Event Hub Namespace should have private endpoints enabled",
                    Some("https://learn.microsoft.com/en-us/azure/event-hubs/network-security"),
                ),
                |n, _| Outcome::broken(!n.has_private_endpoints()),
            ),
        )?
        .with(
            keys::SKU,
            Rule::predicate(
                meta(
                    "evh-005",
                    RESILIENCY,
                    "SKU",
                    Severity::High,
                    "Event Hub Namespace SKU",
                    Some("https://learn.microsoft.com/en-us/azure/event-hubs/compare-tiers"),
                ),
                |n, _| Outcome::with_value(false, sku_name(n.sku.as_ref())),
            ),
        )?
        .with(keys::CAF, caf_rule("evh-006", NOUN, ServiceKind::EventHub))?
        .with("evh-007", tags_rule("evh-007", "Event Hub"))?
        .with(
            "evh-008",
            Rule::new(
                meta(
                    "evh-008",
                    SECURITY,
                    "Identity and Access Control",
                    Severity::Medium,
                    "Event Hub should have local authentication disabled",
                    Some("https://learn.microsoft.com/en-us/azure/event-hubs/authorize-access-event-hubs#shared-access-signatures"),
                ),
                LocalAuthCheck {
                    mode: deps.local_auth,
                },
            ),
        )
}
