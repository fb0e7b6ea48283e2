use crate::error::Result;
use crate::resource::{sku_name, ServiceKind, SignalR};
use crate::rules::{keys, Outcome, Rule, RuleDeps, RuleSet, Severity};

use super::{caf_rule, diagnostics_rule, meta, tags_rule, RESILIENCY, SECURITY};

const NOUN: &str = "SignalR";

pub fn rules(deps: &RuleDeps) -> Result<RuleSet<SignalR>> {
    RuleSet::<SignalR>::new(ServiceKind::SignalR)
        .with(
            keys::DIAGNOSTIC_SETTINGS,
            diagnostics_rule(
                "sigr-001",
                NOUN,
                Some("https://learn.microsoft.com/en-us/azure/azure-signalr/signalr-howto-diagnostic-logs"),
                deps,
            ),
        )?
        .with(
            keys::AVAILABILITY_ZONES,
            Rule::predicate(
                meta(
                    "sigr-002",
                    RESILIENCY,
                    "Availability Zones",
                    Severity::High,
                    "SignalR should have availability zones enabled",
                    Some("https://learn.microsoft.com/en-us/azure/azure-signalr/availability-zones"),
                ),
                |s, _| Outcome::broken(!sku_name(s.sku.as_ref()).contains("Premium")),
            ),
        )?
        .with(
            keys::SLA,
            Rule::predicate(
                meta(
                    "sigr-003",
                    RESILIENCY,
                    "SLA",
                    Severity::High,
                    "SignalR should have a SLA",
                    Some("https://www.azure.cn/en-us/support/sla/signalr-service/"),
                ),
                |_, _| Outcome::with_value(false, "99.9%"),
            ),
        )?
        .with(
            keys::PRIVATE,
            Rule::predicate(
                meta(
                    "sigr-004",
                    SECURITY,
                    "Networking",
                    Severity::High,
                    "SignalR should have private endpoints enabled",
                    Some("https://learn.microsoft.com/en-us/azure/azure-signalr/howto-private-endpoints"),
                ),
                |s, _| Outcome::broken(!s.has_private_endpoints()),
            ),
        )?
        .with(
            keys::SKU,
            Rule::predicate(
                meta(
                    "sigr-005",
                    RESILIENCY,
                    "SKU",
                    Severity::High,
                    "SignalR SKU",
                    Some("https://azure.microsoft.com/en-us/pricing/details/signalr-service/"),
                ),
                |s, _| Outcome::with_value(false, sku_name(s.sku.as_ref())),
            ),
        )?
        .with(keys::CAF, caf_rule("sigr-006", NOUN, ServiceKind::SignalR))?
        .with("sigr-007", tags_rule("sigr-007", NOUN))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::fakes::empty_context;
    use crate::resource::Sku;
    use crate::rules::builtin::testing::tracked;
    use crate::rules::LocalAuthMode;

    fn signalr(sku: &str) -> SignalR {
        SignalR {
            tracked: tracked("sigr-chat", "Microsoft.SignalRService/signalR"),
            sku: Some(Sku {
                name: Some(sku.into()),
                tier: None,
            }),
            properties: None,
        }
    }

    fn eval(key: &str, s: &SignalR) -> Outcome {
        let ctx = empty_context();
        let set = rules(&RuleDeps::from_context(&ctx, LocalAuthMode::Literal)).unwrap();
        set.get(key).unwrap().eval(s, &ctx).unwrap()
    }

    #[test]
    fn premium_sku_means_zones() {
        let zones = |sku| eval("AvailabilityZones", &signalr(sku));
        assert_eq!(zones("Premium_P1"), Outcome::broken(false));
        assert_eq!(zones("Standard_S1"), Outcome::broken(true));
    }

    #[test]
    fn fixed_sla_and_sku_value() {
        let s = signalr("Free_F1");
        assert_eq!(eval("SLA", &s), Outcome::with_value(false, "99.9%"));
        assert_eq!(eval("SKU", &s), Outcome::with_value(false, "Free_F1"));
    }

    #[test]
    fn missing_properties_mean_no_private_endpoint() {
        let s = signalr("Premium_P1");
        assert_eq!(eval("Private", &s), Outcome::broken(true));
    }
}
