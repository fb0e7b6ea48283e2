use crate::context::ScanContext;
use crate::error::Result;
use crate::resource::{ManagedCluster, ServiceKind};
use crate::rules::{keys, Check, Outcome, Rule, RuleDeps, RuleSet, Severity};

use super::{caf_rule, diagnostics_rule, meta, tags_rule, MONITORING, RESILIENCY, SECURITY};

const NOUN: &str = "AKS Cluster";

/// Addon rule: broken-ness depends on whether the addon is configured and
/// enabled. Keys are case-sensitive.
struct AddonCheck {
    addon: &'static str,
    broken_when_absent: bool,
    broken_when_enabled: bool,
}

impl Check<ManagedCluster> for AddonCheck {
    fn eval(&self, cluster: &ManagedCluster, _ctx: &ScanContext) -> Result<Outcome> {
        let broken = match cluster.addon_enabled(self.addon) {
            None => self.broken_when_absent,
            Some(enabled) => enabled == self.broken_when_enabled,
        };
        Ok(Outcome::broken(broken))
    }
}

/// aks-010 and aks-011 read opposite defaults for a missing addon entry.
const ADDONS: [(&str, &str, &str, &str, Severity, AddonCheck, &str); 2] = [
    (
        "aks-010",
        SECURITY,
        "Networking",
        "AKS should have httpApplicationRouting disabled",
        Severity::Medium,
        AddonCheck {
            addon: "httpApplicationRouting",
            broken_when_absent: false,
            broken_when_enabled: true,
        },
        "https://learn.microsoft.com/azure/aks/http-application-routing",
    ),
    (
        "aks-011",
        MONITORING,
        "Monitoring",
        "AKS should have Container Insights enabled",
        Severity::Medium,
        AddonCheck {
            addon: "omsagent",
            broken_when_absent: true,
            broken_when_enabled: false,
        },
        "https://learn.microsoft.com/azure/azure-monitor/insights/container-insights-overview",
    ),
];

fn sla(cluster: &ManagedCluster, _: &ScanContext) -> Outcome {
    let sla = if cluster.sku_tier() == "Free" {
        "None"
    } else if cluster.zone_redundant() {
        "99.95%"
    } else {
        "99.9%"
    };
    Outcome::with_value(sla == "None", sla)
}

pub fn rules(deps: &RuleDeps) -> Result<RuleSet<ManagedCluster>> {
    let mut set = RuleSet::<ManagedCluster>::new(ServiceKind::Aks)
        .with(
            keys::DIAGNOSTIC_SETTINGS,
            diagnostics_rule(
                "aks-001",
                NOUN,
                Some("https://learn.microsoft.com/en-us/azure/aks/monitor-aks#collect-resource-logs"),
                deps,
            ),
        )?
        .with(
            keys::AVAILABILITY_ZONES,
            Rule::predicate(
                meta(
                    "aks-002",
                    RESILIENCY,
                    "Availability Zones",
                    Severity::High,
                    "AKS Cluster should have availability zones enabled",
                    Some("https://learn.microsoft.com/en-us/azure/aks/availability-zones"),
                ),
                |c, _| Outcome::broken(!c.zone_redundant()),
            ),
        )?
        .with(
            keys::SLA,
            Rule::predicate(
                meta(
                    "aks-003",
                    RESILIENCY,
                    "SLA",
                    Severity::High,
                    "AKS Cluster should have an SLA",
                    Some("https://learn.microsoft.com/en-us/azure/aks/free-standard-pricing-tiers#uptime-sla-terms-and-conditions"),
                ),
                sla,
            ),
        )?
        .with(
            keys::PRIVATE,
            Rule::predicate(
                meta(
                    "aks-004",
                    SECURITY,
                    "Networking",
                    Severity::High,
                    "AKS Cluster should be private",
                    Some("https://learn.microsoft.com/en-us/azure/aks/private-clusters"),
                ),
                |c, _| Outcome::broken(!c.private_cluster()),
            ),
        )?
        .with(
            keys::SKU,
            Rule::predicate(
                meta(
                    "aks-005",
                    RESILIENCY,
                    "SKU",
                    Severity::High,
                    "AKS Production Cluster should use Standard SKU",
                    Some("https://learn.microsoft.com/en-us/azure/aks/free-standard-pricing-tiers"),
                ),
                |c, _| {
                    let tier = c.sku_tier();
                    Outcome::with_value(tier == "Free", tier)
                },
            ),
        )?
        .with(keys::CAF, caf_rule("aks-006", NOUN, ServiceKind::Aks))?
        .with(
            "aks-007",
            Rule::predicate(
                meta(
                    "aks-007",
                    SECURITY,
                    "Identity and Access Control",
                    Severity::Medium,
                    "AKS should integrate authentication with AAD (Managed)",
                    Some("https://learn.microsoft.com/azure/aks/managed-aad"),
                ),
                |c, _| {
                    let aad = c
                        .properties
                        .as_ref()
                        .is_some_and(|props| props.aad_profile.is_some());
                    Outcome::broken(!aad)
                },
            ),
        )?
        .with(
            "aks-008",
            Rule::predicate(
                meta(
                    "aks-008",
                    SECURITY,
                    "Identity and Access Control",
                    Severity::Medium,
                    "AKS should be RBAC enabled.",
                    Some("https://learn.microsoft.com/azure/aks/manage-azure-rbac"),
                ),
                |c, _| {
                    let rbac = c.properties.as_ref().and_then(|p| p.enable_rbac);
                    Outcome::broken(!rbac.unwrap_or(false))
                },
            ),
        )?
        .with(
            "aks-009",
            Rule::predicate(
                meta(
                    "aks-009",
                    SECURITY,
                    "Identity and Access Control",
                    Severity::Medium,
                    "AKS should have local accounts disabled",
                    Some("https://learn.microsoft.com/azure/aks/managed-aad#disable-local-accounts"),
                ),
                |c, _| {
                    let disabled = c
                        .properties
                        .as_ref()
                        .and_then(|props| props.disable_local_accounts);
                    Outcome::broken(!disabled.unwrap_or(false))
                },
            ),
        )?
        .with(
            "aks-012",
            Rule::predicate(
                meta(
                    "aks-012",
                    SECURITY,
                    "Networking",
                    Severity::Low,
                    "AKS should have outbound type set to user defined routing",
                    Some("https://learn.microsoft.com/azure/aks/limit-egress-traffic"),
                ),
                |c, _| {
                    let udr = c
                        .network_profile()
                        .and_then(|n| n.outbound_type.as_deref())
                        .is_some_and(|t| t == "userDefinedRouting");
                    Outcome::broken(!udr)
                },
            ),
        )?
        .with(
            "aks-013",
            Rule::predicate(
                meta(
                    "aks-013",
                    RESILIENCY,
                    "Networking",
                    Severity::Medium,
                    "AKS should avoid using kubenet network plugin",
                    Some("https://learn.microsoft.com/azure/aks/operator-best-practices-network"),
                ),
                |c, _| {
                    let kubenet = c
                        .network_profile()
                        .and_then(|n| n.network_plugin.as_deref())
                        .is_some_and(|p| p == "kubenet");
                    Outcome::broken(kubenet)
                },
            ),
        )?
        .with(
            "aks-014",
            Rule::predicate(
                meta(
                    "aks-014",
                    RESILIENCY,
                    "Scaling",
                    Severity::Medium,
                    "AKS should have autoscaler enabled",
                    Some("https://learn.microsoft.com/azure/aks/concepts-scale"),
                ),
                |c, _| {
                    let pools = c.agent_pools();
                    let all_scale = pools.iter().all(|p| p.enable_auto_scaling == Some(true));
                    Outcome::broken(pools.is_empty() || !all_scale)
                },
            ),
        )?
        .with("aks-015", tags_rule("aks-015", NOUN))?;

    for (id, category, area, description, severity, check, url) in ADDONS {
        set.register(
            id,
            Rule::new(
                meta(id, category, area, severity, description, Some(url)),
                check,
            ),
        )?;
    }

    Ok(set)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::context::fakes::{context, empty_context};
    use crate::resource::aks::*;
    use crate::rules::builtin::testing::{tags, tracked};
    use crate::rules::LocalAuthMode;

    const TYPE: &str = "Microsoft.ContainerService/managedClusters";

    fn eval(key: &str, cluster: &ManagedCluster) -> Outcome {
        let ctx = empty_context();
        let deps = RuleDeps::from_context(&ctx, LocalAuthMode::Literal);
        let set = rules(&deps).unwrap();
        set.get(key).unwrap().eval(cluster, &ctx).unwrap()
    }

    fn cluster(tier: &str, zones: &[&[&str]]) -> ManagedCluster {
        let pools = zones
            .iter()
            .map(|z| AgentPoolProfile {
                availability_zones: Some(z.iter().map(|s| s.to_string()).collect()),
                ..Default::default()
            })
            .collect();
        ManagedCluster {
            tracked: tracked("aks-test", TYPE),
            sku: Some(ManagedClusterSku {
                name: Some("Base".into()),
                tier: Some(tier.into()),
            }),
            properties: Some(ManagedClusterProperties {
                agent_pool_profiles: Some(pools),
                ..Default::default()
            }),
        }
    }

    fn with_props(props: ManagedClusterProperties) -> ManagedCluster {
        ManagedCluster {
            tracked: tracked("aks-test", TYPE),
            sku: None,
            properties: Some(props),
        }
    }

    fn bare() -> ManagedCluster {
        with_props(Default::default())
    }

    fn addons(entries: &[(&str, bool)]) -> ManagedCluster {
        let profiles: HashMap<_, _> = entries
            .iter()
            .map(|(k, v)| (k.to_string(), AddonProfile { enabled: Some(*v) }))
            .collect();
        with_props(ManagedClusterProperties {
            addon_profiles: Some(profiles),
            ..Default::default()
        })
    }

    fn zones(pools: &[&[&str]]) -> Outcome {
        eval("AvailabilityZones", &cluster("Paid", pools))
    }

    fn sla(tier: &str, pools: &[&[&str]]) -> Outcome {
        eval("SLA", &cluster(tier, pools))
    }

    #[test]
    fn diagnostics_settings() {
        let c = cluster("Paid", &[]);
        let ctx = context(&[], &[c.tracked.id.as_str()]);
        let deps = RuleDeps::from_context(&ctx, LocalAuthMode::Literal);
        let set = rules(&deps).unwrap();
        let rule = set.get("DiagnosticSettings").unwrap();
        assert_eq!(rule.eval(&c, &ctx).unwrap(), Outcome::broken(false));

        let other = ManagedCluster {
            tracked: tracked("aks-other", TYPE),
            ..c
        };
        assert_eq!(rule.eval(&other, &ctx).unwrap(), Outcome::broken(true));
    }

    #[test]
    fn availability_zones() {
        assert_eq!(zones(&[&["1", "2", "3"]]), Outcome::broken(false));
        assert_eq!(zones(&[&["1", "2"], &["1"]]), Outcome::broken(true));
        assert_eq!(zones(&[]), Outcome::broken(true));
    }

    #[test]
    fn private_cluster() {
        let c = with_props(ManagedClusterProperties {
            api_server_access_profile: Some(ApiServerAccessProfile {
                enable_private_cluster: Some(true),
            }),
            ..Default::default()
        });
        assert_eq!(eval("Private", &c), Outcome::broken(false));
        assert_eq!(eval("Private", &bare()), Outcome::broken(true));
    }

    #[test]
    fn sla_free() {
        assert_eq!(sla("Free", &[&[]]), Outcome::with_value(true, "None"));
        assert_eq!(
            sla("Free", &[&["1", "2", "3"]]),
            Outcome::with_value(true, "None")
        );
    }

    #[test]
    fn sla_paid() {
        assert_eq!(sla("Paid", &[&[]]), Outcome::with_value(false, "99.9%"));
    }

    #[test]
    fn sla_paid_with_zones() {
        assert_eq!(
            sla("Paid", &[&["1", "2", "3"]]),
            Outcome::with_value(false, "99.95%")
        );
    }

    #[test]
    fn sku() {
        let free = eval("SKU", &cluster("Free", &[]));
        assert_eq!(free, Outcome::with_value(true, "Free"));
        let paid = eval("SKU", &cluster("Paid", &[]));
        assert_eq!(paid, Outcome::with_value(false, "Paid"));
    }

    #[test]
    fn caf() {
        assert_eq!(eval("CAF", &cluster("Free", &[])), Outcome::broken(false));
        let c = ManagedCluster {
            tracked: tracked("test", TYPE),
            ..Default::default()
        };
        assert_eq!(eval("CAF", &c), Outcome::broken(true));
        let c = ManagedCluster {
            tracked: tracked("AKS-test", TYPE),
            ..Default::default()
        };
        assert_eq!(eval("CAF", &c), Outcome::broken(true));
    }

    #[test]
    fn aad_profile() {
        let present = with_props(ManagedClusterProperties {
            aad_profile: Some(serde_json::json!({})),
            ..Default::default()
        });
        assert_eq!(eval("aks-007", &present), Outcome::broken(false));
        assert_eq!(eval("aks-007", &bare()), Outcome::broken(true));
    }

    #[test]
    fn rbac() {
        let flag = |v| {
            with_props(ManagedClusterProperties {
                enable_rbac: v,
                ..Default::default()
            })
        };
        assert_eq!(eval("aks-008", &flag(Some(true))), Outcome::broken(false));
        assert_eq!(eval("aks-008", &flag(Some(false))), Outcome::broken(true));
        assert_eq!(eval("aks-008", &flag(None)), Outcome::broken(true));
    }

    #[test]
    fn local_accounts() {
        let flag = |v| {
            with_props(ManagedClusterProperties {
                disable_local_accounts: v,
                ..Default::default()
            })
        };
        assert_eq!(eval("aks-009", &flag(Some(true))), Outcome::broken(false));
        assert_eq!(eval("aks-009", &flag(None)), Outcome::broken(true));
    }

    #[test]
    fn http_application_routing() {
        let routing = |enabled| eval("aks-010", &addons(&[("httpApplicationRouting", enabled)]));
        assert_eq!(routing(true), Outcome::broken(true));
        assert_eq!(routing(false), Outcome::broken(false));
        assert_eq!(eval("aks-010", &addons(&[])), Outcome::broken(false));
    }

    #[test]
    fn oms_agent() {
        let oms = |name, enabled| eval("aks-011", &addons(&[(name, enabled)]));
        assert_eq!(oms("omsagent", true), Outcome::broken(false));
        assert_eq!(oms("omsagent", false), Outcome::broken(true));
        assert_eq!(eval("aks-011", &addons(&[])), Outcome::broken(true));
        // Addon keys are case-sensitive.
        assert_eq!(oms("omsAgent", true), Outcome::broken(true));
    }

    #[test]
    fn outbound_type() {
        let outbound = |t: &str| {
            with_props(ManagedClusterProperties {
                network_profile: Some(NetworkProfile {
                    outbound_type: Some(t.into()),
                    ..Default::default()
                }),
                ..Default::default()
            })
        };
        let udr = eval("aks-012", &outbound("userDefinedRouting"));
        assert_eq!(udr, Outcome::broken(false));
        let lb = eval("aks-012", &outbound("loadBalancer"));
        assert_eq!(lb, Outcome::broken(true));
        assert_eq!(eval("aks-012", &bare()), Outcome::broken(true));
    }

    #[test]
    fn kubenet() {
        let plugin = |p: &str| {
            with_props(ManagedClusterProperties {
                network_profile: Some(NetworkProfile {
                    network_plugin: Some(p.into()),
                    ..Default::default()
                }),
                ..Default::default()
            })
        };
        assert_eq!(eval("aks-013", &plugin("kubenet")), Outcome::broken(true));
        assert_eq!(eval("aks-013", &plugin("azure")), Outcome::broken(false));
    }

    #[test]
    fn autoscaling() {
        let pools = |p: Option<Vec<Option<bool>>>| {
            let profiles = p.map(|flags| {
                flags
                    .into_iter()
                    .map(|f| AgentPoolProfile {
                        enable_auto_scaling: f,
                        ..Default::default()
                    })
                    .collect()
            });
            let props = ManagedClusterProperties {
                agent_pool_profiles: profiles,
                ..Default::default()
            };
            eval("aks-014", &with_props(props))
        };
        assert_eq!(pools(None), Outcome::broken(true));
        assert_eq!(pools(Some(vec![])), Outcome::broken(true));
        assert_eq!(pools(Some(vec![Some(false)])), Outcome::broken(true));
        assert_eq!(pools(Some(vec![Some(true), None])), Outcome::broken(true));
        assert_eq!(pools(Some(vec![Some(true)])), Outcome::broken(false));
    }

    #[test]
    fn tags_present() {
        let mut c = cluster("Paid", &[]);
        assert_eq!(eval("aks-015", &c), Outcome::broken(true));
        c.tracked.tags = tags(&[]);
        assert_eq!(eval("aks-015", &c), Outcome::broken(true));
        c.tracked.tags = tags(&[("env", "prod")]);
        assert_eq!(eval("aks-015", &c), Outcome::broken(false));
    }
}
