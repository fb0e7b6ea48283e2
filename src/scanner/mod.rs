//! Scan orchestration across resource groups and analyzers.

use std::sync::Arc;

use crate::analyzer::{EvaluationOptions, ResourceAnalyzer, ServiceAnalyzer, ServiceReview};
use crate::context::ScanContext;
use crate::error::{PostureError, Result};
use crate::lister::ResourceProvider;
use crate::resource::{
    AppServicePlan, EventHubNamespace, FrontDoorProfile, ManagedCluster, ManagedEnvironment,
    ServiceKind, SignalR, Site,
};
use crate::rules::builtin::{aks, container_apps, eventhub, front_door, plan, signalr, site};
use crate::rules::{RuleDeps, RuleMetadata};

/// Runs every registered analyzer over every requested resource group.
pub struct Scanner {
    analyzers: Vec<Box<dyn ServiceAnalyzer>>,
    parallel: bool,
}

impl Scanner {
    pub fn new(analyzers: Vec<Box<dyn ServiceAnalyzer>>) -> Self {
        Self {
            analyzers,
            parallel: false,
        }
    }

    /// Review analyzers of one resource group on scoped threads. Output
    /// order is unchanged.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Build one analyzer per service, in the order given. Repeated
    /// services are registered once.
    pub fn for_services<P>(
        provider: Arc<P>,
        services: &[ServiceKind],
        deps: &RuleDeps,
        options: EvaluationOptions,
    ) -> Result<Self>
    where
        P: ResourceProvider + 'static,
    {
        let mut analyzers: Vec<Box<dyn ServiceAnalyzer>> = Vec::new();
        let mut seen = Vec::new();

        for &service in services {
            if seen.contains(&service) {
                continue;
            }
            seen.push(service);

            let analyzer: Box<dyn ServiceAnalyzer> = match service {
                ServiceKind::Aks => Box::new(
                    ResourceAnalyzer::<ManagedCluster>::new(provider.clone(), aks::rules(deps)?)
                        .with_options(options),
                ),
                ServiceKind::AppServicePlan => Box::new(
                    ResourceAnalyzer::<AppServicePlan>::new(provider.clone(), plan::rules(deps)?)
                        .with_options(options),
                ),
                ServiceKind::WebApp => Box::new(
                    ResourceAnalyzer::<Site>::new(provider.clone(), site::app_rules(deps)?)
                        .with_filter(Site::is_web_app)
                        .with_options(options),
                ),
                ServiceKind::FunctionApp => Box::new(
                    ResourceAnalyzer::<Site>::new(provider.clone(), site::function_rules(deps)?)
                        .with_filter(Site::is_function_app)
                        .with_options(options),
                ),
                ServiceKind::EventHub => Box::new(
                    ResourceAnalyzer::<EventHubNamespace>::new(
                        provider.clone(),
                        eventhub::rules(deps)?,
                    )
                    .with_options(options),
                ),
                ServiceKind::SignalR => Box::new(
                    ResourceAnalyzer::<SignalR>::new(provider.clone(), signalr::rules(deps)?)
                        .with_options(options),
                ),
                ServiceKind::ContainerApps => Box::new(
                    ResourceAnalyzer::<ManagedEnvironment>::new(
                        provider.clone(),
                        container_apps::rules(deps)?,
                    )
                    .with_options(options),
                ),
                ServiceKind::FrontDoor => Box::new(
                    ResourceAnalyzer::<FrontDoorProfile>::new(
                        provider.clone(),
                        front_door::rules(deps)?,
                    )
                    .with_options(options),
                ),
            };
            analyzers.push(analyzer);
        }

        Ok(Self::new(analyzers))
    }

    pub fn services(&self) -> Vec<ServiceKind> {
        self.analyzers.iter().map(|a| a.service()).collect()
    }

    /// Rule metadata of every registered analyzer, in registration order.
    pub fn list_rules(&self) -> Vec<(ServiceKind, RuleMetadata)> {
        self.analyzers
            .iter()
            .flat_map(|a| a.rules().into_iter().map(move |m| (a.service(), m)))
            .collect()
    }

    /// Review every resource group in order. The first failure aborts the
    /// scan and nothing is returned.
    pub fn run(
        &self,
        subscription_id: &str,
        resource_groups: &[String],
        ctx: &ScanContext,
    ) -> Result<ServiceReview> {
        let mut all = ServiceReview::default();

        for resource_group in resource_groups {
            tracing::info!(
                subscription_id,
                resource_group = %resource_group,
                analyzers = self.analyzers.len(),
                "scanning resource group"
            );
            let reviews = if self.parallel {
                self.review_parallel(subscription_id, resource_group, ctx)
            } else {
                self.review_sequential(subscription_id, resource_group, ctx)
            }?;
            for review in reviews {
                all.extend(review);
            }
        }

        tracing::info!(
            rows = all.rows.len(),
            violations = all.violations.len(),
            diagnostics_cached = ctx.diagnostics().cached(),
            "scan complete"
        );
        Ok(all)
    }

    fn review_sequential(
        &self,
        subscription_id: &str,
        resource_group: &str,
        ctx: &ScanContext,
    ) -> Result<Vec<ServiceReview>> {
        self.analyzers
            .iter()
            .map(|a| {
                a.review(subscription_id, resource_group, ctx)
                    .map_err(|e| PostureError::review(a.service(), resource_group, e))
            })
            .collect()
    }

    fn review_parallel(
        &self,
        subscription_id: &str,
        resource_group: &str,
        ctx: &ScanContext,
    ) -> Result<Vec<ServiceReview>> {
        std::thread::scope(|scope| {
            let handles: Vec<_> = self
                .analyzers
                .iter()
                .map(|a| {
                    let task = scope.spawn(move || a.review(subscription_id, resource_group, ctx));
                    (a.service(), task)
                })
                .collect();

            let mut reviews = Vec::with_capacity(handles.len());
            for (service, handle) in handles {
                let review = handle
                    .join()
                    .map_err(|_| panicked(service))?
                    .map_err(|e| PostureError::review(service, resource_group, e))?;
                reviews.push(review);
            }
            Ok(reviews)
        })
    }
}

fn panicked(service: ServiceKind) -> PostureError {
    PostureError::Internal(format!("{service} analyzer panicked"))
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;
    use crate::context::fakes::empty_context;
    use crate::lister::Snapshot;
    use crate::rules::builtin::catalog;
    use crate::rules::LocalAuthMode;

    const AKS: &str = "Microsoft.ContainerService/managedClusters";
    const SITE: &str = "Microsoft.Web/sites";
    const PLAN: &str = "Microsoft.Web/serverFarms";
    const SIGNALR: &str = "Microsoft.SignalRService/SignalR";

    fn write(dir: &Path, rel: &str, content: &str) {
        let path = dir.join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }

    fn resource(rg: &str, provider: &str, name: &str, extra: &str) -> String {
        format!(
            r#"{{ "id": "/subscriptions/sub/resourceGroups/{rg}/providers/{provider}/{name}",
                  "name": "{name}", "type": "{provider}" {extra} }}"#
        )
    }

    fn page(items: &[String]) -> String {
        format!(r#"{{ "value": [{}] }}"#, items.join(","))
    }

    fn fixture() -> TempDir {
        let dir = TempDir::new().unwrap();
        let rg_a = [
            resource("rg-a", AKS, "aks-a", ""),
            resource("rg-a", SITE, "app-a", r#", "kind": "app""#),
            resource("rg-a", SITE, "func-a", r#", "kind": "functionapp""#),
        ];
        let premium = r#", "sku": { "name": "Premium_P1" }"#;
        let p1v3 = r#", "sku": { "name": "P1v3", "tier": "PremiumV3" }"#;
        let rg_b = [
            resource("rg-b", SIGNALR, "sigr-b", premium),
            resource("rg-b", PLAN, "asp-b", p1v3),
        ];
        write(dir.path(), "rg-a/page1.json", &page(&rg_a));
        write(dir.path(), "rg-b/page1.json", &page(&rg_b));
        dir
    }

    fn scanner(root: &Path, ctx: &ScanContext, parallel: bool) -> Scanner {
        let snapshot = Arc::new(Snapshot::open(root).unwrap());
        let deps = RuleDeps::from_context(ctx, LocalAuthMode::Literal);
        let options = EvaluationOptions::default();
        Scanner::for_services(snapshot, &ServiceKind::ALL, &deps, options)
            .unwrap()
            .parallel(parallel)
    }

    fn scan(root: &Path, groups: &[String], parallel: bool) -> Result<ServiceReview> {
        let ctx = empty_context();
        scanner(root, &ctx, parallel).run("sub", groups, &ctx)
    }

    fn groups() -> Vec<String> {
        vec!["rg-a".to_string(), "rg-b".to_string()]
    }

    #[test]
    fn rows_follow_group_then_registration_order() {
        let dir = fixture();
        let review = scan(dir.path(), &groups(), false).unwrap();

        let names: Vec<&str> = review
            .rows
            .iter()
            .map(|r| r.service_name.as_str())
            .collect();
        assert_eq!(names, vec!["aks-a", "app-a", "func-a", "asp-b", "sigr-b"]);
        assert!(review.rows.iter().all(|r| r.subscription_id == "sub"));
        assert_eq!(review.rows[4].sla, "99.9%");
        assert!(review.rows[4].availability_zones);
    }

    #[test]
    fn parallel_matches_sequential() {
        let dir = fixture();
        let sequential = scan(dir.path(), &groups(), false).unwrap();
        let parallel = scan(dir.path(), &groups(), true).unwrap();
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn missing_group_fails_whole_scan() {
        let dir = fixture();
        let groups = vec!["rg-a".to_string(), "rg-missing".to_string()];

        for parallel in [false, true] {
            let err = scan(dir.path(), &groups, parallel).unwrap_err();
            match err {
                PostureError::Review {
                    service,
                    resource_group,
                    source,
                } => {
                    assert_eq!(service, ServiceKind::Aks);
                    assert_eq!(resource_group, "rg-missing");
                    assert!(matches!(*source, PostureError::Listing { .. }));
                }
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    #[test]
    fn repeated_services_registered_once() {
        let dir = fixture();
        let snapshot = Arc::new(Snapshot::open(dir.path()).unwrap());
        let deps = RuleDeps::detached(LocalAuthMode::Literal);
        let options = EvaluationOptions::default();
        let services = [ServiceKind::Aks, ServiceKind::SignalR, ServiceKind::Aks];
        let scanner = Scanner::for_services(snapshot, &services, &deps, options).unwrap();
        assert_eq!(
            scanner.services(),
            vec![ServiceKind::Aks, ServiceKind::SignalR]
        );
    }

    #[test]
    fn list_rules_matches_catalog() {
        let dir = fixture();
        let ctx = empty_context();
        let listed = scanner(dir.path(), &ctx, false).list_rules();
        assert_eq!(listed, catalog(LocalAuthMode::Literal).unwrap());
    }
}
