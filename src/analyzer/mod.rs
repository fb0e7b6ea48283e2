//! Per-type analyzers: list resources, evaluate a rule set, and fold the
//! outcomes into summary rows and violation records.

pub mod result;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::context::ScanContext;
use crate::error::Result;
use crate::lister::{drain, ResourceLister};
use crate::resource::{AzureResource, ServiceKind};
use crate::rules::{RuleMetadata, RuleSet, RuleViolation, StructuralKey};

pub use result::{AzureServiceResult, ServiceReview};

/// What to do when a diagnostic settings lookup fails mid-review.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticsErrorMode {
    /// Fail the review and with it the scan.
    #[default]
    Abort,
    /// Record the row's diagnostics as unknown and keep going.
    Degrade,
}

/// Knobs that change how outcomes are recorded, not how rules evaluate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvaluationOptions {
    pub on_diagnostics_error: DiagnosticsErrorMode,
    /// Keep passing non-structural outcomes as violation records.
    pub include_passed: bool,
}

/// Object-safe face of an analyzer, so the scanner can hold every resource
/// type in one list.
pub trait ServiceAnalyzer: Send + Sync {
    fn service(&self) -> ServiceKind;

    /// Metadata for every rule this analyzer evaluates, ordered by id.
    fn rules(&self) -> Vec<RuleMetadata>;

    fn review(
        &self,
        subscription_id: &str,
        resource_group: &str,
        ctx: &ScanContext,
    ) -> Result<ServiceReview>;
}

/// Analyzer bound to one resource model.
pub struct ResourceAnalyzer<R> {
    service: ServiceKind,
    lister: Arc<dyn ResourceLister<R>>,
    rules: RuleSet<R>,
    filter: Option<fn(&R) -> bool>,
    options: EvaluationOptions,
}

impl<R: AzureResource> ResourceAnalyzer<R> {
    pub fn new(lister: Arc<dyn ResourceLister<R>>, rules: RuleSet<R>) -> Self {
        Self {
            service: rules.service(),
            lister,
            rules,
            filter: None,
            options: EvaluationOptions::default(),
        }
    }

    /// Only review resources the predicate accepts. Used to split web apps
    /// from function apps, which share one listing.
    pub fn with_filter(mut self, filter: fn(&R) -> bool) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_options(mut self, options: EvaluationOptions) -> Self {
        self.options = options;
        self
    }

    fn evaluate(
        &self,
        subscription_id: &str,
        resource_group: &str,
        resource: &R,
        ctx: &ScanContext,
        review: &mut ServiceReview,
    ) -> Result<()> {
        let mut row = AzureServiceResult::new(subscription_id, resource_group, resource);
        let degrade = self.options.on_diagnostics_error == DiagnosticsErrorMode::Degrade;

        for (key, rule) in self.rules.iter() {
            let structural = StructuralKey::parse(key);
            let degradable = degrade && structural == Some(StructuralKey::DiagnosticSettings);
            let outcome = match rule.eval(resource, ctx) {
                Ok(outcome) => outcome,
                Err(e) if degradable && e.is_diagnostics() => {
                    tracing::warn!(
                        service = %self.service,
                        resource_id = resource.id(),
                        error = %e,
                        "diagnostic settings unknown, continuing"
                    );
                    row.diagnostic_settings = None;
                    continue;
                }
                Err(e) => return Err(e),
            };

            match structural {
                Some(field) => row.fold(field, &outcome),
                None if outcome.broken || self.options.include_passed => {
                    review.violations.push(RuleViolation::new(
                        &rule.metadata,
                        self.service,
                        resource.id(),
                        resource.name(),
                        outcome.broken,
                        outcome.value,
                    ));
                }
                None => {}
            }
        }

        review.rows.push(row);
        Ok(())
    }
}

impl<R: AzureResource> ServiceAnalyzer for ResourceAnalyzer<R> {
    fn service(&self) -> ServiceKind {
        self.service
    }

    fn rules(&self) -> Vec<RuleMetadata> {
        self.rules.metadata()
    }

    fn review(
        &self,
        subscription_id: &str,
        resource_group: &str,
        ctx: &ScanContext,
    ) -> Result<ServiceReview> {
        let resources = drain(self.lister.list_by_resource_group(resource_group))?;

        let mut out = ServiceReview::default();
        for resource in &resources {
            if self.filter.is_some_and(|keep| !keep(resource)) {
                continue;
            }
            self.evaluate(subscription_id, resource_group, resource, ctx, &mut out)?;
        }

        tracing::info!(
            service = %self.service,
            resource_group,
            resources = out.rows.len(),
            violations = out.violations.len(),
            "service reviewed"
        );
        Ok(out)
    }
}
