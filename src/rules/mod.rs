pub mod builtin;
pub mod finding;
pub mod policy;

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::context::{DiagnosticsSettings, ScanContext};
use crate::error::{PostureError, Result};
use crate::resource::ServiceKind;

pub use finding::{RuleMetadata, RuleViolation, Severity};

/// Rule keys that shape the summary row instead of producing violations.
pub mod keys {
    pub const DIAGNOSTIC_SETTINGS: &str = "DiagnosticSettings";
    pub const AVAILABILITY_ZONES: &str = "AvailabilityZones";
    pub const SLA: &str = "SLA";
    pub const PRIVATE: &str = "Private";
    pub const SKU: &str = "SKU";
    pub const CAF: &str = "CAF";
}

/// Row field a structural rule folds into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructuralKey {
    DiagnosticSettings,
    AvailabilityZones,
    Sla,
    Private,
    Sku,
    Caf,
}

impl StructuralKey {
    pub fn parse(key: &str) -> Option<Self> {
        match key {
            keys::DIAGNOSTIC_SETTINGS => Some(Self::DiagnosticSettings),
            keys::AVAILABILITY_ZONES => Some(Self::AvailabilityZones),
            keys::SLA => Some(Self::Sla),
            keys::PRIVATE => Some(Self::Private),
            keys::SKU => Some(Self::Sku),
            keys::CAF => Some(Self::Caf),
            _ => None,
        }
    }
}

/// Verdict of a single rule against a single resource.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outcome {
    pub broken: bool,
    pub value: String,
}

impl Outcome {
    pub fn broken(broken: bool) -> Self {
        Self {
            broken,
            value: String::new(),
        }
    }

    pub fn with_value(broken: bool, value: impl Into<String>) -> Self {
        Self {
            broken,
            value: value.into(),
        }
    }
}

/// The predicate half of a rule. Implementations hold whatever capability
/// they need and must not mutate the resource or the context.
pub trait Check<R>: Send + Sync {
    fn eval(&self, resource: &R, ctx: &ScanContext) -> Result<Outcome>;
}

/// A check that needs nothing beyond the resource and the context.
pub struct Predicate<R>(pub fn(&R, &ScanContext) -> Outcome);

impl<R> Check<R> for Predicate<R> {
    fn eval(&self, resource: &R, ctx: &ScanContext) -> Result<Outcome> {
        Ok((self.0)(resource, ctx))
    }
}

/// A named check with its reporting metadata.
pub struct Rule<R> {
    pub metadata: RuleMetadata,
    check: Box<dyn Check<R>>,
}

impl<R> Rule<R> {
    pub fn new(metadata: RuleMetadata, check: impl Check<R> + 'static) -> Self {
        Self {
            metadata,
            check: Box::new(check),
        }
    }

    pub fn predicate(metadata: RuleMetadata, f: fn(&R, &ScanContext) -> Outcome) -> Self
    where
        R: 'static,
    {
        Self::new(metadata, Predicate(f))
    }

    pub fn id(&self) -> &str {
        &self.metadata.id
    }

    pub fn eval(&self, resource: &R, ctx: &ScanContext) -> Result<Outcome> {
        self.check.eval(resource, ctx)
    }
}

/// The fixed collection of rules bound to one resource type, keyed by the
/// lookup handle. Keys and ids are both unique.
pub struct RuleSet<R> {
    service: ServiceKind,
    rules: BTreeMap<String, Rule<R>>,
}

impl<R> RuleSet<R> {
    pub fn new(service: ServiceKind) -> Self {
        Self {
            service,
            rules: BTreeMap::new(),
        }
    }

    pub fn register(&mut self, key: &str, rule: Rule<R>) -> Result<()> {
        let same_id = self.rules.values().any(|r| r.id() == rule.id());
        if same_id || self.rules.contains_key(key) {
            return Err(PostureError::DuplicateRule {
                rule_set: self.service,
                id: rule.id().to_string(),
            });
        }
        self.rules.insert(key.to_string(), rule);
        Ok(())
    }

    /// Builder-style registration for declarative tables.
    pub fn with(mut self, key: &str, rule: Rule<R>) -> Result<Self> {
        self.register(key, rule)?;
        Ok(self)
    }

    pub fn service(&self) -> ServiceKind {
        self.service
    }

    pub fn get(&self, key: &str) -> Option<&Rule<R>> {
        self.rules.get(key)
    }

    pub fn rules(&self) -> &BTreeMap<String, Rule<R>> {
        &self.rules
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Rule<R>)> {
        self.rules.iter().map(|(k, r)| (k.as_str(), r))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Metadata for every rule, ordered by id.
    pub fn metadata(&self) -> Vec<RuleMetadata> {
        let mut all: Vec<RuleMetadata> = self.rules.values().map(|r| r.metadata.clone()).collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        all
    }
}

/// How evh-008 reads the `disableLocalAuth` flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocalAuthMode {
    /// Broken only when the flag is present and false; an absent flag passes.
    #[default]
    Literal,
    /// Broken unless the flag is present and true.
    Strict,
}

impl LocalAuthMode {
    pub fn is_broken(&self, disable_local_auth: Option<bool>) -> bool {
        match self {
            Self::Literal => disable_local_auth.is_some_and(|disabled| !disabled),
            Self::Strict => !disable_local_auth.unwrap_or(false),
        }
    }
}

/// Capabilities handed to rule set constructors.
#[derive(Clone)]
pub struct RuleDeps {
    pub diagnostics: Arc<DiagnosticsSettings>,
    pub local_auth: LocalAuthMode,
}

impl RuleDeps {
    pub fn new(diagnostics: Arc<DiagnosticsSettings>, local_auth: LocalAuthMode) -> Self {
        Self {
            diagnostics,
            local_auth,
        }
    }

    pub fn from_context(ctx: &ScanContext, local_auth: LocalAuthMode) -> Self {
        Self::new(Arc::clone(ctx.diagnostics()), local_auth)
    }

    /// Deps with no diagnostics backend; enough to enumerate metadata.
    pub fn detached(local_auth: LocalAuthMode) -> Self {
        Self::new(
            Arc::new(DiagnosticsSettings::new(Arc::new(crate::context::Unconfigured))),
            local_auth,
        )
    }
}
