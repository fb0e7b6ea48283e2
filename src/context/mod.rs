//! Per-scan lookup state shared read-only by every rule evaluation.

pub mod diagnostics;

use std::collections::HashSet;
use std::sync::Arc;

use crate::error::Result;

pub use diagnostics::{DiagnosticsLookup, DiagnosticsSettings, Unconfigured};

/// Source of private endpoint connections across the scanned scope.
pub trait PrivateEndpointSource: Send + Sync {
    /// Resource ids targeted by at least one private endpoint connection.
    fn private_endpoint_targets(&self) -> Result<Vec<String>>;
}

/// Set of resource ids reachable through a private endpoint.
///
/// ARM ids are case-insensitive, so membership is too.
#[derive(Debug, Clone, Default)]
pub struct PrivateEndpointIndex {
    targets: HashSet<String>,
}

impl PrivateEndpointIndex {
    pub fn from_targets<I, S>(targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            targets: targets
                .into_iter()
                .map(|t| t.as_ref().to_lowercase())
                .collect(),
        }
    }

    pub fn contains(&self, resource_id: &str) -> bool {
        self.targets.contains(&resource_id.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// Lookup tables built once before any analyzer runs.
pub struct ScanContext {
    private_endpoints: PrivateEndpointIndex,
    diagnostics: Arc<DiagnosticsSettings>,
}

impl ScanContext {
    pub fn new(
        private_endpoints: PrivateEndpointIndex,
        diagnostics: Arc<DiagnosticsSettings>,
    ) -> Self {
        Self {
            private_endpoints,
            diagnostics,
        }
    }

    /// Query private endpoints and wrap the diagnostics backend in a cache.
    /// Any failure here aborts the scan.
    pub fn build(
        endpoints: &dyn PrivateEndpointSource,
        diagnostics: Arc<dyn DiagnosticsLookup>,
    ) -> Result<Self> {
        let targets = endpoints.private_endpoint_targets()?;
        let index = PrivateEndpointIndex::from_targets(targets);
        tracing::info!(targets = index.len(), "indexed private endpoints");

        Ok(Self::new(index, Arc::new(DiagnosticsSettings::new(diagnostics))))
    }

    pub fn private_endpoints(&self) -> &PrivateEndpointIndex {
        &self.private_endpoints
    }

    pub fn diagnostics(&self) -> &Arc<DiagnosticsSettings> {
        &self.diagnostics
    }
}


#[cfg(test)]
mod tests {
    use super::fakes::*;
    use super::*;

    #[test]
    fn index_is_case_insensitive() {
        let index = PrivateEndpointIndex::from_targets(["/subscriptions/S/resourceGroups/RG/app"]);
        assert!(index.contains("/subscriptions/s/resourcegroups/rg/app"));
        assert!(!index.contains("/subscriptions/s/resourcegroups/rg/other"));
    }

    #[test]
    fn build_indexes_endpoint_targets() {
        let source = StaticEndpoints(vec!["a".into(), "b".into(), "A".into()]);
        let ctx = ScanContext::build(&source, Arc::new(CountingDiagnostics::default())).unwrap();
        assert_eq!(ctx.private_endpoints().len(), 2);
        assert!(ctx.private_endpoints().contains("b"));
    }

    #[test]
    fn build_fails_when_endpoint_listing_fails() {
        let result = ScanContext::build(&BrokenEndpoints, Arc::new(CountingDiagnostics::default()));
        assert!(result.is_err());
    }
}
