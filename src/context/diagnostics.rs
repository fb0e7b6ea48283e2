use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use once_cell::sync::OnceCell;

use crate::error::{PostureError, Result};

/// Remote capability answering whether a resource has diagnostic settings.
pub trait DiagnosticsLookup: Send + Sync {
    fn has_diagnostics(&self, resource_id: &str) -> Result<bool>;
}

/// Memoizing front for a [`DiagnosticsLookup`].
///
/// Each resource id costs at most one remote call no matter how many rules
/// ask for it. Concurrent callers for the same id wait on a shared cell
/// instead of issuing their own lookup. A failed lookup is not cached.
pub struct DiagnosticsSettings {
    lookup: Arc<dyn DiagnosticsLookup>,
    cache: Mutex<HashMap<String, Arc<OnceCell<bool>>>>,
}

impl DiagnosticsSettings {
    pub fn new(lookup: Arc<dyn DiagnosticsLookup>) -> Self {
        Self {
            lookup,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn has_diagnostics(&self, resource_id: &str) -> Result<bool> {
        let cell = {
            let mut cache = self
                .cache
                .lock()
                .map_err(|_| PostureError::Internal("diagnostics cache lock poisoned".into()))?;
            Arc::clone(cache.entry(resource_id.to_lowercase()).or_default())
        };

        cell.get_or_try_init(|| {
            tracing::debug!(resource_id, "looking up diagnostic settings");
            self.lookup.has_diagnostics(resource_id)
        })
        .copied()
    }

    /// Number of resource ids with a settled answer.
    pub fn cached(&self) -> usize {
        self.cache
            .lock()
            .map(|cache| cache.values().filter(|cell| cell.get().is_some()).count())
            .unwrap_or(0)
    }
}

/// Lookup used when no diagnostics backend is wired, e.g. to list rules.
pub struct Unconfigured;

impl DiagnosticsLookup for Unconfigured {
    fn has_diagnostics(&self, resource_id: &str) -> Result<bool> {
        Err(PostureError::Diagnostics {
            resource_id: resource_id.to_string(),
            message: "no diagnostics backend configured".into(),
        })
    }
}
