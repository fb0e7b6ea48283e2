//! Resource listing capabilities consumed by the analyzers.

pub mod snapshot;

use crate::error::Result;
use crate::resource::{
    AppServicePlan, EventHubNamespace, FrontDoorProfile, ManagedCluster, ManagedEnvironment,
    SignalR, Site,
};

pub use snapshot::Snapshot;

/// A lazy, finite sequence of result pages. Each call to
/// [`ResourceLister::list_by_resource_group`] starts a fresh sequence.
pub type Pages<'a, R> = Box<dyn Iterator<Item = Result<Vec<R>>> + 'a>;

/// Lists every resource of type `R` in a resource group, page by page.
/// Remote errors surface unchanged.
pub trait ResourceLister<R>: Send + Sync {
    fn list_by_resource_group<'a>(&'a self, resource_group: &str) -> Pages<'a, R>;
}

/// Collect every page, or fail with the first page error. Nothing is
/// returned from a partially read listing.
pub fn drain<R>(pages: Pages<'_, R>) -> Result<Vec<R>> {
    let mut all = Vec::new();
    for page in pages {
        all.extend(page?);
    }
    Ok(all)
}

/// A backend that can list every resource type the scanner reviews.
pub trait ResourceProvider:
    ResourceLister<ManagedCluster>
    + ResourceLister<AppServicePlan>
    + ResourceLister<Site>
    + ResourceLister<EventHubNamespace>
    + ResourceLister<SignalR>
    + ResourceLister<ManagedEnvironment>
    + ResourceLister<FrontDoorProfile>
{
}

impl<T> ResourceProvider for T where
    T: ResourceLister<ManagedCluster>
        + ResourceLister<AppServicePlan>
        + ResourceLister<Site>
        + ResourceLister<EventHubNamespace>
        + ResourceLister<SignalR>
        + ResourceLister<ManagedEnvironment>
        + ResourceLister<FrontDoorProfile>
{
}


#[cfg(test)]
mod tests {
    use super::fakes::PagedLister;
    use super::*;
    use std::sync::atomic::Ordering;

    #[test]
    fn drain_concatenates_pages() {
        let lister = PagedLister::new(vec![vec![1, 2], vec![], vec![3]]);
        let all = drain(lister.list_by_resource_group("rg")).unwrap();
        assert_eq!(all, vec![1, 2, 3]);
    }

    #[test]
    fn drain_stops_at_failing_page() {
        let lister = PagedLister::new(vec![vec![1], vec![2], vec![3]]).failing_at(1);
        let err = drain(lister.list_by_resource_group("rg")).unwrap_err();
        assert!(err.to_string().contains("page 2"));
        assert_eq!(lister.pages_served.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn listing_is_restartable() {
        let lister = PagedLister::new(vec![vec!["a"], vec!["b"]]);
        for _ in 0..2 {
            let items = drain(lister.list_by_resource_group("rg")).unwrap();
            assert_eq!(items, vec!["a", "b"]);
        }
    }
}
