//! On-demand detail resolution with per-id request coalescing.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use dine_map_models::DetailedResult;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};

use crate::EngineError;
use crate::providers::PlaceSearchService;

type PendingResolve = Shared<BoxFuture<'static, Result<DetailedResult, EngineError>>>;

/// Resolves a lightweight entry id into a [`DetailedResult`].
///
/// At most one provider request is in flight per id: a second caller
/// arriving before the first completes attaches to the same pending
/// future and receives the same outcome. Successes are cached for the
/// lifetime of the current result set; [`Self::invalidate_all`] drops
/// the cache (and interest in any pending work) when the result set is
/// replaced.
pub struct DetailResolver {
    search: Arc<dyn PlaceSearchService>,
    cache: Mutex<HashMap<String, DetailedResult>>,
    pending: Mutex<HashMap<String, PendingResolve>>,
}

impl DetailResolver {
    /// Creates a resolver over a place search capability.
    #[must_use]
    pub fn new(search: Arc<dyn PlaceSearchService>) -> Self {
        Self {
            search,
            cache: Mutex::new(HashMap::new()),
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Resolves the full detail record for `id`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] when the id matches no place,
    /// or [`EngineError::ProviderUnavailable`] on backend failure.
    /// Failures are not cached; a later call retries.
    pub async fn resolve(&self, id: &str) -> Result<DetailedResult, EngineError> {
        if let Some(hit) = lock(&self.cache).get(id).cloned() {
            log::trace!("Detail cache hit for {id}");
            return Ok(hit);
        }

        let fut = {
            let mut pending = lock(&self.pending);
            if let Some(existing) = pending.get(id) {
                log::debug!("Attaching to in-flight detail request for {id}");
                existing.clone()
            } else {
                let search = Arc::clone(&self.search);
                let owned_id = id.to_string();
                let fut = async move { search.get_details(&owned_id).await }
                    .boxed()
                    .shared();
                pending.insert(id.to_string(), fut.clone());
                fut
            }
        };

        let result = fut.await;
        lock(&self.pending).remove(id);
        if let Ok(detail) = &result {
            lock(&self.cache).insert(id.to_string(), detail.clone());
        }
        result
    }

    /// Drops every cached detail and forgets pending interest; called
    /// when the result set is replaced wholesale.
    pub fn invalidate_all(&self) {
        lock(&self.cache).clear();
        lock(&self.pending).clear();
    }

    /// Number of cached detail records.
    #[must_use]
    pub fn cached_count(&self) -> usize {
        lock(&self.cache).len()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use dine_map_models::{Coordinate, ResultEntry};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    /// A detail backend that blocks until released, counting calls.
    struct GatedSearch {
        calls: AtomicUsize,
        gate: Notify,
        missing: bool,
    }

    impl GatedSearch {
        fn new(missing: bool) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                gate: Notify::new(),
                missing,
            })
        }
    }

    #[async_trait]
    impl PlaceSearchService for GatedSearch {
        async fn text_search(
            &self,
            _query: &str,
            _anchor: Coordinate,
            _radius_meters: u32,
        ) -> Result<Vec<ResultEntry>, EngineError> {
            unimplemented!("not used by these tests")
        }

        async fn get_details(&self, id: &str) -> Result<DetailedResult, EngineError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.gate.notified().await;
            if self.missing {
                return Err(EngineError::NotFound);
            }
            let mut entry = ResultEntry::new(id, "Resolved");
            entry.coordinates = Some(Coordinate::new(42.36, -71.06));
            Ok(DetailedResult::from_entry(entry))
        }
    }

    #[tokio::test]
    async fn concurrent_resolves_issue_one_provider_call() {
        let search = GatedSearch::new(false);
        let resolver = Arc::new(DetailResolver::new(
            Arc::clone(&search) as Arc<dyn PlaceSearchService>
        ));

        let first = tokio::spawn({
            let resolver = Arc::clone(&resolver);
            async move { resolver.resolve("p1").await }
        });
        let second = tokio::spawn({
            let resolver = Arc::clone(&resolver);
            async move { resolver.resolve("p1").await }
        });

        // Let both callers attach before releasing the backend.
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        search.gate.notify_waiters();

        let (a, b) = (first.await.unwrap(), second.await.unwrap());
        assert!(a.is_ok() && b.is_ok());
        assert_eq!(search.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn cache_serves_repeat_resolves() {
        let search = GatedSearch::new(false);
        let resolver = DetailResolver::new(Arc::clone(&search) as Arc<dyn PlaceSearchService>);

        search.gate.notify_one();
        resolver.resolve("p1").await.unwrap();
        // No gate release needed: the second call never reaches the
        // backend.
        resolver.resolve("p1").await.unwrap();
        assert_eq!(search.calls.load(Ordering::SeqCst), 1);
        assert_eq!(resolver.cached_count(), 1);
    }

    #[tokio::test]
    async fn invalidate_forces_refetch() {
        let search = GatedSearch::new(false);
        let resolver = DetailResolver::new(Arc::clone(&search) as Arc<dyn PlaceSearchService>);

        search.gate.notify_one();
        resolver.resolve("p1").await.unwrap();
        resolver.invalidate_all();
        assert_eq!(resolver.cached_count(), 0);

        search.gate.notify_one();
        resolver.resolve("p1").await.unwrap();
        assert_eq!(search.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn not_found_is_surfaced_and_not_cached() {
        let search = GatedSearch::new(true);
        let resolver = DetailResolver::new(Arc::clone(&search) as Arc<dyn PlaceSearchService>);

        search.gate.notify_one();
        let err = resolver.resolve("ghost").await.unwrap_err();
        assert_eq!(err, EngineError::NotFound);
        assert_eq!(resolver.cached_count(), 0);
    }
}
