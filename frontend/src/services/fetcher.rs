//! Cache-aware availability fetching with cooperative cancellation.

use shared::NormalizedAvailability;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::AbortHandle;

use super::api::{AvailabilityApi, AvailabilityQuery};
use super::cache::AvailabilityCache;
use super::config::{AvailabilityConfig, BusinessHours};
use super::error::FetchError;
use super::normalize::normalize_response;

/// Cooperative cancellation flag shared between a fetch and its owner
#[derive(Debug, Clone, Default)]
pub struct CancelSignal(Arc<AtomicBool>);

impl CancelSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Handle to one in-flight fetch.
///
/// The owner keeps at most one of these and calls [`FetchHandle::cancel`]
/// before starting the next fetch.
#[derive(Debug)]
pub struct FetchHandle {
    id: u64,
    signal: CancelSignal,
    task: Option<AbortHandle>,
}

impl FetchHandle {
    pub fn new(id: u64, signal: CancelSignal, task: Option<AbortHandle>) -> Self {
        Self { id, signal, task }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Stop caring about the result and abort the transport when possible
    pub fn cancel(&self) {
        self.signal.cancel();
        if let Some(task) = &self.task {
            task.abort();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.signal.is_cancelled()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchOptions {
    /// Skip the cache read and do not store the result
    pub bypass_cache: bool,
}

/// Serves availability from the cache or the network, normalized
#[derive(Clone)]
pub struct AvailabilityFetcher {
    api: Arc<dyn AvailabilityApi>,
    cache: Arc<dyn AvailabilityCache>,
    hours: BusinessHours,
    timeout: Duration,
}

impl AvailabilityFetcher {
    pub fn new(
        api: Arc<dyn AvailabilityApi>,
        cache: Arc<dyn AvailabilityCache>,
        config: &AvailabilityConfig,
    ) -> Self {
        Self {
            api,
            cache,
            hours: config.business_hours.clone(),
            timeout: config.api.request_timeout(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn cache(&self) -> &Arc<dyn AvailabilityCache> {
        &self.cache
    }

    pub fn business_hours(&self) -> &BusinessHours {
        &self.hours
    }

    /// Synchronous cache lookup, no network involved
    pub fn cached(&self, query: &AvailabilityQuery) -> Option<NormalizedAvailability> {
        self.cache.get(&query.cache_key())
    }

    pub fn invalidate(&self, query: &AvailabilityQuery) {
        self.cache.invalidate(&query.cache_key());
    }

    pub async fn fetch(
        &self,
        query: &AvailabilityQuery,
        options: FetchOptions,
        signal: &CancelSignal,
    ) -> Result<NormalizedAvailability, FetchError> {
        if !options.bypass_cache {
            if let Some(hit) = self.cached(query) {
                tracing::debug!(key = %query.cache_key(), "availability served from cache");
                return Ok(hit);
            }
        }

        if signal.is_cancelled() {
            return Err(FetchError::Cancelled);
        }

        let body = match tokio::time::timeout(self.timeout, self.api.get_availability(query)).await {
            Ok(result) => result?,
            Err(_) => return Err(FetchError::Timeout(self.timeout)),
        };

        if signal.is_cancelled() {
            return Err(FetchError::Cancelled);
        }

        let normalized = normalize_response(body, query.view_mode, query.resource_type, &self.hours)?;

        if !options.bypass_cache {
            self.cache.set(query.cache_key(), normalized.clone());
        }
        Ok(normalized)
    }
}
