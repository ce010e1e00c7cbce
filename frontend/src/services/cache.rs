//! In-memory cache of normalized availability.
//!
//! No TTL and no eviction: entries live until they are invalidated or the
//! cache is cleared. A session only ever touches a handful of keys.

use chrono::NaiveDate;
use shared::{NormalizedAvailability, ResourceType, ViewMode};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard};

use super::date_utils::format_date;

/// Identity of one availability payload; every field takes part in equality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub resource_id: i64,
    pub date: NaiveDate,
    pub view_mode: ViewMode,
    pub resource_type: ResourceType,
}

impl CacheKey {
    pub fn new(resource_id: i64, date: NaiveDate, view_mode: ViewMode, resource_type: ResourceType) -> Self {
        Self {
            resource_id,
            date,
            view_mode,
            resource_type,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}|{}|{}|{}",
            self.resource_id,
            format_date(self.date),
            self.view_mode,
            self.resource_type
        )
    }
}

/// Storage used by the fetcher, injectable so tests can seed or disable it
pub trait AvailabilityCache: Send + Sync {
    fn get(&self, key: &CacheKey) -> Option<NormalizedAvailability>;
    fn set(&self, key: CacheKey, value: NormalizedAvailability);
    fn invalidate(&self, key: &CacheKey);
    fn clear(&self);
}

/// Last-write-wins map shared between every controller of a page session
#[derive(Debug, Default)]
pub struct InMemoryAvailabilityCache {
    entries: Mutex<HashMap<CacheKey, NormalizedAvailability>>,
}

impl InMemoryAvailabilityCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<CacheKey, NormalizedAvailability>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl AvailabilityCache for InMemoryAvailabilityCache {
    fn get(&self, key: &CacheKey) -> Option<NormalizedAvailability> {
        self.entries().get(key).cloned()
    }

    fn set(&self, key: CacheKey, value: NormalizedAvailability) {
        tracing::trace!(key = %key, "cache set");
        self.entries().insert(key, value);
    }

    fn invalidate(&self, key: &CacheKey) {
        if self.entries().remove(key).is_some() {
            tracing::debug!(key = %key, "cache entry invalidated");
        }
    }

    fn clear(&self) {
        self.entries().clear();
    }
}

/// Cache that never stores anything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopAvailabilityCache;

impl AvailabilityCache for NoopAvailabilityCache {
    fn get(&self, _key: &CacheKey) -> Option<NormalizedAvailability> {
        None
    }

    fn set(&self, _key: CacheKey, _value: NormalizedAvailability) {}

    fn invalidate(&self, _key: &CacheKey) {}

    fn clear(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::TimeSlot;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn payload(marker: &str) -> NormalizedAvailability {
        let mut data = NormalizedAvailability::empty(ResourceType::Common);
        data.slots.push(TimeSlot::new(marker, "09:00", true));
        data
    }

    #[test]
    fn test_keys_differing_in_any_component_are_distinct() {
        let cache = InMemoryAvailabilityCache::new();
        let base = CacheKey::new(1, date(10), ViewMode::Day, ResourceType::Common);
        cache.set(base, payload("base"));

        let variants = [
            CacheKey { resource_id: 2, ..base },
            CacheKey { date: date(11), ..base },
            CacheKey { view_mode: ViewMode::Week, ..base },
            CacheKey { view_mode: ViewMode::Month, ..base },
            CacheKey { resource_type: ResourceType::Coworking, ..base },
        ];
        for key in variants {
            assert!(cache.get(&key).is_none(), "{} should miss", key);
        }
        assert_eq!(cache.get(&CacheKey::new(1, date(10), ViewMode::Day, ResourceType::Common)), Some(payload("base")));
    }

    #[test]
    fn test_last_write_wins_and_invalidate() {
        let cache = InMemoryAvailabilityCache::new();
        let key = CacheKey::new(1, date(10), ViewMode::Day, ResourceType::Common);
        cache.set(key, payload("first"));
        cache.set(key, payload("second"));
        assert_eq!(cache.get(&key), Some(payload("second")));
        assert_eq!(cache.len(), 1);

        cache.invalidate(&key);
        assert!(cache.get(&key).is_none());
        // Invalidating twice is harmless
        cache.invalidate(&key);
    }

    #[test]
    fn test_clear_drops_everything() {
        let cache = InMemoryAvailabilityCache::new();
        for d in 1..=5 {
            cache.set(CacheKey::new(1, date(d), ViewMode::Day, ResourceType::Common), payload("x"));
        }
        assert_eq!(cache.len(), 5);
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_key_display() {
        let key = CacheKey::new(4, date(3), ViewMode::Month, ResourceType::Coworking);
        assert_eq!(key.to_string(), "4|2024-06-03|month|coworking");
    }

    #[test]
    fn test_noop_cache_never_returns() {
        let cache = NoopAvailabilityCache;
        let key = CacheKey::new(1, date(1), ViewMode::Day, ResourceType::Common);
        cache.set(key, payload("x"));
        assert!(cache.get(&key).is_none());
    }
}
