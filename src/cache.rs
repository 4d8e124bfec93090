//! Read-through cache contract for computed group balances.
//!
//! Keys are group ids. Any write that touches a group's expenses, items,
//! splits, payers, settlements or membership must invalidate that group's
//! entry before the write is reported as done; a stale entry is a wrong
//! answer, not a slow one.

use crate::balance::GroupBalances;
use crate::core::ids::GroupId;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::RwLock;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CacheError {
    #[error("balance cache unavailable: {0}")]
    Unavailable(String),
}

/// Number of invalidations a group has seen.
///
/// Taken before a snapshot is read and handed back to
/// [`BalanceCache::set_if_current`], so a value computed from a snapshot
/// that an invalidation has since superseded is never stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Generation(u64);

/// Storage for computed [`GroupBalances`], shared by all request handlers.
///
/// Implementations must be safe to call from several threads at once.
/// `invalidate` must advance the group's [`Generation`], and
/// `set_if_current` must compare and store under one lock (or one atomic
/// backend operation).
pub trait BalanceCache: Send + Sync {
    fn get(&self, group_id: &GroupId) -> Result<Option<GroupBalances>, CacheError>;

    /// Store unconditionally.
    fn set(&self, group_id: &GroupId, value: GroupBalances, ttl: Duration) -> Result<(), CacheError>;

    /// The group's current generation.
    fn generation(&self, group_id: &GroupId) -> Result<Generation, CacheError>;

    /// Store only if the group has not been invalidated since `generation`
    /// was taken. Returns whether the value was stored.
    fn set_if_current(
        &self,
        group_id: &GroupId,
        value: GroupBalances,
        ttl: Duration,
        generation: Generation,
    ) -> Result<bool, CacheError>;

    fn invalidate(&self, group_id: &GroupId) -> Result<(), CacheError>;
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: GroupBalances,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<GroupId, CacheEntry>,
    generations: HashMap<GroupId, Generation>,
}

impl CacheState {
    fn generation(&self, group_id: &GroupId) -> Generation {
        self.generations.get(group_id).copied().unwrap_or_default()
    }

    fn insert(&mut self, group_id: &GroupId, value: GroupBalances, ttl: Duration) {
        let expires_at = Utc::now()
            .checked_add_signed(ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        self.entries
            .insert(group_id.clone(), CacheEntry { value, expires_at });
    }
}

/// Process-local [`BalanceCache`] with per-entry expiry.
///
/// Expired entries are treated as misses and evicted on the next lookup.
/// Generations are kept per group for the life of the cache.
#[derive(Debug, Default)]
pub struct InMemoryBalanceCache {
    state: RwLock<CacheState>,
}

impl InMemoryBalanceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.state.read().map(|s| s.entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every expired entry. Returns how many were removed.
    pub fn purge_expired(&self) -> Result<usize, CacheError> {
        let now = Utc::now();
        let mut state = self.state.write().map_err(unavailable)?;
        let before = state.entries.len();
        state.entries.retain(|_, entry| entry.expires_at > now);
        Ok(before - state.entries.len())
    }
}

impl BalanceCache for InMemoryBalanceCache {
    fn get(&self, group_id: &GroupId) -> Result<Option<GroupBalances>, CacheError> {
        let now = Utc::now();
        {
            let state = self.state.read().map_err(unavailable)?;
            match state.entries.get(group_id) {
                None => return Ok(None),
                Some(entry) if entry.expires_at > now => return Ok(Some(entry.value.clone())),
                Some(_) => {}
            }
        }

        let mut state = self.state.write().map_err(unavailable)?;
        if state
            .entries
            .get(group_id)
            .is_some_and(|entry| entry.expires_at <= now)
        {
            state.entries.remove(group_id);
        }
        Ok(None)
    }

    fn set(&self, group_id: &GroupId, value: GroupBalances, ttl: Duration) -> Result<(), CacheError> {
        let mut state = self.state.write().map_err(unavailable)?;
        state.insert(group_id, value, ttl);
        Ok(())
    }

    fn generation(&self, group_id: &GroupId) -> Result<Generation, CacheError> {
        let state = self.state.read().map_err(unavailable)?;
        Ok(state.generation(group_id))
    }

    fn set_if_current(
        &self,
        group_id: &GroupId,
        value: GroupBalances,
        ttl: Duration,
        generation: Generation,
    ) -> Result<bool, CacheError> {
        let mut state = self.state.write().map_err(unavailable)?;
        if state.generation(group_id) != generation {
            return Ok(false);
        }
        state.insert(group_id, value, ttl);
        Ok(true)
    }

    fn invalidate(&self, group_id: &GroupId) -> Result<(), CacheError> {
        let mut state = self.state.write().map_err(unavailable)?;
        state.entries.remove(group_id);
        let next = Generation(state.generation(group_id).0.wrapping_add(1));
        state.generations.insert(group_id.clone(), next);
        Ok(())
    }
}

/// A cache that never stores anything. Every read recomputes.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCache;

impl BalanceCache for NoopCache {
    fn get(&self, _group_id: &GroupId) -> Result<Option<GroupBalances>, CacheError> {
        Ok(None)
    }

    fn set(&self, _group_id: &GroupId, _value: GroupBalances, _ttl: Duration) -> Result<(), CacheError> {
        Ok(())
    }

    fn generation(&self, _group_id: &GroupId) -> Result<Generation, CacheError> {
        Ok(Generation::default())
    }

    fn set_if_current(
        &self,
        _group_id: &GroupId,
        _value: GroupBalances,
        _ttl: Duration,
        _generation: Generation,
    ) -> Result<bool, CacheError> {
        Ok(false)
    }

    fn invalidate(&self, _group_id: &GroupId) -> Result<(), CacheError> {
        Ok(())
    }
}

fn unavailable<E: std::fmt::Display>(e: E) -> CacheError {
    CacheError::Unavailable(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::currency::CurrencyCode;

    fn balances(group: &str) -> GroupBalances {
        GroupBalances {
            group_id: GroupId::new(group),
            currency: CurrencyCode::new("USD"),
            member_balances: Vec::new(),
            simplified_debts: Vec::new(),
            rounding_residual_minor_units: 0,
            calculated_at: Utc::now(),
        }
    }

    #[test]
    fn test_set_then_get() {
        let cache = InMemoryBalanceCache::new();
        let g = GroupId::new("g");
        let value = balances("g");
        cache.set(&g, value.clone(), Duration::minutes(5)).unwrap();
        assert_eq!(cache.get(&g).unwrap(), Some(value));
        assert_eq!(cache.get(&GroupId::new("other")).unwrap(), None);
    }

    #[test]
    fn test_invalidate_removes_only_that_group() {
        let cache = InMemoryBalanceCache::new();
        let (g1, g2) = (GroupId::new("g1"), GroupId::new("g2"));
        cache.set(&g1, balances("g1"), Duration::minutes(5)).unwrap();
        cache.set(&g2, balances("g2"), Duration::minutes(5)).unwrap();

        cache.invalidate(&g1).unwrap();
        assert_eq!(cache.get(&g1).unwrap(), None);
        assert!(cache.get(&g2).unwrap().is_some());
    }

    #[test]
    fn test_zero_ttl_expires_immediately() {
        let cache = InMemoryBalanceCache::new();
        let g = GroupId::new("g");
        cache.set(&g, balances("g"), Duration::zero()).unwrap();
        assert_eq!(cache.get(&g).unwrap(), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_purge_expired() {
        let cache = InMemoryBalanceCache::new();
        cache
            .set(&GroupId::new("old"), balances("old"), Duration::zero())
            .unwrap();
        cache
            .set(&GroupId::new("new"), balances("new"), Duration::minutes(1))
            .unwrap();
        assert_eq!(cache.purge_expired().unwrap(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_set_if_current_rejects_after_invalidate() {
        let cache = InMemoryBalanceCache::new();
        let g = GroupId::new("g");
        let before = cache.generation(&g).unwrap();

        cache.invalidate(&g).unwrap();
        let stored = cache
            .set_if_current(&g, balances("g"), Duration::minutes(5), before)
            .unwrap();
        assert!(!stored);
        assert_eq!(cache.get(&g).unwrap(), None);

        let now = cache.generation(&g).unwrap();
        assert!(now > before);
        assert!(cache
            .set_if_current(&g, balances("g"), Duration::minutes(5), now)
            .unwrap());
        assert!(cache.get(&g).unwrap().is_some());
    }

    #[test]
    fn test_generations_are_per_group() {
        let cache = InMemoryBalanceCache::new();
        let (g1, g2) = (GroupId::new("g1"), GroupId::new("g2"));
        let token = cache.generation(&g2).unwrap();
        cache.invalidate(&g1).unwrap();
        assert!(cache
            .set_if_current(&g2, balances("g2"), Duration::minutes(5), token)
            .unwrap());
    }

    #[test]
    fn test_noop_never_hits() {
        let cache = NoopCache;
        let g = GroupId::new("g");
        cache.set(&g, balances("g"), Duration::minutes(5)).unwrap();
        assert_eq!(cache.get(&g).unwrap(), None);
    }

    #[test]
    fn test_concurrent_access() {
        use std::sync::Arc;
        use std::thread;

        let cache = Arc::new(InMemoryBalanceCache::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    let g = GroupId::new(format!("g{}", i % 2));
                    for _ in 0..100 {
                        cache.set(&g, balances(g.as_str()), Duration::minutes(1)).unwrap();
                        let _ = cache.get(&g).unwrap();
                        cache.invalidate(&g).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert!(cache.purge_expired().is_ok());
    }
}
