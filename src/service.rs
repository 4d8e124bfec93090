//! Composition root: store + cache + aggregation behind one API.

use crate::balance::{GroupBalances, IndividualBalance};
use crate::cache::{BalanceCache, NoopCache};
use crate::config::EngineConfig;
use crate::core::ids::{GroupId, MemberId};
use crate::error::BalanceError;
use crate::store::BalanceStore;
use std::sync::Arc;

/// Per-call options for [`BalanceService::get_group_balances`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GetOptions {
    /// Recompute even if a cached value exists. The fresh value is cached.
    pub skip_cache: bool,
}

impl GetOptions {
    pub fn skip_cache() -> Self {
        Self { skip_cache: true }
    }
}

/// Serves group balances from a [`BalanceStore`] through a [`BalanceCache`].
///
/// The cache is injected rather than global, so separate services (and
/// tests) never share state by accident.
///
/// Reads never fail because of the cache: a cache error is logged and the
/// balances are recomputed from the store. Store errors are returned as-is.
pub struct BalanceService<S> {
    store: S,
    cache: Arc<dyn BalanceCache>,
    config: EngineConfig,
}

impl<S: BalanceStore> BalanceService<S> {
    pub fn new(store: S, cache: Arc<dyn BalanceCache>, config: EngineConfig) -> Self {
        Self {
            store,
            cache,
            config,
        }
    }

    /// A service that recomputes on every read.
    pub fn without_cache(store: S, config: EngineConfig) -> Self {
        Self::new(store, Arc::new(NoopCache), config)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Balances and suggested transfers for a group, or `None` if the group
    /// does not exist.
    pub fn get_group_balances(
        &self,
        group_id: &GroupId,
        options: GetOptions,
    ) -> Result<Option<GroupBalances>, BalanceError> {
        if !options.skip_cache {
            match self.cache.get(group_id) {
                Ok(Some(cached)) => {
                    log::debug!("group {}: balance cache hit", group_id);
                    return Ok(Some(cached));
                }
                Ok(None) => log::debug!("group {}: balance cache miss", group_id),
                Err(e) => log::warn!("group {}: {}; recomputing", group_id, e),
            }
        }

        // taken before the read: an invalidation after this point means the
        // snapshot below may predate a write
        let generation = match self.cache.generation(group_id) {
            Ok(generation) => Some(generation),
            Err(e) => {
                log::warn!("group {}: {}; result will not be cached", group_id, e);
                None
            }
        };

        let Some(snapshot) = self.store.load_snapshot(group_id)? else {
            return Ok(None);
        };
        let balances = GroupBalances::compute(&snapshot, self.config.residual_policy)?;

        if let Some(generation) = generation {
            match self.cache.set_if_current(
                group_id,
                balances.clone(),
                self.config.cache_ttl(),
                generation,
            ) {
                Ok(true) => {}
                Ok(false) => log::debug!(
                    "group {}: invalidated during recomputation; not cached",
                    group_id
                ),
                Err(e) => log::warn!("group {}: could not cache balances: {}", group_id, e),
            }
        }
        Ok(Some(balances))
    }

    /// One member's totals plus the suggested transfers involving them.
    ///
    /// `None` if either the group or the member does not exist.
    pub fn get_individual_balance(
        &self,
        group_id: &GroupId,
        member_id: &MemberId,
    ) -> Result<Option<IndividualBalance>, BalanceError> {
        let Some(balances) = self.get_group_balances(group_id, GetOptions::default())? else {
            return Ok(None);
        };
        Ok(balances.individual(member_id)?)
    }

    /// Drop the cached balances of a group.
    ///
    /// Every subsystem that changes a group's expenses, items, splits,
    /// payers, settlements or membership must call this (or go through
    /// [`mutate`](Self::mutate)) before reporting the change as complete.
    pub fn invalidate_group_balances_cache(&self, group_id: &GroupId) {
        if let Err(e) = self.cache.invalidate(group_id) {
            log::error!(
                "group {}: balance cache invalidation failed: {}",
                group_id,
                e
            );
        }
    }

    /// Run a balance-affecting write against the store, then invalidate the
    /// group's cached balances.
    ///
    /// The entry is dropped whether or not the write succeeded, since a
    /// failed write may still have been partially applied by the backend.
    pub fn mutate<T, E>(&self, group_id: &GroupId, write: impl FnOnce(&S) -> Result<T, E>) -> Result<T, E> {
        let result = write(&self.store);
        self.invalidate_group_balances_cache(group_id);
        result
    }
}
