//! Rank cache.
//!
//! Combination indexes are expensive to build and depend only on the base
//! stats and CP cap, so they are memoized behind the [`RankCache`] trait.
//! IV-specific results are always derived from the cached index.
//!
//! Two caches are built in:
//!
//! - [`NoCache`] stores nothing; every lookup recomputes.
//! - [`TtlCache`] holds a bounded number of entries, evicting the least
//!   recently used one when full and dropping entries older than a TTL.

use crate::error::RankError;
use crate::ranking::{CombinationIndex, StorageMode};
use crate::stats::BaseStats;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Entries of the built-in strategies live for a day.
pub const DAY: Duration = Duration::from_secs(24 * 60 * 60);

/// A cached lookup result.
///
/// `None` records that the species is not viable under the CP cap at any
/// configured level cap; that answer is cached too.
pub type CachedIndex = Option<Arc<CombinationIndex>>;

/// Cache key: the base stats and CP cap of a combination index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    attack: u64,
    defense: u64,
    stamina: u64,
    cp_cap: u32,
}

impl CacheKey {
    pub fn new(stats: &BaseStats, cp_cap: u32) -> Self {
        Self {
            attack: stats.attack.to_bits(),
            defense: stats.defense.to_bits(),
            stamina: stats.stamina.to_bits(),
            cp_cap,
        }
    }
}

/// Minimal cache interface used by the ranker.
pub trait RankCache: Send {
    /// Look up an entry. The outer `None` is a miss.
    fn get(&mut self, key: &CacheKey) -> Option<CachedIndex>;

    /// Store an entry, replacing any previous value for `key`.
    fn set(&mut self, key: CacheKey, value: CachedIndex);

    /// Number of live entries.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A cache that never stores anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCache;

impl RankCache for NoCache {
    fn get(&mut self, _key: &CacheKey) -> Option<CachedIndex> {
        None
    }

    fn set(&mut self, _key: CacheKey, _value: CachedIndex) {}

    fn len(&self) -> usize {
        0
    }
}

#[derive(Debug)]
struct Slot {
    value: CachedIndex,
    stored_at: Instant,
    last_used: u64,
}

/// A bounded cache with least-recently-used eviction and optional TTL.
///
/// # Examples
///
/// ```rust
/// use pvprank::cache::{CacheKey, RankCache, TtlCache};
/// use pvprank::BaseStats;
///
/// let mut cache = TtlCache::new(Some(2), None).unwrap();
/// let key = CacheKey::new(&BaseStats::new(1.0, 2.0, 3.0), 1500);
/// cache.set(key, None);
/// assert_eq!(cache.get(&key), Some(None));
/// ```
#[derive(Debug)]
pub struct TtlCache {
    capacity: Option<usize>,
    ttl: Option<Duration>,
    refresh_on_get: bool,
    entries: HashMap<CacheKey, Slot>,
    tick: u64,
}

impl TtlCache {
    /// Create a cache holding at most `capacity` entries (unbounded when
    /// `None`), each expiring `ttl` after it was stored or last read.
    pub fn new(capacity: Option<usize>, ttl: Option<Duration>) -> Result<Self, RankError> {
        if capacity == Some(0) {
            return Err(RankError::InvalidConfig(
                "cache capacity must be at least 1".into(),
            ));
        }
        Ok(Self {
            capacity,
            ttl,
            refresh_on_get: true,
            entries: HashMap::new(),
            tick: 0,
        })
    }

    /// Unbounded cache whose entries expire a day after their last access.
    pub fn day_old() -> Self {
        Self {
            capacity: None,
            ttl: Some(DAY),
            refresh_on_get: true,
            entries: HashMap::new(),
            tick: 0,
        }
    }

    /// Keep the TTL anchored at store time instead of refreshing it on reads.
    pub fn without_refresh(mut self) -> Self {
        self.refresh_on_get = false;
        self
    }

    fn is_expired(&self, slot: &Slot, now: Instant) -> bool {
        self.ttl
            .map_or(false, |ttl| now.duration_since(slot.stored_at) > ttl)
    }

    fn evict_expired(&mut self, now: Instant) {
        if let Some(ttl) = self.ttl {
            self.entries
                .retain(|_, slot| now.duration_since(slot.stored_at) <= ttl);
        }
    }

    fn evict_least_recent(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, slot)| slot.last_used)
            .map(|(key, _)| *key);
        if let Some(key) = oldest {
            self.entries.remove(&key);
        }
    }

    fn next_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }
}

impl RankCache for TtlCache {
    fn get(&mut self, key: &CacheKey) -> Option<CachedIndex> {
        let now = Instant::now();
        let expired = self
            .entries
            .get(key)
            .map(|slot| self.is_expired(slot, now))?;
        if expired {
            self.entries.remove(key);
            return None;
        }
        let tick = self.next_tick();
        let refresh = self.refresh_on_get;
        let slot = self.entries.get_mut(key)?;
        slot.last_used = tick;
        if refresh {
            slot.stored_at = now;
        }
        Some(slot.value.clone())
    }

    fn set(&mut self, key: CacheKey, value: CachedIndex) {
        let now = Instant::now();
        if !self.entries.contains_key(&key) {
            self.evict_expired(now);
            if let Some(capacity) = self.capacity {
                while self.entries.len() >= capacity {
                    self.evict_least_recent();
                }
            }
        }
        let last_used = self.next_tick();
        self.entries.insert(
            key,
            Slot {
                value,
                stored_at: now,
                last_used,
            },
        );
    }

    /// Counts live entries only; expired ones are ignored until swept.
    fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .values()
            .filter(|slot| !self.is_expired(slot, now))
            .count()
    }
}

/// How the ranker caches combination indexes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CachingStrategy {
    /// No caching; favours memory over CPU.
    #[default]
    CpuHeavy,
    /// Day-old cache storing compact rank tables.
    Balanced,
    /// Day-old cache storing full results.
    MemoryHeavy,
    /// Bounded least-recently-used cache.
    Lru {
        capacity: usize,
        #[serde(default)]
        ttl_secs: Option<u64>,
        #[serde(default)]
        compact: bool,
    },
}

impl CachingStrategy {
    /// Build the cache and the storage mode its entries use.
    pub fn build(self) -> Result<(Box<dyn RankCache>, StorageMode), RankError> {
        Ok(match self {
            CachingStrategy::CpuHeavy => (Box::new(NoCache), StorageMode::Full),
            CachingStrategy::Balanced => (Box::new(TtlCache::day_old()), StorageMode::Compact),
            CachingStrategy::MemoryHeavy => (Box::new(TtlCache::day_old()), StorageMode::Full),
            CachingStrategy::Lru {
                capacity,
                ttl_secs,
                compact,
            } => {
                let cache = TtlCache::new(Some(capacity), ttl_secs.map(Duration::from_secs))?;
                let mode = if compact {
                    StorageMode::Compact
                } else {
                    StorageMode::Full
                };
                (Box::new(cache), mode)
            }
        })
    }
}
