//! Tag-scoped read-through cache.
//!
//! Values are memoized per [`CacheKey`] for a bounded time and labelled with a
//! set of [`CacheTag`]s. Every tag carries a generation; an entry remembers
//! the generation of each of its tags as observed *before* its value was
//! computed. Invalidating a tag moves its generation forward, so an entry
//! whose computation overlapped an invalidation is never served.
//!
//! Generations are ticks of one clock. Tags without a recorded invalidation
//! read as `floor`; once too many tags are recorded the table is compacted by
//! raising `floor` to the clock, which only ever turns stamps stale.

use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use lru::LruCache;
use metrics::counter;
use tokio::time::Instant;
use tracing::{debug, warn};

use super::config::CacheConfig;
use super::keys::{CacheKey, CacheTag};
use super::lock::{rw_read, rw_write};
use super::registry::CacheRegistry;

const SOURCE: &str = "cache::store";

const METRIC_HIT: &str = "pemuda_cache_hit_total";
const METRIC_MISS: &str = "pemuda_cache_miss_total";
const METRIC_EVICT: &str = "pemuda_cache_evict_total";
const METRIC_INVALIDATE: &str = "pemuda_cache_invalidate_total";

type Stamps = Vec<(CacheTag, u64)>;

#[derive(Default)]
struct Generations {
    clock: u64,
    floor: u64,
    tags: HashMap<CacheTag, u64>,
}

impl Generations {
    fn current(&self, tag: &CacheTag) -> u64 {
        self.tags.get(tag).copied().unwrap_or(self.floor)
    }

    fn bump(&mut self, tag: &CacheTag) {
        self.clock += 1;
        self.tags.insert(tag.clone(), self.clock);
    }

    fn compact(&mut self) {
        self.floor = self.clock;
        self.tags.clear();
    }
}

#[derive(Clone)]
struct Entry {
    value: Arc<dyn Any + Send + Sync>,
    expires_at: Instant,
    stamps: Arc<Stamps>,
}

/// Process-wide memoization store shared by every read accessor.
pub struct TaggedCache {
    config: CacheConfig,
    entries: RwLock<LruCache<CacheKey, Entry>>,
    generations: RwLock<Generations>,
    registry: CacheRegistry,
}

impl TaggedCache {
    pub fn new(config: CacheConfig) -> Self {
        let capacity = config.max_entries_non_zero();
        Self {
            config,
            entries: RwLock::new(LruCache::new(capacity)),
            generations: RwLock::new(Generations::default()),
            registry: CacheRegistry::new(),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Return the cached value for `key`, or run `compute` and store its
    /// result under `tags` for `ttl`. Errors are returned as-is and never stored.
    pub async fn get_or_compute<T, E, F, Fut>(
        &self,
        key: CacheKey,
        ttl: Duration,
        tags: Vec<CacheTag>,
        compute: F,
    ) -> Result<T, E>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if !self.config.is_enabled() {
            return compute().await;
        }

        if let Some(value) = self.lookup::<T>(&key) {
            counter!(METRIC_HIT, "resource" => key.resource()).increment(1);
            return Ok(value);
        }
        counter!(METRIC_MISS, "resource" => key.resource()).increment(1);

        let stamps = self.stamp(tags);
        let value = compute().await?;
        self.insert(key, value.clone(), ttl, stamps);
        Ok(value)
    }

    /// [`Self::get_or_compute`] with the configured TTL.
    pub async fn fetch<T, E, F, Fut>(
        &self,
        key: CacheKey,
        tags: Vec<CacheTag>,
        compute: F,
    ) -> Result<T, E>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.get_or_compute(key, self.config.ttl(), tags, compute)
            .await
    }

    /// Drop every entry stored under `tag`, including entries whose value is
    /// still being computed. Returns the number of entries removed.
    pub fn invalidate(&self, tag: &CacheTag) -> usize {
        let compacted = {
            let mut generations = rw_write(&self.generations, SOURCE, "invalidate.bump");
            generations.bump(tag);
            let over = generations.tags.len() > self.config.tracked_tag_limit();
            if over {
                generations.compact();
            }
            over
        };
        if compacted {
            // Every stored stamp predates the new floor.
            self.clear();
            debug!(target = "pemuda::cache", "tag generations compacted");
        }

        let keys = self.registry.unregister_tag(tag);
        if !keys.is_empty() {
            let mut entries = rw_write(&self.entries, SOURCE, "invalidate.pop");
            for key in &keys {
                entries.pop(key);
            }
        }

        counter!(METRIC_INVALIDATE).increment(1);
        debug!(
            target = "pemuda::cache",
            tag = %tag,
            removed = keys.len(),
            "cache tag invalidated"
        );
        keys.len()
    }

    pub fn clear(&self) {
        rw_write(&self.entries, SOURCE, "clear").clear();
        self.registry.clear();
    }

    pub fn len(&self) -> usize {
        rw_read(&self.entries, SOURCE, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn registry(&self) -> &CacheRegistry {
        &self.registry
    }

    fn lookup<T>(&self, key: &CacheKey) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        let entry = rw_write(&self.entries, SOURCE, "lookup").get(key).cloned()?;

        if entry.expires_at <= Instant::now() || !self.is_current(&entry.stamps) {
            self.discard(key, &entry);
            return None;
        }

        match entry.value.downcast::<T>() {
            Ok(value) => Some(T::clone(&value)),
            Err(_) => {
                warn!(
                    target = "pemuda::cache",
                    key = %key,
                    "cached value has unexpected type; recomputing"
                );
                None
            }
        }
    }

    fn stamp(&self, tags: Vec<CacheTag>) -> Stamps {
        let generations = rw_read(&self.generations, SOURCE, "stamp");
        let unique: HashSet<CacheTag> = tags.into_iter().collect();
        unique
            .into_iter()
            .map(|tag| {
                let generation = generations.current(&tag);
                (tag, generation)
            })
            .collect()
    }

    fn is_current(&self, stamps: &Stamps) -> bool {
        let generations = rw_read(&self.generations, SOURCE, "is_current");
        stamps
            .iter()
            .all(|(tag, seen)| generations.current(tag) == *seen)
    }

    fn insert<T>(&self, key: CacheKey, value: T, ttl: Duration, stamps: Stamps)
    where
        T: Send + Sync + 'static,
    {
        if !self.is_current(&stamps) {
            debug!(
                target = "pemuda::cache",
                key = %key,
                "skipping store: a tag was invalidated while computing"
            );
            return;
        }

        let tags: HashSet<CacheTag> = stamps.iter().map(|(tag, _)| tag.clone()).collect();
        let entry = Entry {
            value: Arc::new(value),
            expires_at: Instant::now() + ttl,
            stamps: Arc::new(stamps),
        };

        let displaced = rw_write(&self.entries, SOURCE, "insert").push(key.clone(), entry);
        if let Some((evicted, _)) = displaced.filter(|(evicted, _)| *evicted != key) {
            self.registry.unregister(&evicted);
            counter!(METRIC_EVICT).increment(1);
        }
        self.registry.register(key, tags);
    }

    /// Remove a stale entry unless it was already replaced by a newer one.
    fn discard(&self, key: &CacheKey, stale: &Entry) {
        let mut entries = rw_write(&self.entries, SOURCE, "discard");
        let same = entries
            .peek(key)
            .is_some_and(|current| Arc::ptr_eq(&current.stamps, &stale.stamps));
        if same {
            entries.pop(key);
            drop(entries);
            self.registry.unregister(key);
        }
    }
}
