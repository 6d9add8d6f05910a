//! Size-aware cache of decoded animated emote images.
//!
//! Decoded animation data is expensive, so the cache bounds the total
//! declared byte cost of its entries and evicts least-recently-used
//! handles once the bound is exceeded. Every decoded handle is handed
//! one shared redraw signal so that all visible instances of the same
//! emote advance their animation in lockstep.
//!
//! The cache does not decode images itself; callers pass a decode
//! closure to [`GifCache::get_or_decode`]. A failed decode is never
//! cached.

use std::sync::{Arc, Mutex, PoisonError};

use lru::LruCache;

/// Default declared-cost capacity: 4 MiB of decoded image data.
pub const DEFAULT_CAPACITY: usize = 4 * 1024 * 1024;

/// Redraw fan-out shared by every handle in one cache.
///
/// Frame timing is owned by whoever drives the animation; the cache
/// only guarantees a single signal identity so that subscribers for the
/// same emote repaint together.
pub struct RedrawSignal {
    subscribers: Mutex<Vec<Box<dyn Fn() + Send + Sync>>>,
}

impl RedrawSignal {
    fn new() -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
        }
    }

    /// Register a callback invoked on every [`notify`](Self::notify).
    pub fn subscribe(&self, callback: impl Fn() + Send + Sync + 'static) {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Box::new(callback));
    }

    /// Invoke all subscribed callbacks.
    pub fn notify(&self) {
        let subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        for callback in subscribers.iter() {
            callback();
        }
    }
}

struct CacheEntry<T> {
    handle: Arc<T>,
    cost: usize,
}

struct Inner<T> {
    entries: LruCache<String, CacheEntry<T>>,
    total_cost: usize,
}

/// Capacity-bounded cache from image-reference key to decoded handle.
///
/// `get`, `put` and eviction are synchronized as a unit, so cost
/// accounting stays consistent under concurrent access from many
/// visible emote instances.
pub struct GifCache<T> {
    inner: Mutex<Inner<T>>,
    capacity: usize,
    redraw: Arc<RedrawSignal>,
}

impl<T> GifCache<T> {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Cache bounded to `capacity` bytes of declared cost.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: LruCache::unbounded(),
                total_cost: 0,
            }),
            capacity,
            redraw: Arc::new(RedrawSignal::new()),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The shared redraw signal handed to every decoded handle.
    pub fn redraw_signal(&self) -> Arc<RedrawSignal> {
        Arc::clone(&self.redraw)
    }

    /// Cached handle for `key`, refreshing its recency. Absence is not
    /// an error.
    pub fn get(&self, key: &str) -> Option<Arc<T>> {
        let mut inner = self.lock();
        inner.entries.get(key).map(|entry| Arc::clone(&entry.handle))
    }

    /// Insert a decoded handle with its declared byte cost, evicting
    /// least-recently-used entries (never the one just inserted) until
    /// the total declared cost fits the capacity again.
    pub fn put(&self, key: impl Into<String>, handle: T, cost: usize) -> Arc<T> {
        let key = key.into();
        let handle = Arc::new(handle);
        let mut inner = self.lock();
        let entry = CacheEntry {
            handle: Arc::clone(&handle),
            cost,
        };
        if let Some(old) = inner.entries.put(key.clone(), entry) {
            inner.total_cost -= old.cost;
        }
        inner.total_cost += cost;

        while inner.total_cost > self.capacity && inner.entries.len() > 1 {
            if let Some((evicted, entry)) = inner.entries.pop_lru() {
                inner.total_cost -= entry.cost;
                tracing::debug!(key = %evicted, cost = entry.cost, "Evicted decoded emote");
            }
        }
        handle
    }

    /// Cached handle for `key`, or run `decode` and cache its result.
    ///
    /// The decode closure receives the shared redraw signal so the new
    /// handle can register for lockstep repaints, and returns the
    /// decoded value with its declared cost. It runs outside the cache
    /// lock. A decode that fails returns `None` and is not cached;
    /// retry or fallback policy belongs to the caller.
    pub fn get_or_decode<F>(&self, key: &str, decode: F) -> Option<Arc<T>>
    where
        F: FnOnce(&Arc<RedrawSignal>) -> Option<(T, usize)>,
    {
        if let Some(handle) = self.get(key) {
            return Some(handle);
        }
        let (handle, cost) = decode(&self.redraw)?;
        Some(self.put(key, handle, cost))
    }

    /// Number of cached handles.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    /// Summed declared cost of all entries.
    pub fn total_cost(&self) -> usize {
        self.lock().total_cost
    }
}

impl<T> Default for GifCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    /// Handle that counts drops, standing in for decoded frame data.
    struct Frames {
        _label: &'static str,
        drops: Arc<AtomicUsize>,
    }

    impl Drop for Frames {
        fn drop(&mut self) {
            self.drops.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn frames(label: &'static str, drops: &Arc<AtomicUsize>) -> Frames {
        Frames {
            _label: label,
            drops: Arc::clone(drops),
        }
    }

    #[test]
    fn test_get_miss_is_none() {
        let cache: GifCache<u32> = GifCache::new();
        assert!(cache.get("missing").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_put_and_get() {
        let cache = GifCache::with_capacity(100);
        cache.put("a", 1u32, 10);
        assert_eq!(cache.get("a").as_deref(), Some(&1));
        assert_eq!(cache.total_cost(), 10);
    }

    #[test]
    fn test_eviction_is_lru_and_respects_capacity() {
        let cache = GifCache::with_capacity(100);
        cache.put("a", 1u32, 40);
        cache.put("b", 2u32, 40);
        cache.put("c", 3u32, 40);

        // "a" was least recently used.
        assert!(cache.get("a").is_none());
        assert!(cache.get("b").is_some());
        assert!(cache.get("c").is_some());
        assert!(cache.total_cost() <= 100);
    }

    #[test]
    fn test_get_refreshes_recency() {
        let cache = GifCache::with_capacity(100);
        cache.put("a", 1u32, 40);
        cache.put("b", 2u32, 40);
        // Touch "a" so "b" becomes the eviction candidate.
        cache.get("a");
        cache.put("c", 3u32, 40);

        assert!(cache.get("a").is_some());
        assert!(cache.get("b").is_none());
    }

    #[test]
    fn test_just_inserted_entry_survives_eviction() {
        let cache = GifCache::with_capacity(100);
        cache.put("a", 1u32, 40);
        cache.put("big", 2u32, 500);

        assert!(cache.get("a").is_none());
        assert!(cache.get("big").is_some());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_overwrite_does_not_double_count_cost() {
        let cache = GifCache::with_capacity(100);
        cache.put("a", 1u32, 40);
        cache.put("a", 2u32, 60);
        assert_eq!(cache.total_cost(), 60);
        assert_eq!(cache.get("a").as_deref(), Some(&2));
    }

    #[test]
    fn test_eviction_releases_handles() {
        let drops = Arc::new(AtomicUsize::new(0));
        let cache = GifCache::with_capacity(100);
        cache.put("a", frames("a", &drops), 60);
        cache.put("b", frames("b", &drops), 60);

        assert_eq!(drops.load(Ordering::SeqCst), 1);
        assert!(cache.get("a").is_none());
    }

    #[test]
    fn test_decode_failure_not_cached() {
        let cache: GifCache<u32> = GifCache::new();
        assert!(cache.get_or_decode("bad", |_| None).is_none());
        assert!(cache.is_empty());

        // A later successful decode goes in.
        let handle = cache.get_or_decode("bad", |_| Some((7, 100))).unwrap();
        assert_eq!(*handle, 7);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_get_or_decode_hits_skip_decode() {
        let cache = GifCache::new();
        cache.put("a", 1u32, 10);
        let handle = cache
            .get_or_decode("a", |_| panic!("decode must not run on a hit"))
            .unwrap();
        assert_eq!(*handle, 1);
    }

    #[test]
    fn test_redraw_signal_fans_out() {
        let cache: GifCache<u32> = GifCache::new();
        let hits = Arc::new(AtomicUsize::new(0));
        for _ in 0..3 {
            let hits = Arc::clone(&hits);
            cache
                .redraw_signal()
                .subscribe(move || {
                    hits.fetch_add(1, Ordering::SeqCst);
                });
        }

        cache.redraw_signal().notify();
        assert_eq!(hits.load(Ordering::SeqCst), 3);

        // Both handles of one cache share the same signal identity.
        assert!(Arc::ptr_eq(&cache.redraw_signal(), &cache.redraw_signal()));
    }
}
