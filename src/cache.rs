use std::hash::Hash;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::error::CacheError;
use crate::metrics::CacheMetrics;
use crate::store::RecencyStore;
use crate::traits::{Loader, RemovalListener, Weigher};

/// Weight-bounded LRU cache with lazy create-on-miss population.
///
/// The cache holds entries up to an immutable weight budget. Every `get` and
/// `put` promotes the touched entry to most-recently-used; whenever the
/// budget is exceeded, least-recently-used entries are evicted until the
/// total weight fits again.
///
/// Values are stored behind `Arc`, so lookups hand out a cheap clone of the
/// pointer without cloning the value or holding any lock.
///
/// # Concurrency
///
/// The cache may be shared across threads (`Arc<Cache<K, V>>`). A single
/// internal mutex protects the store, the weight total, and all counters;
/// each operation holds it for one short, O(1)-ish critical section.
///
/// The one deliberate exception is the [`Loader`]: it runs with the lock
/// *released*, so a slow computation never blocks cache users on other keys.
/// The cost is that concurrent misses on the same key may each run the
/// loader; the first thread to re-acquire the lock commits its value, and
/// every later result is discarded without ever being installed (the
/// [`RemovalListener`] observes the discard).
///
/// # Example
///
/// ```
/// use recency_cache::CacheBuilder;
///
/// let cache = CacheBuilder::new(10)
/// 	.weigher(|_key: &u32, value: &String| value.len() as i64)
/// 	.build()
/// 	.unwrap();
///
/// cache.put(1, "hello".to_string()).unwrap();
/// assert_eq!(cache.size(), 5);
/// assert!(cache.get(&1).unwrap().is_some());
/// ```
pub struct Cache<K, V> {
	inner: Mutex<Inner<K, V>>,
	/// Immutable for the cache's lifetime.
	max_weight: u64,
	weigher: Box<dyn Weigher<K, V>>,
	loader: Option<Box<dyn Loader<K, V>>>,
	listener: Option<Box<dyn RemovalListener<K, V>>>,
}

/// Everything guarded by the cache lock.
struct Inner<K, V> {
	store: RecencyStore<K, Arc<V>>,
	current_weight: u64,
	hits: u64,
	misses: u64,
	creates: u64,
	puts: u64,
	evictions: u64,
}

impl<K, V> Cache<K, V>
where
	K: Hash + Eq + Clone,
{
	/// Create a cache bounded by `max_weight` with default extension points:
	/// every entry weighs 1 (the budget counts entries), no loader, no
	/// removal listener.
	///
	/// Fails with [`CacheError::ZeroCapacity`] if `max_weight` is 0.
	pub fn new(max_weight: u64) -> Result<Self, CacheError> {
		crate::CacheBuilder::new(max_weight).build()
	}

	pub(crate) fn from_parts(
		max_weight: u64,
		weigher: Box<dyn Weigher<K, V>>,
		loader: Option<Box<dyn Loader<K, V>>>,
		listener: Option<Box<dyn RemovalListener<K, V>>>,
	) -> Self {
		Self {
			inner: Mutex::new(Inner {
				store: RecencyStore::new(),
				current_weight: 0,
				hits: 0,
				misses: 0,
				creates: 0,
				puts: 0,
				evictions: 0,
			}),
			max_weight,
			weigher,
			loader,
			listener,
		}
	}

	/// Look up `key`, lazily populating it on a miss when a loader is
	/// configured.
	///
	/// On a hit the entry is promoted to most-recently-used. On a miss the
	/// loader (if any) runs with the cache lock released; its result is
	/// committed only if no other thread installed a value for `key` in the
	/// meantime, otherwise the already-committed value is returned and the
	/// freshly loaded one is discarded.
	///
	/// Fails with [`CacheError::NegativeWeight`] if the weigher rejects a
	/// loaded value; nothing is installed in that case.
	pub fn get(&self, key: &K) -> Result<Option<Arc<V>>, CacheError> {
		{
			let mut inner = self.inner.lock();
			if let Some(value) = inner.store.get(key) {
				let value = Arc::clone(value);
				inner.hits += 1;
				return Ok(Some(value));
			}
			inner.misses += 1;
		}

		// Lock released: a slow load must not serialize the whole cache.
		let Some(loader) = self.loader.as_deref() else {
			return Ok(None);
		};
		let Some(created) = loader.load(key) else {
			return Ok(None);
		};
		let created = Arc::new(created);

		let mut inner = self.inner.lock();
		if let Some(winner) = inner.store.peek(key) {
			// Another thread committed first; the loaded value is never
			// installed and its weight is never charged.
			let winner = Arc::clone(winner);
			trace!("discarding created value that lost the commit race");
			if let Some(listener) = self.listener.as_deref() {
				listener.on_removed(false, key, &*created, Some(&*winner));
			}
			return Ok(Some(winner));
		}

		let weight = self.checked_weight(key, &created)?;
		inner.store.insert(key.clone(), Arc::clone(&created), weight);
		inner.current_weight += weight;
		inner.creates += 1;
		self.evict_to_capacity(&mut inner);
		Ok(Some(created))
	}

	/// Insert `value` under `key`, returning the previous value if the key
	/// was present. The entry ends up most-recently-used either way.
	///
	/// A replaced value is reported to the removal listener as
	/// `on_removed(false, key, old, Some(new))` before the eviction loop
	/// runs.
	///
	/// Fails with [`CacheError::NegativeWeight`] if the weigher rejects the
	/// value; the cache is left untouched.
	pub fn put(&self, key: K, value: V) -> Result<Option<Arc<V>>, CacheError> {
		let value = Arc::new(value);
		// Weight is validated before any mutation is committed.
		let weight = self.checked_weight(&key, &value)?;

		let mut inner = self.inner.lock();
		let previous = inner.store.insert(key.clone(), Arc::clone(&value), weight);
		if let Some((old, old_weight)) = &previous {
			inner.current_weight -= *old_weight;
			if let Some(listener) = self.listener.as_deref() {
				listener.on_removed(false, &key, &**old, Some(&*value));
			}
		}
		inner.current_weight += weight;
		inner.puts += 1;
		self.evict_to_capacity(&mut inner);
		Ok(previous.map(|(old, _)| old))
	}

	/// Remove the entry for `key`, if present.
	///
	/// The removal is reported as `on_removed(false, key, removed, None)`.
	pub fn remove(&self, key: &K) -> Option<Arc<V>> {
		let mut inner = self.inner.lock();
		let (value, weight) = inner.store.remove(key)?;
		inner.current_weight -= weight;
		if let Some(listener) = self.listener.as_deref() {
			listener.on_removed(false, key, &value, None);
		}
		Some(value)
	}

	/// Clear the cache, charging the whole outstanding weight to the
	/// eviction counter.
	///
	/// Deliberate bulk-clear semantics: no per-entry removal notifications
	/// are fired, and the hit/miss/put/create counters are untouched.
	pub fn evict_all(&self) {
		let mut inner = self.inner.lock();
		let cleared = inner.current_weight;
		inner.evictions += cleared;
		inner.store.clear();
		inner.current_weight = 0;
		debug!(cleared_weight = cleared, "cleared cache");
	}

	/// Pop LRU entries until the weight budget is restored.
	///
	/// Runs after every weight increase. Loops rather than removing a single
	/// entry, so one oversized insertion is still bounded; an entry heavier
	/// than the whole budget evicts everything, itself included.
	fn evict_to_capacity(&self, inner: &mut Inner<K, V>) {
		while inner.current_weight > self.max_weight {
			let Some((key, value, weight)) = inner.store.remove_lru() else {
				break;
			};
			inner.current_weight -= weight;
			inner.evictions += 1;
			trace!(weight, "evicted least recently used entry");
			if let Some(listener) = self.listener.as_deref() {
				listener.on_removed(true, &key, &value, None);
			}
		}
	}

	fn checked_weight(&self, key: &K, value: &V) -> Result<u64, CacheError> {
		let weight = self.weigher.weigh(key, value);
		if weight < 0 {
			return Err(CacheError::NegativeWeight {
				weight,
			});
		}
		Ok(weight as u64)
	}

	/// Sum of the weights of all entries currently present.
	///
	/// With the default weigher this is the entry count.
	pub fn size(&self) -> u64 {
		self.inner.lock().current_weight
	}

	/// The immutable weight budget.
	pub fn max_size(&self) -> u64 {
		self.max_weight
	}

	/// Number of entries currently present.
	pub fn len(&self) -> usize {
		self.inner.lock().store.len()
	}

	pub fn is_empty(&self) -> bool {
		self.inner.lock().store.is_empty()
	}

	/// Whether `key` is present, without touching its recency.
	pub fn contains(&self, key: &K) -> bool {
		self.inner.lock().store.peek(key).is_some()
	}

	/// Lookups that found the key present.
	pub fn hit_count(&self) -> u64 {
		self.inner.lock().hits
	}

	/// Lookups that found the key absent.
	pub fn miss_count(&self) -> u64 {
		self.inner.lock().misses
	}

	/// Values installed by a winning create-on-miss.
	pub fn create_count(&self) -> u64 {
		self.inner.lock().creates
	}

	/// `put` calls that committed.
	pub fn put_count(&self) -> u64 {
		self.inner.lock().puts
	}

	/// Entries evicted for capacity, plus the weight cleared by `evict_all`.
	pub fn eviction_count(&self) -> u64 {
		self.inner.lock().evictions
	}

	/// Defensive copy of the current contents in LRU→MRU order.
	///
	/// Does not mutate recency: the first key of the snapshot is the next
	/// eviction victim.
	pub fn snapshot(&self) -> IndexMap<K, Arc<V>> {
		let inner = self.inner.lock();
		inner.store.iter().map(|(key, value, _)| (key.clone(), Arc::clone(value))).collect()
	}

	/// Consistent snapshot of all counters and totals.
	pub fn metrics(&self) -> CacheMetrics {
		let inner = self.inner.lock();
		CacheMetrics {
			hits: inner.hits,
			misses: inner.misses,
			creates: inner.creates,
			puts: inner.puts,
			evictions: inner.evictions,
			current_weight: inner.current_weight,
			max_weight: self.max_weight,
			entry_count: inner.store.len(),
		}
	}
}
