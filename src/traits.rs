//! Extension points supplied by the embedding application.
//!
//! All three behaviors are injected rather than inherited: the engine holds
//! them as trait objects, and blanket impls let plain closures plug in
//! directly through [`CacheBuilder`](crate::CacheBuilder).
//!
//! Every callback runs synchronously on the calling thread. The weigher and
//! removal listener are invoked while the cache's internal lock is held, so
//! they must not re-enter the same cache instance; the loader runs with the
//! lock released and may freely touch *other* keys of the same cache.

/// Computes the weight an entry counts toward the capacity budget.
///
/// A result `< 0` fails the surrounding operation with
/// [`CacheError::NegativeWeight`](crate::CacheError::NegativeWeight) before
/// anything is mutated. The default weigher returns `1` for every entry, so
/// the budget counts entries.
pub trait Weigher<K, V>: Send + Sync {
	/// Weight of `value` when stored under `key`.
	fn weigh(&self, key: &K, value: &V) -> i64;
}

impl<K, V, F> Weigher<K, V> for F
where
	F: Fn(&K, &V) -> i64 + Send + Sync,
{
	fn weigh(&self, key: &K, value: &V) -> i64 {
		self(key, value)
	}
}

/// Lazily computes a missing value during [`Cache::get`](crate::Cache::get).
///
/// Runs without the cache lock held, so a slow load never blocks operations
/// on other keys. Concurrent misses on the same key may each run the loader;
/// the first result committed wins and the rest are discarded (see
/// [`RemovalListener`]).
pub trait Loader<K, V>: Send + Sync {
	/// Produce a value for `key`, or `None` if the key cannot be populated.
	fn load(&self, key: &K) -> Option<V>;
}

impl<K, V, F> Loader<K, V> for F
where
	F: Fn(&K) -> Option<V> + Send + Sync,
{
	fn load(&self, key: &K) -> Option<V> {
		self(key)
	}
}

/// Observes every entry removal.
///
/// `evicted` is `true` only for capacity-triggered evictions. All other
/// paths pass `false`:
///
/// - overwrite by `put`: `new` is the replacing value,
/// - explicit `remove`: `new` is `None`,
/// - a created value losing the commit race: `old` is the discarded loser,
///   `new` is the committed winner.
///
/// [`Cache::evict_all`](crate::Cache::evict_all) is a bulk clear and fires
/// no per-entry notifications.
///
/// The listener runs while the cache lock is held and must not call back
/// into the same cache instance.
pub trait RemovalListener<K, V>: Send + Sync {
	/// An entry for `key` holding `old` was removed.
	fn on_removed(&self, evicted: bool, key: &K, old: &V, new: Option<&V>);
}

impl<K, V, F> RemovalListener<K, V> for F
where
	F: Fn(bool, &K, &V, Option<&V>) + Send + Sync,
{
	fn on_removed(&self, evicted: bool, key: &K, old: &V, new: Option<&V>) {
		self(evicted, key, old, new)
	}
}
