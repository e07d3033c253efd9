//! Cache statistics snapshot.

/// A consistent snapshot of cache statistics.
///
/// All counters are taken under the cache lock in a single read, so the
/// fields are mutually consistent (unlike reading the individual accessors
/// back to back under concurrency).
///
/// # Example
///
/// ```
/// use recency_cache::Cache;
///
/// let cache: Cache<String, String> = Cache::new(1024).unwrap();
/// // ... perform cache operations ...
///
/// let metrics = cache.metrics();
/// println!("Hit rate: {:.2}%", metrics.hit_rate() * 100.0);
/// println!("Utilization: {:.2}%", metrics.utilization() * 100.0);
/// println!("Evictions: {}", metrics.evictions);
/// ```
#[non_exhaustive]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheMetrics {
	/// Lookups that found the key present.
	pub hits: u64,
	/// Lookups that found the key absent.
	pub misses: u64,
	/// Values installed by a winning create-on-miss.
	pub creates: u64,
	/// Explicit `put` calls that committed.
	pub puts: u64,
	/// Eviction counter: incremented once per capacity-evicted entry, and by
	/// the whole outstanding weight on `evict_all`.
	pub evictions: u64,
	/// Sum of the weights of all entries currently present.
	pub current_weight: u64,
	/// The immutable weight budget.
	pub max_weight: u64,
	/// Number of entries currently present.
	pub entry_count: usize,
}

impl CacheMetrics {
	/// Hit rate as a ratio between 0.0 and 1.0.
	///
	/// Returns 0.0 if there have been no lookups.
	pub fn hit_rate(&self) -> f64 {
		let total = self.hits + self.misses;
		if total == 0 {
			0.0
		} else {
			self.hits as f64 / total as f64
		}
	}

	/// Fraction of the weight budget currently in use, between 0.0 and 1.0.
	pub fn utilization(&self) -> f64 {
		if self.max_weight == 0 {
			0.0
		} else {
			self.current_weight as f64 / self.max_weight as f64
		}
	}

	/// Total number of lookups (hits + misses).
	pub fn total_accesses(&self) -> u64 {
		self.hits + self.misses
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_hit_rate_with_no_accesses() {
		let metrics = CacheMetrics::default();
		assert_eq!(metrics.hit_rate(), 0.0);
		assert_eq!(metrics.total_accesses(), 0);
	}

	#[test]
	fn test_hit_rate_and_utilization() {
		let metrics = CacheMetrics {
			hits: 3,
			misses: 1,
			current_weight: 50,
			max_weight: 200,
			..Default::default()
		};
		assert_eq!(metrics.hit_rate(), 0.75);
		assert_eq!(metrics.utilization(), 0.25);
		assert_eq!(metrics.total_accesses(), 4);
	}
}
