use std::hash::Hash;

use crate::cache::Cache;
use crate::error::CacheError;
use crate::traits::{Loader, RemovalListener, Weigher};

/// Builder for configuring a [`Cache`].
///
/// # Example
///
/// ```
/// use recency_cache::CacheBuilder;
///
/// let cache = CacheBuilder::new(1024)
/// 	.weigher(|_key: &String, value: &Vec<u8>| value.len() as i64)
/// 	.loader(|key: &String| Some(key.as_bytes().to_vec()))
/// 	.build()
/// 	.unwrap();
///
/// let value = cache.get(&"abc".to_string()).unwrap().unwrap();
/// assert_eq!(value.as_slice(), b"abc");
/// ```
pub struct CacheBuilder<K, V> {
	max_weight: u64,
	weigher: Option<Box<dyn Weigher<K, V>>>,
	loader: Option<Box<dyn Loader<K, V>>>,
	listener: Option<Box<dyn RemovalListener<K, V>>>,
}

impl<K, V> CacheBuilder<K, V>
where
	K: Hash + Eq + Clone,
{
	/// Create a new builder with the given weight budget.
	pub fn new(max_weight: u64) -> Self {
		Self {
			max_weight,
			weigher: None,
			loader: None,
			listener: None,
		}
	}

	/// Set the per-entry weight function.
	///
	/// Default: every entry weighs 1, i.e. the budget counts entries.
	pub fn weigher(mut self, weigher: impl Weigher<K, V> + 'static) -> Self {
		self.weigher = Some(Box::new(weigher));
		self
	}

	/// Set the create-on-miss factory invoked by [`Cache::get`] for absent
	/// keys.
	///
	/// Default: none, so `get` on an absent key simply returns `None`.
	pub fn loader(mut self, loader: impl Loader<K, V> + 'static) -> Self {
		self.loader = Some(Box::new(loader));
		self
	}

	/// Set the listener notified on every entry removal.
	///
	/// Default: no listener.
	pub fn removal_listener(mut self, listener: impl RemovalListener<K, V> + 'static) -> Self {
		self.listener = Some(Box::new(listener));
		self
	}

	/// Build the cache with the configured settings.
	///
	/// Fails with [`CacheError::ZeroCapacity`] if the weight budget is 0.
	pub fn build(self) -> Result<Cache<K, V>, CacheError> {
		if self.max_weight == 0 {
			return Err(CacheError::ZeroCapacity);
		}
		let weigher = self.weigher.unwrap_or_else(|| Box::new(|_: &K, _: &V| 1_i64));
		Ok(Cache::from_parts(self.max_weight, weigher, self.loader, self.listener))
	}
}
