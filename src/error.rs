//! Error type for cache contract violations.

use thiserror::Error;

/// Errors surfaced by the cache.
///
/// Every variant is a synchronous, local contract violation. The cache
/// performs no I/O, so there is nothing transient to retry: an error means
/// the call was rejected before any state change was committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CacheError {
	/// The weight budget passed at construction was zero.
	#[error("cache capacity must be a positive weight")]
	ZeroCapacity,

	/// A [`Weigher`](crate::Weigher) returned a negative weight for an entry.
	///
	/// Checked before any mutation is committed, so the cache is left exactly
	/// as it was before the failing call.
	#[error("weigher returned negative weight {weight} for an entry")]
	NegativeWeight {
		/// The offending weigher result.
		weight: i64,
	},
}
