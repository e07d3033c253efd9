use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Barrier, OnceLock};
use std::thread;

use parking_lot::Mutex;
use recency_cache::{Cache, CacheBuilder};

#[test]
fn test_basic_operations() {
	let cache: Cache<String, String> = Cache::new(16).unwrap();

	let key = "test".to_string();
	let value = "hello world".to_string();

	assert_eq!(cache.put(key.clone(), value.clone()).unwrap(), None);
	assert!(cache.contains(&key));
	assert_eq!(cache.get(&key).unwrap().as_deref(), Some(&value));

	let removed = cache.remove(&key).expect("key should exist");
	assert_eq!(*removed, value);
	assert!(!cache.contains(&key));
	assert!(cache.is_empty());
}

#[test]
fn test_recency_scenario_end_to_end() {
	// Insert a..e into a budget of 5, touch b, a, d, then insert f: the
	// untouched c is the victim and the snapshot reads LRU to MRU.
	let cache: Cache<&str, &str> = Cache::new(5).unwrap();
	for key in ["a", "b", "c", "d", "e"] {
		cache.put(key, key).unwrap();
	}
	cache.get(&"b").unwrap();
	cache.get(&"a").unwrap();
	cache.get(&"d").unwrap();
	cache.put("f", "f").unwrap();

	let keys: Vec<&str> = cache.snapshot().keys().copied().collect();
	assert_eq!(keys, vec!["e", "b", "a", "d", "f"]);
	assert_eq!(cache.eviction_count(), 1);
}

#[test]
fn test_concurrent_access_stays_bounded() {
	const BUDGET: u64 = 100;
	let cache = Arc::new(
		CacheBuilder::new(BUDGET)
			.weigher(|_: &u64, value: &Vec<u8>| value.len() as i64)
			.build()
			.unwrap(),
	);

	let mut handles = vec![];
	for t in 0..4u64 {
		let cache = Arc::clone(&cache);
		handles.push(thread::spawn(move || {
			for i in 0..200 {
				let key = t * 1000 + i;
				cache.put(key, vec![0u8; 10]).unwrap();
				if let Some(value) = cache.get(&key).unwrap() {
					assert_eq!(value.len(), 10);
				}
			}
		}));
	}
	for handle in handles {
		handle.join().expect("thread should not panic");
	}

	// The budget holds after every completed operation, and the weight
	// total matches the surviving contents.
	assert!(cache.size() <= BUDGET);
	let weight_sum: u64 = cache.snapshot().values().map(|v| v.len() as u64).sum();
	assert_eq!(cache.size(), weight_sum);
}

#[test]
fn test_create_race_single_winner() {
	let discards: Arc<Mutex<Vec<(bool, String, u64, Option<u64>)>>> =
		Arc::new(Mutex::new(Vec::new()));
	let barrier = Arc::new(Barrier::new(2));
	let sequence = Arc::new(AtomicU64::new(0));

	let loader_barrier = Arc::clone(&barrier);
	let loader_sequence = Arc::clone(&sequence);
	let listener_discards = Arc::clone(&discards);

	let cache = Arc::new(
		CacheBuilder::new(16)
			.loader(move |_key: &String| {
				// Each call produces a distinct value, and neither thread
				// gets to commit before both have finished loading.
				let value = loader_sequence.fetch_add(1, Ordering::SeqCst);
				loader_barrier.wait();
				Some(value)
			})
			.removal_listener(move |evicted: bool, key: &String, old: &u64, new: Option<&u64>| {
				listener_discards.lock().push((evicted, key.clone(), *old, new.copied()));
			})
			.build()
			.unwrap(),
	);

	let mut handles = vec![];
	for _ in 0..2 {
		let cache = Arc::clone(&cache);
		handles.push(thread::spawn(move || {
			*cache.get(&"x".to_string()).unwrap().expect("loader produced a value")
		}));
	}
	let results: Vec<u64> =
		handles.into_iter().map(|h| h.join().expect("thread should not panic")).collect();

	// Exactly one entry, one committed create, and both callers observed
	// the same winning value.
	assert_eq!(cache.len(), 1);
	assert_eq!(cache.size(), 1);
	assert_eq!(cache.create_count(), 1);
	assert_eq!(cache.miss_count(), 2);
	let winner = *cache.get(&"x".to_string()).unwrap().expect("entry is present");
	assert_eq!(results, vec![winner, winner]);

	// The loser was reported exactly once: not an eviction, loser value
	// distinct from the winner, winner attached as the replacement.
	let discards = discards.lock();
	assert_eq!(discards.len(), 1);
	let (evicted, ref key, loser, new) = discards[0];
	assert!(!evicted);
	assert_eq!(key, "x");
	assert_ne!(loser, winner);
	assert_eq!(new, Some(winner));
}

#[test]
fn test_loader_may_touch_other_keys() {
	// The loader runs with the cache lock released, so populating one key
	// may read or write unrelated keys of the same cache.
	let slot: Arc<OnceLock<Arc<Cache<String, String>>>> = Arc::new(OnceLock::new());
	let loader_slot = Arc::clone(&slot);

	let cache = Arc::new(
		CacheBuilder::new(16)
			.loader(move |key: &String| {
				if key == "primary" {
					let cache = loader_slot.get().expect("cache is installed");
					cache.put("side".to_string(), "effect".to_string()).unwrap();
				}
				Some(key.to_uppercase())
			})
			.build()
			.unwrap(),
	);
	assert!(slot.set(Arc::clone(&cache)).is_ok());

	let loaded = cache.get(&"primary".to_string()).unwrap().expect("loader produced a value");
	assert_eq!(*loaded, "PRIMARY");
	assert_eq!(cache.get(&"side".to_string()).unwrap().as_deref(), Some(&"effect".to_string()));
	assert_eq!(cache.len(), 2);
	assert_eq!(cache.create_count(), 1);
	assert_eq!(cache.put_count(), 1);
}

#[test]
fn test_concurrent_mixed_workload_keeps_invariants() {
	let cache = Arc::new(
		CacheBuilder::new(64)
			.loader(|key: &u64| Some(*key))
			.build()
			.unwrap(),
	);

	let mut handles = vec![];
	for t in 0..4u64 {
		let cache = Arc::clone(&cache);
		handles.push(thread::spawn(move || {
			for i in 0..500 {
				let key = (t * 131 + i) % 96;
				match i % 3 {
					0 => {
						cache.put(key, key).unwrap();
					}
					1 => {
						cache.get(&key).unwrap();
					}
					_ => {
						cache.remove(&key);
					}
				}
			}
		}));
	}
	for handle in handles {
		handle.join().expect("thread should not panic");
	}

	assert!(cache.size() <= 64);
	assert_eq!(cache.size(), cache.len() as u64);
	assert_eq!(cache.snapshot().len(), cache.len());
}

#[test]
fn test_cache_is_send_sync() {
	fn assert_send<T: Send>() {}
	fn assert_sync<T: Sync>() {}

	assert_send::<Cache<String, Vec<u8>>>();
	assert_sync::<Cache<String, Vec<u8>>>();
}
