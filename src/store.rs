//! Recency-ordered backing store.
//!
//! A `RecencyStore` is a hash map from key to a slot in an arena-backed
//! doubly linked list ordered from least- to most-recently-touched entry.
//! Links are arena indices rather than pointers, so promotion to the MRU end
//! is an unlink/relink of two `usize` fields with no reallocation and no
//! `unsafe`. Freed slots are recycled through a free stack.
//!
//! The store is not thread-safe on its own; the engine wraps it in a mutex.

use std::hash::Hash;
use std::mem;

use ahash::RandomState;
use hashbrown::HashMap;

/// Sentinel for absent links.
const NIL: usize = usize::MAX;

struct Node<K, V> {
	key: K,
	value: V,
	weight: u64,
	prev: usize,
	next: usize,
}

/// Key→value map that also maintains a total LRU→MRU order.
///
/// Lookup, insert, removal, LRU pop, and promotion are all O(1).
pub(crate) struct RecencyStore<K, V> {
	map: HashMap<K, usize, RandomState>,
	arena: Vec<Option<Node<K, V>>>,
	free: Vec<usize>,
	/// LRU end of the list.
	head: usize,
	/// MRU end of the list.
	tail: usize,
}

impl<K, V> RecencyStore<K, V>
where
	K: Hash + Eq + Clone,
{
	pub(crate) fn new() -> Self {
		Self {
			map: HashMap::with_hasher(RandomState::new()),
			arena: Vec::new(),
			free: Vec::new(),
			head: NIL,
			tail: NIL,
		}
	}

	pub(crate) fn len(&self) -> usize {
		self.map.len()
	}

	pub(crate) fn is_empty(&self) -> bool {
		self.map.is_empty()
	}

	fn node(&self, idx: usize) -> &Node<K, V> {
		self.arena[idx].as_ref().expect("linked slot holds a live node")
	}

	fn node_mut(&mut self, idx: usize) -> &mut Node<K, V> {
		self.arena[idx].as_mut().expect("linked slot holds a live node")
	}

	/// Detach a node from the recency list, leaving its slot live.
	fn unlink(&mut self, idx: usize) {
		let (prev, next) = {
			let node = self.node(idx);
			(node.prev, node.next)
		};
		if prev == NIL {
			self.head = next;
		} else {
			self.node_mut(prev).next = next;
		}
		if next == NIL {
			self.tail = prev;
		} else {
			self.node_mut(next).prev = prev;
		}
	}

	/// Attach a detached node at the MRU end.
	fn push_mru(&mut self, idx: usize) {
		let tail = self.tail;
		{
			let node = self.node_mut(idx);
			node.prev = tail;
			node.next = NIL;
		}
		if tail == NIL {
			self.head = idx;
		} else {
			self.node_mut(tail).next = idx;
		}
		self.tail = idx;
	}

	/// Look up a value without touching its recency.
	pub(crate) fn peek(&self, key: &K) -> Option<&V> {
		let idx = *self.map.get(key)?;
		Some(&self.node(idx).value)
	}

	/// Look up a value and promote it to the MRU end.
	pub(crate) fn get(&mut self, key: &K) -> Option<&V> {
		let idx = *self.map.get(key)?;
		self.unlink(idx);
		self.push_mru(idx);
		Some(&self.node(idx).value)
	}

	/// Insert or replace an entry, leaving it at the MRU end.
	///
	/// Returns the previous value and weight when the key was present.
	pub(crate) fn insert(&mut self, key: K, value: V, weight: u64) -> Option<(V, u64)> {
		if let Some(&idx) = self.map.get(&key) {
			self.unlink(idx);
			self.push_mru(idx);
			let node = self.node_mut(idx);
			let old_value = mem::replace(&mut node.value, value);
			let old_weight = mem::replace(&mut node.weight, weight);
			return Some((old_value, old_weight));
		}

		let node = Node {
			key: key.clone(),
			value,
			weight,
			prev: NIL,
			next: NIL,
		};
		let idx = match self.free.pop() {
			Some(slot) => {
				self.arena[slot] = Some(node);
				slot
			}
			None => {
				self.arena.push(Some(node));
				self.arena.len() - 1
			}
		};
		self.push_mru(idx);
		self.map.insert(key, idx);
		None
	}

	/// Remove an entry by key.
	pub(crate) fn remove(&mut self, key: &K) -> Option<(V, u64)> {
		let idx = self.map.remove(key)?;
		self.unlink(idx);
		let node = self.arena[idx].take().expect("linked slot holds a live node");
		self.free.push(idx);
		Some((node.value, node.weight))
	}

	/// Remove and return the entry at the LRU end.
	pub(crate) fn remove_lru(&mut self) -> Option<(K, V, u64)> {
		let idx = self.head;
		if idx == NIL {
			return None;
		}
		self.unlink(idx);
		let node = self.arena[idx].take().expect("linked slot holds a live node");
		self.free.push(idx);
		self.map.remove(&node.key);
		Some((node.key, node.value, node.weight))
	}

	pub(crate) fn clear(&mut self) {
		self.map.clear();
		self.arena.clear();
		self.free.clear();
		self.head = NIL;
		self.tail = NIL;
	}

	/// Iterate entries from LRU to MRU without touching recency.
	pub(crate) fn iter(&self) -> Iter<'_, K, V> {
		Iter {
			store: self,
			cursor: self.head,
		}
	}
}

pub(crate) struct Iter<'a, K, V> {
	store: &'a RecencyStore<K, V>,
	cursor: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V>
where
	K: Hash + Eq + Clone,
{
	type Item = (&'a K, &'a V, u64);

	fn next(&mut self) -> Option<Self::Item> {
		if self.cursor == NIL {
			return None;
		}
		let node = self.store.node(self.cursor);
		self.cursor = node.next;
		Some((&node.key, &node.value, node.weight))
	}
}
