use crate::error::LruError;

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use generational_arena::{Arena, Index};

/// Default capacity of [`LruCache::default`].
pub const DEFAULT_LRU_CAPACITY: usize = 10;

#[derive(Debug)]
struct Node<K, V> {
  key: K,
  value: V,
  next: Option<Index>,
  prev: Option<Index>,
}

/// A small, fixed-capacity, least-recently-used map.
///
/// Reads through [`get`](Self::get) and writes through [`put`](Self::put)
/// both mark the key as most recently used. Once full, inserting a new key
/// evicts the least recently used one.
///
/// ```
/// use sundry_cache::LruCache;
///
/// let mut cache = LruCache::new(2).unwrap();
/// cache.put("a", 1);
/// cache.put("b", 2);
/// cache.put("c", 3); // full: "a" is evicted
/// assert_eq!(cache.get(&"a"), None);
/// assert_eq!(cache.get(&"c"), Some(&3));
/// ```
pub struct LruCache<K: Eq + Hash + Clone, V> {
  // Arena stores all nodes contiguously.
  nodes: Arena<Node<K, V>>,
  // HashMap for O(1) lookup of a key to its node index in the arena.
  lookup: HashMap<K, Index>,
  // Head is the most-recently-used item.
  head: Option<Index>,
  // Tail is the least-recently-used item.
  tail: Option<Index>,
  capacity: usize,
}

impl<K: Eq + Hash + Clone, V> LruCache<K, V> {
  pub fn new(capacity: usize) -> Result<Self, LruError> {
    if capacity == 0 {
      return Err(LruError::ZeroCapacity);
    }
    Ok(Self {
      nodes: Arena::with_capacity(capacity),
      lookup: HashMap::with_capacity(capacity),
      head: None,
      tail: None,
      capacity,
    })
  }

  // Helper to unlink a node from the list.
  // This doesn't handle arena/map removal.
  fn unlink(&mut self, index: Index) {
    let node = &self.nodes[index];
    let prev_node_idx = node.prev;
    let next_node_idx = node.next;

    if let Some(prev_idx) = prev_node_idx {
      self.nodes[prev_idx].next = next_node_idx;
    } else {
      self.head = next_node_idx;
    }

    if let Some(next_idx) = next_node_idx {
      self.nodes[next_idx].prev = prev_node_idx;
    } else {
      self.tail = prev_node_idx;
    }
  }

  // Helper to push a node to the front (making it the new head).
  // Assumes the node is already in the arena.
  fn push_front_node(&mut self, index: Index) {
    let old_head_idx = self.head;
    self.nodes[index].next = old_head_idx;
    self.nodes[index].prev = None;
    self.head = Some(index);

    if let Some(old_head) = old_head_idx {
      self.nodes[old_head].prev = Some(index);
    }

    if self.tail.is_none() {
      self.tail = Some(index);
    }
  }

  fn touch(&mut self, index: Index) {
    if self.head != Some(index) {
      self.unlink(index);
      self.push_front_node(index);
    }
  }

  /// Returns the value for `key` and marks it most recently used.
  pub fn get(&mut self, key: &K) -> Option<&V> {
    let index = *self.lookup.get(key)?;
    self.touch(index);
    Some(&self.nodes[index].value)
  }

  /// Returns the value for `key` without changing its recency.
  pub fn peek(&self, key: &K) -> Option<&V> {
    self.lookup.get(key).map(|&index| &self.nodes[index].value)
  }

  /// Inserts or refreshes `key`. Returns the entry evicted to make room, if
  /// any. Overwriting an existing key never evicts.
  pub fn put(&mut self, key: K, value: V) -> Option<(K, V)> {
    if let Some(&index) = self.lookup.get(&key) {
      self.nodes[index].value = value;
      self.touch(index);
      return None;
    }

    let evicted = if self.lookup.len() >= self.capacity {
      self.pop_back()
    } else {
      None
    };

    let index = self.nodes.insert(Node {
      key: key.clone(),
      value,
      next: None,
      prev: None,
    });
    self.lookup.insert(key, index);
    self.push_front_node(index);
    evicted
  }

  pub fn contains(&self, key: &K) -> bool {
    self.lookup.contains_key(key)
  }

  pub fn remove(&mut self, key: &K) -> Option<V> {
    let index = self.lookup.remove(key)?;
    self.unlink(index);
    self.nodes.remove(index).map(|node| node.value)
  }

  fn pop_back(&mut self) -> Option<(K, V)> {
    let tail_index = self.tail?;
    self.unlink(tail_index);
    let node = self.nodes.remove(tail_index)?;
    self.lookup.remove(&node.key);
    Some((node.key, node.value))
  }

  pub fn len(&self) -> usize {
    self.lookup.len()
  }

  pub fn is_empty(&self) -> bool {
    self.lookup.is_empty()
  }

  pub fn capacity(&self) -> usize {
    self.capacity
  }

  pub fn clear(&mut self) {
    self.nodes.clear();
    self.lookup.clear();
    self.head = None;
    self.tail = None;
  }

  /// Keys from most to least recently used.
  pub fn keys(&self) -> Vec<K> {
    let mut keys = Vec::with_capacity(self.len());
    let mut current = self.head;
    while let Some(index) = current {
      keys.push(self.nodes[index].key.clone());
      current = self.nodes[index].next;
    }
    keys
  }
}

impl<K: Eq + Hash + Clone, V> Default for LruCache<K, V> {
  fn default() -> Self {
    Self {
      nodes: Arena::with_capacity(DEFAULT_LRU_CAPACITY),
      lookup: HashMap::with_capacity(DEFAULT_LRU_CAPACITY),
      head: None,
      tail: None,
      capacity: DEFAULT_LRU_CAPACITY,
    }
  }
}

impl<K: Eq + Hash + Clone + fmt::Debug, V> fmt::Debug for LruCache<K, V> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("LruCache")
      .field("capacity", &self.capacity)
      .field("keys", &self.keys())
      .finish()
  }
}
