//! Cache Store Module
//!
//! The shared storage engine: a capacity-bounded map plus an intrusive
//! recency list giving O(1) lookup, insertion, removal, and reordering.
//! The store knows nothing about expiration; the cache variants layer
//! their TTL semantics on top of it.

use std::collections::HashMap;

// == Store Item ==
/// Capability every stored entry must expose to the store.
///
/// Each cache variant supplies its own concrete item type carrying
/// whatever metadata that policy needs (the expiring variants add an
/// expiration instant).
pub trait StoreItem {
    /// Value type held by the item.
    type Value;

    /// Composite key identifying the item.
    fn key(&self) -> &str;

    /// The stored value.
    fn value(&self) -> &Self::Value;
}

// == List Node ==
/// Arena slot linking an item into the recency list.
///
/// `prev` points toward the most-recently-used head, `next` toward the
/// least-recently-used tail.
#[derive(Debug)]
struct Node<I> {
    item: I,
    prev: Option<usize>,
    next: Option<usize>,
}

// == Cache Store ==
/// Bounded storage with O(1) recency-ordered eviction.
///
/// Keys index into a slot arena whose occupied slots form a doubly-linked
/// list ordered by recency: the head is the most-recently-touched entry,
/// the tail is the eviction candidate. Every key in the index owns exactly
/// one list position and vice versa.
///
/// The store itself is single-threaded; the cache variants guard it with
/// a reader/writer lock.
#[derive(Debug)]
pub struct CacheStore<I> {
    /// Key to arena-slot index
    index: HashMap<String, usize>,
    /// Slot arena; `None` marks a free slot
    slots: Vec<Option<Node<I>>>,
    /// Free slot indices available for reuse
    free: Vec<usize>,
    /// Most recently used entry
    head: Option<usize>,
    /// Least recently used entry
    tail: Option<usize>,
    /// Maximum number of entries; fixed at construction
    capacity: usize,
}

impl<I: StoreItem> CacheStore<I> {
    // == Constructor ==
    /// Creates an empty store holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            index: HashMap::with_capacity(capacity),
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            head: None,
            tail: None,
            capacity,
        }
    }

    // == Get ==
    /// Looks up an item and marks it most recently used.
    pub fn get(&mut self, key: &str) -> Option<&I> {
        let idx = *self.index.get(key)?;
        self.touch(idx);
        self.slots[idx].as_ref().map(|node| &node.item)
    }

    /// Like [`get`](Self::get) but hands back a mutable item, letting the
    /// expiring variants refresh an entry's expiration in place.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut I> {
        let idx = *self.index.get(key)?;
        self.touch(idx);
        self.slots[idx].as_mut().map(|node| &mut node.item)
    }

    // == Peek ==
    /// Looks up an item without touching its recency position.
    ///
    /// The background sweeper inspects sampled entries through this so a
    /// sweep pass never promotes dead entries to the hot end.
    pub fn peek(&self, key: &str) -> Option<&I> {
        let idx = *self.index.get(key)?;
        self.slots[idx].as_ref().map(|node| &node.item)
    }

    // == Put ==
    /// Inserts an item at the most-recently-used position.
    ///
    /// An existing item under the same key is replaced in place and moved
    /// to the front. When the insertion pushes the store over capacity,
    /// exactly one entry is evicted from the least-recently-used tail and
    /// returned.
    pub fn put(&mut self, item: I) -> Option<I> {
        if let Some(&idx) = self.index.get(item.key()) {
            let node = self.slots[idx].as_mut().expect("indexed slot occupied");
            node.item = item;
            self.touch(idx);
            return None;
        }

        let key = item.key().to_string();
        let idx = self.alloc(item);
        self.index.insert(key, idx);
        self.push_front(idx);

        if self.index.len() > self.capacity {
            return self.evict_lru();
        }
        None
    }

    // == Delete ==
    /// Removes an item by key, returning it. No-op on an absent key.
    pub fn delete(&mut self, key: &str) -> Option<I> {
        let idx = self.index.remove(key)?;
        self.unlink(idx);
        self.release(idx)
    }

    // == Accessors ==
    /// Whether an entry exists under `key`. Does not affect recency.
    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// All keys currently stored, in no particular order.
    pub fn keys(&self) -> Vec<String> {
        self.index.keys().cloned().collect()
    }

    /// Current number of entries.
    pub fn size(&self) -> usize {
        self.index.len()
    }

    /// Maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns true when the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    // == Sample Keys ==
    /// Up to `n` keys walking from the least-recently-used tail toward the
    /// head, oldest-touched first.
    ///
    /// Expired garbage concentrates at the cold end of the recency list,
    /// so the background sweeper gets a representative sample without
    /// scanning the whole table.
    pub fn sample_keys(&self, n: usize) -> Vec<String> {
        let mut sampled = Vec::with_capacity(n.min(self.index.len()));
        let mut cursor = self.tail;
        while let Some(idx) = cursor {
            if sampled.len() >= n {
                break;
            }
            let node = self.slots[idx].as_ref().expect("linked slot occupied");
            sampled.push(node.item.key().to_string());
            cursor = node.prev;
        }
        sampled
    }

    // == Clear ==
    /// Removes all entries.
    pub fn clear(&mut self) {
        self.index.clear();
        self.slots.clear();
        self.free.clear();
        self.head = None;
        self.tail = None;
    }

    // == Internal: recency list maintenance ==

    /// Moves an occupied slot to the most-recently-used head.
    fn touch(&mut self, idx: usize) {
        if self.head == Some(idx) {
            return;
        }
        self.unlink(idx);
        self.push_front(idx);
    }

    /// Detaches a slot from the list, patching its neighbors.
    fn unlink(&mut self, idx: usize) {
        let (prev, next) = {
            let node = self.slots[idx].as_ref().expect("linked slot occupied");
            (node.prev, node.next)
        };
        match prev {
            Some(p) => self.slots[p].as_mut().expect("linked slot occupied").next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.slots[n].as_mut().expect("linked slot occupied").prev = prev,
            None => self.tail = prev,
        }
        if let Some(node) = self.slots[idx].as_mut() {
            node.prev = None;
            node.next = None;
        }
    }

    /// Links a detached slot in at the head.
    fn push_front(&mut self, idx: usize) {
        let old_head = self.head;
        {
            let node = self.slots[idx].as_mut().expect("slot occupied");
            node.prev = None;
            node.next = old_head;
        }
        match old_head {
            Some(h) => self.slots[h].as_mut().expect("linked slot occupied").prev = Some(idx),
            None => self.tail = Some(idx),
        }
        self.head = Some(idx);
    }

    /// Removes and returns the least-recently-used item.
    fn evict_lru(&mut self) -> Option<I> {
        let idx = self.tail?;
        self.unlink(idx);
        let item = self.release(idx)?;
        self.index.remove(item.key());
        Some(item)
    }

    /// Places a new item into a free or fresh slot.
    fn alloc(&mut self, item: I) -> usize {
        let node = Node {
            item,
            prev: None,
            next: None,
        };
        match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = Some(node);
                idx
            }
            None => {
                self.slots.push(Some(node));
                self.slots.len() - 1
            }
        }
    }

    /// Empties a detached slot and recycles its index.
    fn release(&mut self, idx: usize) -> Option<I> {
        let node = self.slots[idx].take()?;
        self.free.push(idx);
        Some(node.item)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct TestItem {
        key: String,
        value: String,
    }

    impl TestItem {
        fn new(key: &str, value: &str) -> Self {
            Self {
                key: key.to_string(),
                value: value.to_string(),
            }
        }
    }

    impl StoreItem for TestItem {
        type Value = String;

        fn key(&self) -> &str {
            &self.key
        }

        fn value(&self) -> &String {
            &self.value
        }
    }

    #[test]
    fn test_store_new() {
        let store: CacheStore<TestItem> = CacheStore::new(10);
        assert_eq!(store.size(), 0);
        assert_eq!(store.capacity(), 10);
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_put_and_get() {
        let mut store = CacheStore::new(10);
        store.put(TestItem::new("key1", "value1"));

        let item = store.get("key1").unwrap();
        assert_eq!(item.value(), "value1");
        assert_eq!(store.size(), 1);
    }

    #[test]
    fn test_store_get_nonexistent() {
        let mut store: CacheStore<TestItem> = CacheStore::new(10);
        assert!(store.get("nonexistent").is_none());
    }

    #[test]
    fn test_store_overwrite_in_place() {
        let mut store = CacheStore::new(10);
        store.put(TestItem::new("key1", "value1"));
        store.put(TestItem::new("key1", "value2"));

        assert_eq!(store.get("key1").unwrap().value(), "value2");
        assert_eq!(store.size(), 1);
    }

    #[test]
    fn test_store_delete() {
        let mut store = CacheStore::new(10);
        store.put(TestItem::new("key1", "value1"));

        let removed = store.delete("key1").unwrap();
        assert_eq!(removed.value(), "value1");
        assert!(store.is_empty());
        assert!(store.get("key1").is_none());
    }

    #[test]
    fn test_store_delete_nonexistent_is_noop() {
        let mut store: CacheStore<TestItem> = CacheStore::new(10);
        assert!(store.delete("nonexistent").is_none());
        assert!(store.delete("nonexistent").is_none());
    }

    #[test]
    fn test_store_eviction_at_capacity() {
        let mut store = CacheStore::new(3);
        store.put(TestItem::new("key1", "v1"));
        store.put(TestItem::new("key2", "v2"));
        store.put(TestItem::new("key3", "v3"));

        // key1 is the coldest entry and must go.
        let evicted = store.put(TestItem::new("key4", "v4")).unwrap();
        assert_eq!(evicted.key(), "key1");

        assert_eq!(store.size(), 3);
        assert!(store.get("key1").is_none());
        assert!(store.get("key2").is_some());
        assert!(store.get("key3").is_some());
        assert!(store.get("key4").is_some());
    }

    #[test]
    fn test_store_get_refreshes_recency() {
        let mut store = CacheStore::new(2);
        store.put(TestItem::new("a", "1"));
        store.put(TestItem::new("b", "2"));

        // Touch "a" so "b" becomes the eviction candidate.
        store.get("a").unwrap();

        let evicted = store.put(TestItem::new("c", "3")).unwrap();
        assert_eq!(evicted.key(), "b");
        assert!(store.get("a").is_some());
        assert!(store.get("c").is_some());
    }

    #[test]
    fn test_store_overwrite_refreshes_recency() {
        let mut store = CacheStore::new(2);
        store.put(TestItem::new("a", "1"));
        store.put(TestItem::new("b", "2"));
        store.put(TestItem::new("a", "1b"));

        let evicted = store.put(TestItem::new("c", "3")).unwrap();
        assert_eq!(evicted.key(), "b");
    }

    #[test]
    fn test_store_capacity_invariant() {
        let mut store = CacheStore::new(5);
        for i in 0..100 {
            store.put(TestItem::new(&format!("key{i}"), "v"));
            assert!(store.size() <= store.capacity());
        }
        assert_eq!(store.size(), 5);
    }

    #[test]
    fn test_store_sample_keys_from_lru_end() {
        let mut store = CacheStore::new(10);
        store.put(TestItem::new("a", "1"));
        store.put(TestItem::new("b", "2"));
        store.put(TestItem::new("c", "3"));

        // Oldest-touched first.
        assert_eq!(store.sample_keys(2), vec!["a", "b"]);
        assert_eq!(store.sample_keys(10), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_store_sample_keys_tracks_recency() {
        let mut store = CacheStore::new(10);
        store.put(TestItem::new("a", "1"));
        store.put(TestItem::new("b", "2"));
        store.get("a");

        assert_eq!(store.sample_keys(1), vec!["b"]);
    }

    #[test]
    fn test_store_sample_keys_empty() {
        let store: CacheStore<TestItem> = CacheStore::new(10);
        assert!(store.sample_keys(5).is_empty());
    }

    #[test]
    fn test_store_keys_and_contains() {
        let mut store = CacheStore::new(10);
        store.put(TestItem::new("a", "1"));
        store.put(TestItem::new("b", "2"));

        let mut keys = store.keys();
        keys.sort();
        assert_eq!(keys, vec!["a", "b"]);
        assert!(store.contains("a"));
        assert!(!store.contains("z"));
    }

    #[test]
    fn test_store_clear() {
        let mut store = CacheStore::new(10);
        store.put(TestItem::new("a", "1"));
        store.put(TestItem::new("b", "2"));

        store.clear();
        assert!(store.is_empty());
        assert!(store.get("a").is_none());

        // Store remains usable after a clear.
        store.put(TestItem::new("c", "3"));
        assert_eq!(store.size(), 1);
    }

    #[test]
    fn test_store_slot_reuse_after_delete() {
        let mut store = CacheStore::new(3);
        store.put(TestItem::new("a", "1"));
        store.put(TestItem::new("b", "2"));
        store.delete("a");
        store.put(TestItem::new("c", "3"));
        store.put(TestItem::new("d", "4"));

        assert_eq!(store.size(), 3);
        assert!(store.get("b").is_some());
        assert!(store.get("c").is_some());
        assert!(store.get("d").is_some());
    }

    #[test]
    fn test_store_peek_does_not_refresh_recency() {
        let mut store = CacheStore::new(2);
        store.put(TestItem::new("a", "1"));
        store.put(TestItem::new("b", "2"));

        assert_eq!(store.peek("a").unwrap().value(), "1");

        // "a" is still the eviction candidate.
        let evicted = store.put(TestItem::new("c", "3")).unwrap();
        assert_eq!(evicted.key(), "a");
    }

    #[test]
    fn test_store_get_mut() {
        let mut store = CacheStore::new(10);
        store.put(TestItem::new("a", "1"));

        store.get_mut("a").unwrap().value = "patched".to_string();
        assert_eq!(store.get("a").unwrap().value(), "patched");
    }
}
