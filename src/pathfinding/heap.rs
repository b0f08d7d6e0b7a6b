//! Indexed binary min-heap with in-place decrease-key
//!
//! The heap keeps an auxiliary position table so a queued item's key can be
//! changed in O(log n) without a linear search. Items stay plain `Copy`
//! handles; the heap owns both the keys and the positions.

use std::hash::Hash;

use ahash::AHashMap;

#[derive(Debug, Clone)]
pub struct IndexedPriorityQueue<T, K> {
    heap: Vec<(T, K)>,
    positions: AHashMap<T, usize>,
}

impl<T, K> Default for IndexedPriorityQueue<T, K>
where
    T: Copy + Eq + Hash,
    K: Ord + Copy,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, K> IndexedPriorityQueue<T, K>
where
    T: Copy + Eq + Hash,
    K: Ord + Copy,
{
    pub fn new() -> Self {
        Self {
            heap: Vec::new(),
            positions: AHashMap::new(),
        }
    }

    /// Pre-size for at most `capacity` simultaneously queued items
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            heap: Vec::with_capacity(capacity),
            positions: AHashMap::with_capacity(capacity),
        }
    }

    /// Queue `item` under `key`
    ///
    /// The item must not already be queued; callers track membership
    /// themselves (an open-set flag).
    pub fn insert(&mut self, item: T, key: K) {
        debug_assert!(!self.positions.contains_key(&item), "item inserted twice");
        let index = self.heap.len();
        self.heap.push((item, key));
        self.positions.insert(item, index);
        self.sift_up(index);
    }

    /// Remove and return the item with the smallest key
    pub fn extract_min(&mut self) -> Option<(T, K)> {
        if self.heap.is_empty() {
            return None;
        }

        let last = self.heap.len() - 1;
        self.swap(0, last);
        let (item, key) = self.heap.pop()?;
        self.positions.remove(&item);

        if !self.heap.is_empty() {
            self.sift_down(0);
        }
        Some((item, key))
    }

    /// Re-key a queued item in place
    ///
    /// Returns false if the item is not queued. A key that grows is sifted
    /// down instead of up, so the heap order holds either way.
    pub fn decrease_key(&mut self, item: T, key: K) -> bool {
        let Some(&index) = self.positions.get(&item) else {
            return false;
        };

        let previous = self.heap[index].1;
        self.heap[index].1 = key;
        if key <= previous {
            self.sift_up(index);
        } else {
            self.sift_down(index);
        }
        true
    }

    pub fn peek(&self) -> Option<&(T, K)> {
        self.heap.first()
    }

    pub fn contains(&self, item: &T) -> bool {
        self.positions.contains_key(item)
    }

    pub fn key_of(&self, item: &T) -> Option<K> {
        self.positions.get(item).map(|&index| self.heap[index].1)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn clear(&mut self) {
        self.heap.clear();
        self.positions.clear();
    }

    fn sift_up(&mut self, mut index: usize) {
        while index > 0 {
            let parent = (index - 1) / 2;
            if self.heap[index].1 < self.heap[parent].1 {
                self.swap(index, parent);
                index = parent;
            } else {
                break;
            }
        }
    }

    fn sift_down(&mut self, mut index: usize) {
        let len = self.heap.len();
        loop {
            let left = index * 2 + 1;
            let right = left + 1;
            let mut smallest = index;

            if left < len && self.heap[left].1 < self.heap[smallest].1 {
                smallest = left;
            }
            if right < len && self.heap[right].1 < self.heap[smallest].1 {
                smallest = right;
            }
            if smallest == index {
                break;
            }

            self.swap(index, smallest);
            index = smallest;
        }
    }

    fn swap(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        self.heap.swap(a, b);
        self.positions.insert(self.heap[a].0, a);
        self.positions.insert(self.heap[b].0, b);
    }

    #[cfg(test)]
    fn is_valid_heap(&self) -> bool {
        let positions_match = self
            .heap
            .iter()
            .enumerate()
            .all(|(index, (item, _))| self.positions.get(item) == Some(&index));
        let ordered = (1..self.heap.len()).all(|i| self.heap[(i - 1) / 2].1 <= self.heap[i].1);
        positions_match && ordered && self.positions.len() == self.heap.len()
    }
}
