use std::cmp::Ordering;
use std::fmt::Debug;
use std::hash::Hash;

use super::FxHashMap;


/// Identity of an item stored in a [`PriorityQueue`].
///
/// Identity is deliberately separate from `Ord`: two items with the same key
/// are the same queue entry even when their priorities differ.
pub trait Keyed {
    type Key: Eq + Hash + Clone + Debug;

    fn key(&self) -> Self::Key;
}


/// Heap slot - the sequence number breaks ties between equal priorities
#[derive(Debug, Clone)]
struct Entry<T> {
    item: T,
    seq: u64,
}

impl<T: Ord> Entry<T> {
    fn precedes(&self, other: &Self) -> bool {
        match self.item.cmp(&other.item) {
            Ordering::Less => true,
            Ordering::Greater => false,
            Ordering::Equal => self.seq < other.seq,
        }
    }
}


/// Min-ordered priority queue with keyed lookup and true decrease-key.
///
/// Items live in a binary heap stored in a `Vec`, alongside a key -> slot
/// index. The smallest item under `Ord` comes out first; equal items come out
/// in insertion order. At most one entry per key is held at any time.
#[derive(Debug, Clone)]
pub struct PriorityQueue<T: Keyed> {
    heap: Vec<Entry<T>>,
    slots: FxHashMap<T::Key, usize>,
    next_seq: u64,
}

impl<T: Keyed + Ord> Default for PriorityQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Keyed + Ord> PriorityQueue<T> {

    pub fn new() -> Self {
        Self {
            heap: Vec::new(),
            slots: FxHashMap::default(),
            next_seq: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Insert `item`.
    /// If an entry with the same key is queued it is replaced and returned;
    /// the new item keeps the replaced entry's tie-break position.
    pub fn push(&mut self, item: T) -> Option<T> {
        let key = item.key();
        if let Some(&slot) = self.slots.get(&key) {
            let old = std::mem::replace(&mut self.heap[slot].item, item);
            self.restore(slot);
            return Some(old);
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Entry { item, seq });
        let slot = self.heap.len() - 1;
        self.slots.insert(key, slot);
        self.sift_up(slot);
        None
    }

    /// Remove and return the minimum item
    pub fn pop(&mut self) -> Option<T> {
        self.take(0)
    }

    /// Minimum item without removing it
    pub fn peek_min(&self) -> Option<&T> {
        self.heap.first().map(|entry| &entry.item)
    }

    /// Is an entry with the same identity as `item` queued?
    pub fn contains(&self, item: &T) -> bool {
        self.contains_key(&item.key())
    }

    pub fn contains_key(&self, key: &T::Key) -> bool {
        self.slots.contains_key(key)
    }

    /// Queued entry sharing `item`'s identity, whatever its priority.
    pub fn find(&self, item: &T) -> Option<&T> {
        self.find_key(&item.key())
    }

    pub fn find_key(&self, key: &T::Key) -> Option<&T> {
        self.slots.get(key).map(|&slot| &self.heap[slot].item)
    }

    /// Remove the entry sharing `item`'s identity.
    /// Returns false when nothing matched.
    pub fn remove(&mut self, item: &T) -> bool {
        self.remove_key(&item.key()).is_some()
    }

    pub fn remove_key(&mut self, key: &T::Key) -> Option<T> {
        let slot = *self.slots.get(key)?;
        self.take(slot)
    }

    pub fn clear(&mut self) {
        self.heap.clear();
        self.slots.clear();
    }

    /// Queued items in heap order (not sorted)
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.heap.iter().map(|entry| &entry.item)
    }

    /// Remove whatever sits at `slot`, patching the heap back together
    fn take(&mut self, slot: usize) -> Option<T> {
        if slot >= self.heap.len() {
            return None;
        }

        let last = self.heap.len() - 1;
        self.swap(slot, last);
        let entry = self.heap.pop()?;
        self.slots.remove(&entry.item.key());

        if slot < self.heap.len() {
            self.restore(slot);
        }
        Some(entry.item)
    }

    fn restore(&mut self, slot: usize) {
        if slot > 0 && self.heap[slot].precedes(&self.heap[(slot - 1) / 2]) {
            self.sift_up(slot);
        } else {
            self.sift_down(slot);
        }
    }

    fn sift_up(&mut self, mut slot: usize) {
        while slot > 0 {
            let parent = (slot - 1) / 2;
            if !self.heap[slot].precedes(&self.heap[parent]) {
                break;
            }
            self.swap(slot, parent);
            slot = parent;
        }
    }

    fn sift_down(&mut self, mut slot: usize) {
        let len = self.heap.len();
        loop {
            let left = 2 * slot + 1;
            let right = left + 1;
            let mut smallest = slot;

            if left < len && self.heap[left].precedes(&self.heap[smallest]) {
                smallest = left;
            }
            if right < len && self.heap[right].precedes(&self.heap[smallest]) {
                smallest = right;
            }
            if smallest == slot {
                break;
            }
            self.swap(slot, smallest);
            slot = smallest;
        }
    }

    fn swap(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        self.heap.swap(a, b);
        self.slots.insert(self.heap[a].item.key(), a);
        self.slots.insert(self.heap[b].item.key(), b);
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng, rngs::StdRng};

    /// Mirrors a search record: identity by id, order by priority
    #[derive(Debug, Clone, Copy)]
    struct Job {
        id: u32,
        priority: i64,
    }

    impl Keyed for Job {
        type Key = u32;
        fn key(&self) -> u32 {
            self.id
        }
    }

    impl PartialEq for Job {
        fn eq(&self, other: &Self) -> bool {
            self.priority == other.priority
        }
    }
    impl Eq for Job {}
    impl PartialOrd for Job {
        fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
            Some(self.cmp(other))
        }
    }
    impl Ord for Job {
        fn cmp(&self, other: &Self) -> Ordering {
            self.priority.cmp(&other.priority)
        }
    }

    fn job(id: u32, priority: i64) -> Job {
        Job { id, priority }
    }

    #[test]
    fn pops_in_non_decreasing_order() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut queue = PriorityQueue::new();
        for id in 0..200 {
            queue.push(job(id, rng.random_range(-50..50)));
        }

        let mut last = i64::MIN;
        let mut popped = 0;
        while let Some(item) = queue.pop() {
            assert!(item.priority >= last);
            last = item.priority;
            popped += 1;
        }
        assert_eq!(popped, 200);
        assert!(queue.is_empty());
    }

    #[test]
    fn equal_priorities_pop_in_insertion_order() {
        let mut queue = PriorityQueue::new();
        for id in [5, 3, 9, 1] {
            queue.push(job(id, 4));
        }
        let order: Vec<u32> = std::iter::from_fn(|| queue.pop()).map(|j| j.id).collect();
        assert_eq!(order, vec![5, 3, 9, 1]);
    }

    #[test]
    fn find_ignores_priority() {
        let mut queue = PriorityQueue::new();
        queue.push(job(1, 10));
        queue.push(job(2, 20));

        let found = queue.find(&job(2, -999)).unwrap();
        assert_eq!(found.id, 2);
        assert_eq!(found.priority, 20);
        assert!(queue.contains(&job(1, 0)));
        assert!(!queue.contains(&job(3, 10)));
    }

    #[test]
    fn remove_then_contains_is_false() {
        let mut queue = PriorityQueue::new();
        for id in 0..10 {
            queue.push(job(id, id as i64));
        }
        assert!(queue.remove(&job(4, 1000)));
        assert!(!queue.contains(&job(4, 4)));
        assert!(!queue.remove(&job(4, 4)));
        assert_eq!(queue.len(), 9);

        let order: Vec<u32> = std::iter::from_fn(|| queue.pop()).map(|j| j.id).collect();
        assert_eq!(order, vec![0, 1, 2, 3, 5, 6, 7, 8, 9]);
    }

    #[test]
    fn push_same_key_decreases_priority() {
        let mut queue = PriorityQueue::new();
        queue.push(job(1, 5));
        queue.push(job(2, 7));
        queue.push(job(3, 9));

        let replaced = queue.push(job(3, 1));
        assert_eq!(replaced.map(|j| j.priority), Some(9));
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.peek_min().map(|j| j.id), Some(3));
    }

    #[test]
    fn push_same_key_can_increase_priority() {
        let mut queue = PriorityQueue::new();
        queue.push(job(1, 1));
        queue.push(job(2, 2));
        queue.push(job(1, 10));

        assert_eq!(queue.pop().map(|j| j.id), Some(2));
        assert_eq!(queue.pop().map(|j| j.id), Some(1));
        assert_eq!(queue.pop().map(|j| j.id), None);
    }

    #[test]
    fn empty_queue_yields_nothing() {
        let mut queue: PriorityQueue<Job> = PriorityQueue::new();
        assert!(queue.peek_min().is_none());
        assert!(queue.pop().is_none());
        assert!(queue.remove_key(&0).is_none());
    }

    #[test]
    fn random_removals_keep_heap_valid() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut queue = PriorityQueue::new();
        for id in 0..100 {
            queue.push(job(id, rng.random_range(0..1000)));
        }
        for id in (0..100).step_by(3) {
            assert!(queue.remove_key(&id).is_some());
        }

        let mut last = i64::MIN;
        while let Some(item) = queue.pop() {
            assert!(item.id % 3 != 0);
            assert!(item.priority >= last);
            last = item.priority;
        }
    }
}
