//! Circular doubly-linked positional list.
//!
//! Nodes live in an arena and refer to each other by slot index, so the
//! ring has no owning cycles. Every insertion returns a generational
//! [`Handle`] that identifies that node (not its value) until it is
//! removed. Identity lookups therefore keep two equal values apart.
//!
//! # Invariants
//!
//! - `front` and `back` are both `None` exactly when the list is empty.
//! - When non-empty, `front.prev == back` and `back.next == front`.
//! - Walking `next` from `front` visits exactly `len` distinct nodes.
//!
//! # Example
//!
//! ```
//! use u_service_queue::list::OrderedList;
//!
//! let mut list = OrderedList::new();
//! let a = list.push_back("a");
//! list.push_back("c");
//! list.insert("b", 1).unwrap();
//!
//! assert_eq!(list.iter().copied().collect::<Vec<_>>(), vec!["a", "b", "c"]);
//! assert_eq!(list.index_of(a), Some(0));
//! assert_eq!(list.next_after(a), Some(&"b"));
//! ```

use std::fmt;
use std::iter::FusedIterator;

use crate::error::{QueueError, Result};

/// Stable identity of a node in an [`OrderedList`].
///
/// A handle goes stale once its node is removed; the slot generation is
/// bumped so a later node reusing the slot never matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle {
    index: usize,
    generation: u64,
}

#[derive(Debug, Clone)]
struct Node<T> {
    value: T,
    prev: usize,
    next: usize,
    linked: bool,
}

#[derive(Debug, Clone)]
struct Slot<T> {
    generation: u64,
    node: Option<Node<T>>,
}

/// A circular, doubly-linked sequence with 0-based positional access.
#[derive(Clone)]
pub struct OrderedList<T> {
    slots: Vec<Slot<T>>,
    free: Vec<usize>,
    front: Option<usize>,
    back: Option<usize>,
    len: usize,
}

impl<T> OrderedList<T> {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            front: None,
            back: None,
            len: 0,
        }
    }

    /// Number of elements in the ring.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the ring is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Element at position 0.
    pub fn front(&self) -> Option<&T> {
        self.front.map(|index| &self.node(index).value)
    }

    /// Element at position `len - 1`.
    pub fn back(&self) -> Option<&T> {
        self.back.map(|index| &self.node(index).value)
    }

    /// Element at `pos`. Fails unless `pos < len`.
    pub fn get(&self, pos: usize) -> Result<&T> {
        let index = self.locate(pos)?;
        Ok(&self.node(index).value)
    }

    /// Mutable element at `pos`. Fails unless `pos < len`.
    pub fn get_mut(&mut self, pos: usize) -> Result<&mut T> {
        let index = self.locate(pos)?;
        Ok(&mut self.node_mut(index).value)
    }

    /// Handle of the node at `pos`. Fails unless `pos < len`.
    pub fn handle_at(&self, pos: usize) -> Result<Handle> {
        let index = self.locate(pos)?;
        Ok(self.handle(index))
    }

    /// Value behind a handle, whether or not the node is currently linked.
    pub fn value(&self, handle: Handle) -> Option<&T> {
        self.resolve(handle).map(|index| &self.node(index).value)
    }

    /// Mutable value behind a handle.
    pub fn value_mut(&mut self, handle: Handle) -> Option<&mut T> {
        let index = self.resolve(handle)?;
        Some(&mut self.node_mut(index).value)
    }

    /// Whether `handle` refers to a node currently linked into the ring.
    pub fn contains(&self, handle: Handle) -> bool {
        self.resolve(handle)
            .is_some_and(|index| self.node(index).linked)
    }

    /// Position of the node identified by `handle`.
    ///
    /// Scans the ring from `front` and gives up after one full
    /// revolution. Returns `None` for stale or detached handles.
    pub fn index_of(&self, handle: Handle) -> Option<usize> {
        let target = self.resolve(handle)?;
        let front = self.front?;
        let mut cursor = front;
        let mut pos = 0;
        loop {
            if cursor == target {
                return Some(pos);
            }
            cursor = self.node(cursor).next;
            if cursor == front {
                return None;
            }
            pos += 1;
        }
    }

    /// Element following the node identified by `handle`.
    ///
    /// The ring wraps, so the successor of `back` is `front`. Returns
    /// `None` for stale or detached handles.
    pub fn next_after(&self, handle: Handle) -> Option<&T> {
        let index = self
            .resolve(handle)
            .filter(|&index| self.node(index).linked)?;
        Some(&self.node(self.node(index).next).value)
    }

    /// Appends at the tail.
    pub fn push_back(&mut self, value: T) -> Handle {
        let index = self.allocate(value);
        self.link(index, self.len);
        self.handle(index)
    }

    /// Inserts `value` before the element currently at `pos`.
    ///
    /// `pos == len` appends. Fails unless `pos <= len`.
    pub fn insert(&mut self, value: T, pos: usize) -> Result<Handle> {
        if pos > self.len {
            return Err(QueueError::OutOfRange { pos, len: self.len });
        }
        let index = self.allocate(value);
        self.link(index, pos);
        Ok(self.handle(index))
    }

    /// Unlinks and returns the element at `pos`. Fails unless `pos < len`.
    pub fn remove(&mut self, pos: usize) -> Result<T> {
        let index = self.locate(pos)?;
        self.unlink(index);
        Ok(self.release(index))
    }

    /// Removes the node identified by `handle`, linked or detached.
    pub fn remove_handle(&mut self, handle: Handle) -> Result<T> {
        let index = self.resolve(handle).ok_or(QueueError::NotFound)?;
        if self.node(index).linked {
            self.unlink(index);
        }
        Ok(self.release(index))
    }

    /// Takes a node out of the ring while keeping its handle and value.
    ///
    /// A detached node is invisible to positional access and iteration
    /// until [`attach`](Self::attach) links it back.
    pub fn detach(&mut self, handle: Handle) -> Result<()> {
        let index = self
            .resolve(handle)
            .filter(|&index| self.node(index).linked)
            .ok_or(QueueError::NotFound)?;
        self.unlink(index);
        Ok(())
    }

    /// Links a detached node back in before the element at `pos`.
    pub fn attach(&mut self, handle: Handle, pos: usize) -> Result<()> {
        let index = self.resolve(handle).ok_or(QueueError::NotFound)?;
        if self.node(index).linked {
            return Err(QueueError::invalid("node is already linked"));
        }
        if pos > self.len {
            return Err(QueueError::OutOfRange { pos, len: self.len });
        }
        self.link(index, pos);
        Ok(())
    }

    /// Iterates one revolution starting at the current `front`.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            entries: self.entries(),
        }
    }

    /// Like [`iter`](Self::iter), paired with each node's handle.
    pub fn entries(&self) -> Entries<'_, T> {
        Entries {
            list: self,
            cursor: self.front,
            remaining: self.len,
        }
    }

    /// Checks the ring invariants.
    ///
    /// `front.prev == back`, `back.next == front`, every hop is mirrored
    /// by its reverse link, and exactly `len` linked nodes are reachable.
    pub fn is_consistent(&self) -> bool {
        let (front, back) = match (self.front, self.back) {
            (None, None) => return self.len == 0,
            (Some(front), Some(back)) => (front, back),
            _ => return false,
        };
        if self.node(front).prev != back || self.node(back).next != front {
            return false;
        }

        let mut cursor = front;
        let mut count = 0;
        loop {
            let node = self.node(cursor);
            if !node.linked || self.node(node.next).prev != cursor {
                return false;
            }
            count += 1;
            if count > self.len {
                return false;
            }
            cursor = node.next;
            if cursor == front {
                break;
            }
        }
        count == self.len
    }

    // ======================== Internals ========================

    fn handle(&self, index: usize) -> Handle {
        Handle {
            index,
            generation: self.slots[index].generation,
        }
    }

    fn resolve(&self, handle: Handle) -> Option<usize> {
        let slot = self.slots.get(handle.index)?;
        (slot.generation == handle.generation && slot.node.is_some()).then_some(handle.index)
    }

    fn node(&self, index: usize) -> &Node<T> {
        match &self.slots[index].node {
            Some(node) => node,
            None => unreachable!("ring references vacant slot {index}"),
        }
    }

    fn node_mut(&mut self, index: usize) -> &mut Node<T> {
        match &mut self.slots[index].node {
            Some(node) => node,
            None => unreachable!("ring references vacant slot {index}"),
        }
    }

    fn locate(&self, pos: usize) -> Result<usize> {
        if pos >= self.len {
            return Err(QueueError::OutOfRange { pos, len: self.len });
        }
        Ok(self.slot_index(pos))
    }

    /// Walks from whichever end is closer. `pos` must be `< len`.
    fn slot_index(&self, pos: usize) -> usize {
        let (Some(front), Some(back)) = (self.front, self.back) else {
            unreachable!("positional walk on empty ring");
        };
        if pos <= self.len / 2 {
            (0..pos).fold(front, |cursor, _| self.node(cursor).next)
        } else {
            (pos + 1..self.len).fold(back, |cursor, _| self.node(cursor).prev)
        }
    }

    fn allocate(&mut self, value: T) -> usize {
        let node = Node {
            value,
            prev: 0,
            next: 0,
            linked: false,
        };
        match self.free.pop() {
            Some(index) => {
                self.slots[index].node = Some(node);
                index
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    node: Some(node),
                });
                self.slots.len() - 1
            }
        }
    }

    fn release(&mut self, index: usize) -> T {
        let slot = &mut self.slots[index];
        slot.generation += 1;
        let node = match slot.node.take() {
            Some(node) => node,
            None => unreachable!("double release of slot {index}"),
        };
        self.free.push(index);
        node.value
    }

    /// Splices an unlinked node in before position `pos` (`pos <= len`).
    fn link(&mut self, index: usize, pos: usize) {
        match self.front {
            None => {
                let node = self.node_mut(index);
                node.prev = index;
                node.next = index;
                self.front = Some(index);
                self.back = Some(index);
            }
            Some(front) => {
                let succ = if pos == self.len {
                    front
                } else {
                    self.slot_index(pos)
                };
                let pred = self.node(succ).prev;
                {
                    let node = self.node_mut(index);
                    node.prev = pred;
                    node.next = succ;
                }
                self.node_mut(pred).next = index;
                self.node_mut(succ).prev = index;
                if pos == 0 {
                    self.front = Some(index);
                }
                if pos == self.len {
                    self.back = Some(index);
                }
            }
        }
        self.node_mut(index).linked = true;
        self.len += 1;
    }

    fn unlink(&mut self, index: usize) {
        let (prev, next) = {
            let node = self.node(index);
            (node.prev, node.next)
        };
        if self.len == 1 {
            self.front = None;
            self.back = None;
        } else {
            self.node_mut(prev).next = next;
            self.node_mut(next).prev = prev;
            if self.front == Some(index) {
                self.front = Some(next);
            }
            if self.back == Some(index) {
                self.back = Some(prev);
            }
        }
        self.node_mut(index).linked = false;
        self.len -= 1;
    }
}

impl<T> Default for OrderedList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for OrderedList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T> FromIterator<T> for OrderedList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = Self::new();
        for value in iter {
            list.push_back(value);
        }
        list
    }
}

impl<'a, T> IntoIterator for &'a OrderedList<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over `(Handle, &T)` for one revolution of the ring.
pub struct Entries<'a, T> {
    list: &'a OrderedList<T>,
    cursor: Option<usize>,
    remaining: usize,
}

impl<'a, T> Iterator for Entries<'a, T> {
    type Item = (Handle, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let index = self.cursor?;
        let node = self.list.node(index);
        self.cursor = Some(node.next);
        self.remaining -= 1;
        Some((self.list.handle(index), &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Entries<'_, T> {}
impl<T> FusedIterator for Entries<'_, T> {}

/// Iterator over `&T` for one revolution of the ring.
pub struct Iter<'a, T> {
    entries: Entries<'a, T>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.entries.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}
impl<T> FusedIterator for Iter<'_, T> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(list: &OrderedList<i32>) -> Vec<i32> {
        list.iter().copied().collect()
    }

    #[test]
    fn test_empty_list() {
        let list: OrderedList<i32> = OrderedList::new();
        assert!(list.is_empty());
        assert_eq!(list.front(), None);
        assert_eq!(list.back(), None);
        assert_eq!(list.iter().count(), 0);
        assert!(list.is_consistent());
        assert_eq!(list.get(0), Err(QueueError::OutOfRange { pos: 0, len: 0 }));
    }

    #[test]
    fn test_insert_at_boundaries() {
        let mut list = OrderedList::new();
        list.insert(2, 0).unwrap();
        list.insert(1, 0).unwrap();
        list.insert(4, 2).unwrap();
        list.insert(3, 2).unwrap();

        assert_eq!(collect(&list), vec![1, 2, 3, 4]);
        assert_eq!(list.front(), Some(&1));
        assert_eq!(list.back(), Some(&4));
        assert!(list.is_consistent());
    }

    #[test]
    fn test_insert_out_of_range() {
        let mut list: OrderedList<i32> = (0..3).collect();
        assert_eq!(
            list.insert(9, 4),
            Err(QueueError::OutOfRange { pos: 4, len: 3 })
        );
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn test_get_bounds() {
        let list: OrderedList<i32> = (10..15).collect();
        assert_eq!(list.get(0), Ok(&10));
        assert_eq!(list.get(3), Ok(&13));
        assert_eq!(list.get(4), Ok(&14));
        assert_eq!(list.get(5), Err(QueueError::OutOfRange { pos: 5, len: 5 }));
    }

    #[test]
    fn test_remove_positions() {
        let mut list: OrderedList<i32> = (0..5).collect();
        assert_eq!(list.remove(0), Ok(0));
        assert_eq!(list.remove(3), Ok(4));
        assert_eq!(list.remove(1), Ok(2));
        assert_eq!(collect(&list), vec![1, 3]);
        assert_eq!(list.front(), Some(&1));
        assert_eq!(list.back(), Some(&3));
        assert!(list.is_consistent());

        assert_eq!(list.remove(2), Err(QueueError::OutOfRange { pos: 2, len: 2 }));
        list.remove(0).unwrap();
        list.remove(0).unwrap();
        assert!(list.is_empty());
        assert_eq!(list.front(), None);
        assert!(list.is_consistent());
    }

    #[test]
    fn test_identity_not_equality() {
        let mut list = OrderedList::new();
        let first = list.push_back(7);
        let second = list.push_back(7);
        list.push_back(8);

        assert_ne!(first, second);
        assert_eq!(list.index_of(first), Some(0));
        assert_eq!(list.index_of(second), Some(1));
        assert_eq!(list.next_after(second), Some(&8));
    }

    #[test]
    fn test_next_after_wraps_and_misses() {
        let mut list = OrderedList::new();
        list.push_back(1);
        let last = list.push_back(2);
        assert_eq!(list.next_after(last), Some(&1));

        list.remove_handle(last).unwrap();
        assert_eq!(list.index_of(last), None);
        assert_eq!(list.next_after(last), None);
    }

    #[test]
    fn test_next_after_detached_and_single() {
        let mut list = OrderedList::new();
        let only = list.push_back(1);
        assert_eq!(list.next_after(only), Some(&1));

        let tail = list.push_back(2);
        list.push_back(3);
        list.detach(tail).unwrap();
        assert_eq!(list.next_after(tail), None);
        assert_eq!(list.next_after(only), Some(&3));
        assert!(list.is_consistent());
    }

    #[test]
    fn test_stale_handle_after_slot_reuse() {
        let mut list = OrderedList::new();
        let old = list.push_back(1);
        list.remove(0).unwrap();
        let new = list.push_back(2);

        assert_eq!(list.value(old), None);
        assert_eq!(list.value(new), Some(&2));
        assert_eq!(list.remove_handle(old), Err(QueueError::NotFound));
    }

    #[test]
    fn test_detach_and_attach_keep_handle() {
        let mut list = OrderedList::new();
        let a = list.push_back('a');
        list.push_back('b');
        list.push_back('c');

        list.detach(a).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list.index_of(a), None);
        assert!(!list.contains(a));
        assert_eq!(list.value(a), Some(&'a'));
        assert!(list.is_consistent());

        list.attach(a, list.len()).unwrap();
        assert_eq!(list.iter().collect::<String>(), "bca");
        assert_eq!(list.index_of(a), Some(2));
        assert!(list.is_consistent());

        assert!(matches!(list.attach(a, 0), Err(QueueError::InvalidArgument(_))));
    }

    #[test]
    fn test_detach_only_element() {
        let mut list = OrderedList::new();
        let only = list.push_back(1);
        list.detach(only).unwrap();
        assert!(list.is_empty());
        assert!(list.is_consistent());
        assert_eq!(list.detach(only), Err(QueueError::NotFound));

        list.attach(only, 0).unwrap();
        assert_eq!(collect(&list), vec![1]);
        assert!(list.is_consistent());
    }

    #[test]
    fn test_iteration_is_restartable() {
        let mut list: OrderedList<i32> = (1..=4).collect();
        let first: Vec<_> = collect(&list);
        let second: Vec<_> = collect(&list);
        assert_eq!(first, second);
        assert_eq!(list.iter().len(), 4);

        list.remove(0).unwrap();
        assert_eq!(collect(&list), vec![2, 3, 4]);
    }

    #[test]
    fn test_get_mut_and_walk_from_back() {
        let mut list: OrderedList<i32> = (0..10).collect();
        *list.get_mut(8).unwrap() = 80;
        assert_eq!(list.get(8), Ok(&80));
        assert_eq!(list.get(9), Ok(&9));
        assert_eq!(list.handle_at(8).map(|h| list.index_of(h)), Ok(Some(8)));
    }

    #[test]
    fn test_ring_stays_consistent_under_churn() {
        let mut list = OrderedList::new();
        let mut handles = Vec::new();
        for i in 0..32 {
            let pos = (i * 7) % (list.len() + 1);
            handles.push(list.insert(i, pos).unwrap());
            assert!(list.is_consistent());
        }
        for (i, handle) in handles.into_iter().enumerate() {
            if i % 3 == 0 {
                list.remove_handle(handle).unwrap();
            } else if i % 3 == 1 {
                list.detach(handle).unwrap();
                list.attach(handle, list.len() / 2).unwrap();
            }
            assert!(list.is_consistent());
            assert_eq!(list.iter().count(), list.len());
        }
    }

    #[test]
    fn test_debug_lists_values() {
        let list: OrderedList<i32> = (1..=3).collect();
        assert_eq!(format!("{list:?}"), "[1, 2, 3]");
    }
}
