extern crate alloc;

use alloc::vec::Vec;
use core::fmt;
use core::ops::{Index, IndexMut};

/// Stable index of a node stored in an [`Arena`].
///
/// Handles stay valid until the node is removed from the arena; a removed
/// slot is recycled by the next insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct Handle(usize);

impl Handle {
    #[cfg(test)]
    pub(crate) fn index(self) -> usize {
        self.0
    }
}

/// A node in the arena: the stored value plus the links of the list that
/// currently orders it. A node that belongs to no list has both links unset.
struct Node<T> {
    value: T,
    prev: Option<Handle>,
    next: Option<Handle>,
}

/// Slot storage for list nodes.
///
/// Every node lives here for its whole lifetime, while any number of [`List`]s
/// thread their ordering through the `prev`/`next` links. Moving a node from
/// one list to another only rewrites links, the value never moves.
pub(crate) struct Arena<T> {
    slots: Vec<Option<Node<T>>>,
    free: Vec<usize>,
    len: usize,
}

impl<T> Arena<T> {
    /// Creates an empty arena with room for `capacity` nodes.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Arena {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            len: 0,
        }
    }

    /// Stores `value` in a free slot and returns its handle. The node is not
    /// linked into any list yet.
    pub(crate) fn insert(&mut self, value: T) -> Handle {
        let node = Node {
            value,
            prev: None,
            next: None,
        };
        let idx = match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = Some(node);
                idx
            }
            None => {
                self.slots.push(Some(node));
                self.slots.len() - 1
            }
        };
        self.len += 1;
        Handle(idx)
    }

    /// Frees the slot behind `handle` and returns its value.
    ///
    /// The node must already be detached from its list.
    pub(crate) fn remove(&mut self, handle: Handle) -> Option<T> {
        let node = self.slots.get_mut(handle.0)?.take()?;
        debug_assert!(node.prev.is_none() && node.next.is_none());
        self.free.push(handle.0);
        self.len -= 1;
        Some(node.value)
    }

    #[cfg(test)]
    pub(crate) fn get(&self, handle: Handle) -> Option<&T> {
        self.slots
            .get(handle.0)
            .and_then(|slot| slot.as_ref())
            .map(|node| &node.value)
    }

    #[cfg(test)]
    pub(crate) fn get_mut(&mut self, handle: Handle) -> Option<&mut T> {
        self.slots
            .get_mut(handle.0)
            .and_then(|slot| slot.as_mut())
            .map(|node| &mut node.value)
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Removes every node, yielding the values in slot order. Lists that
    /// pointed into the arena must be cleared as well.
    pub(crate) fn drain(&mut self) -> impl Iterator<Item = T> + '_ {
        self.free.clear();
        self.len = 0;
        self.slots.drain(..).flatten().map(|node| node.value)
    }

    fn node(&self, handle: Handle) -> &Node<T> {
        self.slots[handle.0]
            .as_ref()
            .expect("list handle points to a freed slot")
    }

    fn node_mut(&mut self, handle: Handle) -> &mut Node<T> {
        self.slots[handle.0]
            .as_mut()
            .expect("list handle points to a freed slot")
    }
}

impl<T> Index<Handle> for Arena<T> {
    type Output = T;

    fn index(&self, handle: Handle) -> &T {
        &self.node(handle).value
    }
}

impl<T> IndexMut<Handle> for Arena<T> {
    fn index_mut(&mut self, handle: Handle) -> &mut T {
        &mut self.node_mut(handle).value
    }
}

impl<T> fmt::Debug for Arena<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arena")
            .field("len", &self.len)
            .field("slots", &self.slots.len())
            .finish()
    }
}

/// A recency-ordered doubly linked list threaded through an [`Arena`].
///
/// The front is the most recently used node, the back the least recently
/// used. The list owns no values, only the head/tail handles and its length,
/// so every operation is O(1) and takes the arena explicitly.
///
/// A handle passed to `detach` or `move_to_front` must currently belong to
/// this list; the caller tracks which list owns which handle.
#[derive(Debug, Default)]
pub(crate) struct List {
    head: Option<Handle>,
    tail: Option<Handle>,
    len: usize,
}

impl List {
    pub(crate) fn new() -> Self {
        List {
            head: None,
            tail: None,
            len: 0,
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Most recently used handle.
    #[inline]
    pub(crate) fn front(&self) -> Option<Handle> {
        self.head
    }

    /// Least recently used handle.
    #[inline]
    pub(crate) fn back(&self) -> Option<Handle> {
        self.tail
    }

    /// Links a detached node in at the front.
    pub(crate) fn push_front<T>(&mut self, arena: &mut Arena<T>, handle: Handle) {
        let old_head = self.head;
        {
            let node = arena.node_mut(handle);
            debug_assert!(node.prev.is_none() && node.next.is_none());
            node.prev = None;
            node.next = old_head;
        }
        match old_head {
            Some(head) => arena.node_mut(head).prev = Some(handle),
            None => self.tail = Some(handle),
        }
        self.head = Some(handle);
        self.len += 1;
    }

    /// Unlinks a node from this list. The node stays in the arena.
    pub(crate) fn detach<T>(&mut self, arena: &mut Arena<T>, handle: Handle) {
        let (prev, next) = {
            let node = arena.node_mut(handle);
            (node.prev.take(), node.next.take())
        };
        match prev {
            Some(prev) => arena.node_mut(prev).next = next,
            None => self.head = next,
        }
        match next {
            Some(next) => arena.node_mut(next).prev = prev,
            None => self.tail = prev,
        }
        self.len -= 1;
    }

    /// Unlinks and returns the least recently used handle.
    #[cfg(test)]
    pub(crate) fn pop_back<T>(&mut self, arena: &mut Arena<T>) -> Option<Handle> {
        let tail = self.tail?;
        self.detach(arena, tail);
        Some(tail)
    }

    pub(crate) fn move_to_front<T>(&mut self, arena: &mut Arena<T>, handle: Handle) {
        if self.front() == Some(handle) {
            return;
        }
        self.detach(arena, handle);
        self.push_front(arena, handle);
    }

    /// Forgets every link without touching the arena.
    pub(crate) fn clear(&mut self) {
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    /// Iterates front (MRU) to back (LRU).
    pub(crate) fn iter<'a, T>(&self, arena: &'a Arena<T>) -> Iter<'a, T> {
        Iter {
            arena,
            next: self.head,
            remaining: self.len,
        }
    }
}

/// Front-to-back iterator over the values of a [`List`].
pub(crate) struct Iter<'a, T> {
    arena: &'a Arena<T>,
    next: Option<Handle>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        let handle = self.next?;
        let node = self.arena.node(handle);
        self.next = node.next;
        self.remaining -= 1;
        Some(&node.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> fmt::Debug for Iter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Iter")
            .field("remaining", &self.remaining)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::String;
    use alloc::vec;

    fn collect(list: &List, arena: &Arena<u32>) -> Vec<u32> {
        list.iter(arena).copied().collect()
    }

    fn push(list: &mut List, arena: &mut Arena<u32>, value: u32) -> Handle {
        let handle = arena.insert(value);
        list.push_front(arena, handle);
        handle
    }

    #[test]
    fn test_push_front_orders_most_recent_first() {
        let mut arena = Arena::with_capacity(4);
        let mut list = List::new();
        assert!(list.is_empty());
        assert_eq!(list.back(), None);

        let first = push(&mut list, &mut arena, 10);
        push(&mut list, &mut arena, 20);
        let last = push(&mut list, &mut arena, 30);

        assert_eq!(list.len(), 3);
        assert_eq!(list.front(), Some(last));
        assert_eq!(list.back(), Some(first));
        assert_eq!(collect(&list, &arena), vec![30, 20, 10]);
    }

    #[test]
    fn test_move_to_front() {
        let mut arena = Arena::with_capacity(3);
        let mut list = List::new();

        // front->30->20->10->back
        let node1 = push(&mut list, &mut arena, 10);
        let node2 = push(&mut list, &mut arena, 20);
        push(&mut list, &mut arena, 30);

        list.move_to_front(&mut arena, node1);
        assert_eq!(collect(&list, &arena), vec![10, 30, 20]);

        list.move_to_front(&mut arena, node2);
        assert_eq!(collect(&list, &arena), vec![20, 10, 30]);

        // Already at the front: no-op
        list.move_to_front(&mut arena, node2);
        assert_eq!(collect(&list, &arena), vec![20, 10, 30]);
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn test_detach_middle_head_and_tail() {
        let mut arena = Arena::with_capacity(4);
        let mut list = List::new();

        let a = push(&mut list, &mut arena, 1);
        let b = push(&mut list, &mut arena, 2);
        let c = push(&mut list, &mut arena, 3);
        let d = push(&mut list, &mut arena, 4);

        list.detach(&mut arena, b);
        assert_eq!(collect(&list, &arena), vec![4, 3, 1]);

        list.detach(&mut arena, d);
        assert_eq!(list.front(), Some(c));
        assert_eq!(collect(&list, &arena), vec![3, 1]);

        list.detach(&mut arena, a);
        assert_eq!(list.back(), Some(c));
        assert_eq!(collect(&list, &arena), vec![3]);

        list.detach(&mut arena, c);
        assert!(list.is_empty());
        assert_eq!(list.front(), None);
        assert_eq!(list.back(), None);

        // Detached nodes are still owned by the arena
        assert_eq!(arena.len(), 4);
        assert_eq!(arena.get(b), Some(&2));
    }

    #[test]
    fn test_pop_back() {
        let mut arena = Arena::with_capacity(3);
        let mut list = List::new();
        assert_eq!(list.pop_back(&mut arena), None);

        let a = push(&mut list, &mut arena, 10);
        let b = push(&mut list, &mut arena, 20);

        assert_eq!(list.pop_back(&mut arena), Some(a));
        assert_eq!(list.pop_back(&mut arena), Some(b));
        assert_eq!(list.pop_back(&mut arena), None);
        assert_eq!(list.len(), 0);
    }

    #[test]
    fn test_cross_list_node_transfer() {
        let mut arena = Arena::with_capacity(4);
        let mut window = List::new();
        let mut probation = List::new();

        let a = push(&mut window, &mut arena, 1);
        push(&mut window, &mut arena, 2);
        push(&mut probation, &mut arena, 3);

        // Move the LRU node of one list to the MRU end of another
        let tail = window.pop_back(&mut arena).unwrap();
        assert_eq!(tail, a);
        probation.push_front(&mut arena, tail);

        assert_eq!(collect(&window, &arena), vec![2]);
        assert_eq!(collect(&probation, &arena), vec![1, 3]);
        assert_eq!(window.len() + probation.len(), arena.len());
    }

    #[test]
    fn test_arena_reuses_freed_slots() {
        let mut arena: Arena<String> = Arena::with_capacity(2);
        let a = arena.insert(String::from("a"));
        let b = arena.insert(String::from("b"));
        assert_eq!(arena.len(), 2);

        assert_eq!(arena.remove(a), Some(String::from("a")));
        assert_eq!(arena.remove(a), None);
        assert_eq!(arena.len(), 1);

        let c = arena.insert(String::from("c"));
        assert_eq!(c.index(), a.index());
        assert_eq!(arena.get(c).map(String::as_str), Some("c"));
        assert_eq!(arena.get(b).map(String::as_str), Some("b"));

        if let Some(value) = arena.get_mut(b) {
            value.push_str("_modified");
        }
        assert_eq!(arena.get(b).map(String::as_str), Some("b_modified"));
    }

    #[test]
    fn test_drain_empties_arena() {
        let mut arena = Arena::with_capacity(3);
        let mut list = List::new();
        for v in 0..3 {
            push(&mut list, &mut arena, v);
        }

        list.clear();
        let mut drained: Vec<u32> = arena.drain().collect();
        drained.sort_unstable();
        assert_eq!(drained, vec![0, 1, 2]);
        assert!(arena.is_empty());
        assert!(list.is_empty());

        // Arena is usable again after draining
        let h = push(&mut list, &mut arena, 42);
        assert_eq!(arena.get(h), Some(&42));
    }

    #[test]
    fn test_length_consistency_after_complex_operations() {
        let mut arena = Arena::with_capacity(16);
        let mut list = List::new();
        let mut handles = Vec::new();

        for v in 0..10 {
            handles.push(push(&mut list, &mut arena, v));
        }
        for h in handles.iter().step_by(3) {
            list.move_to_front(&mut arena, *h);
        }
        for h in handles.iter().skip(1).step_by(2) {
            list.detach(&mut arena, *h);
            arena.remove(*h);
        }

        assert_eq!(list.len(), 5);
        assert_eq!(list.iter(&arena).len(), 5);
        assert_eq!(list.iter(&arena).count(), arena.len());
    }
}
