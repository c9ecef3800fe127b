//! Lazy iterators over a [`RadixTree`](crate::RadixTree).
//!
//! All of them borrow the tree, so it cannot change underneath an iteration;
//! a fresh call starts a fresh traversal.

use std::iter::FusedIterator;

use crate::arena::{Node, NodeArena, NodeId};

/// Depth-first walk yielding nodes that hold a value.
struct Dfs<'a, V> {
    arena: &'a NodeArena<V>,
    stack: Vec<NodeId>,
}

impl<'a, V> Dfs<'a, V> {
    fn new(arena: &'a NodeArena<V>, start: Option<NodeId>) -> Self {
        Self {
            arena,
            stack: start.into_iter().collect(),
        }
    }
}

impl<'a, V> Iterator for Dfs<'a, V> {
    type Item = (NodeId, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let arena = self.arena;
        while let Some(id) = self.stack.pop() {
            let node = arena.node(id);
            // Reversed so the smallest byte is popped first.
            self.stack.extend(node.children.iter().rev().map(|(_, child)| child));
            if let Some(value) = node.value.as_ref() {
                return Some((id, value));
            }
        }
        None
    }
}

/// Iterator over `(key, &value)` pairs. See [`RadixTree::iter`](crate::RadixTree::iter).
pub struct Iter<'a, V> {
    dfs: Dfs<'a, V>,
}

impl<'a, V> Iter<'a, V> {
    pub(crate) fn new(arena: &'a NodeArena<V>, start: Option<NodeId>) -> Self {
        Self {
            dfs: Dfs::new(arena, start),
        }
    }
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (Vec<u8>, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let (id, value) = self.dfs.next()?;
        Some((self.dfs.arena.key_of(id), value))
    }
}

impl<V> FusedIterator for Iter<'_, V> {}

/// Iterator over keys. See [`RadixTree::keys`](crate::RadixTree::keys).
pub struct Keys<'a, V> {
    inner: Iter<'a, V>,
}

impl<'a, V> Keys<'a, V> {
    pub(crate) fn new(inner: Iter<'a, V>) -> Self {
        Self { inner }
    }
}

impl<V> Iterator for Keys<'_, V> {
    type Item = Vec<u8>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, _)| key)
    }
}

impl<V> FusedIterator for Keys<'_, V> {}

/// Iterator over values. See [`RadixTree::values`](crate::RadixTree::values).
pub struct Values<'a, V> {
    dfs: Dfs<'a, V>,
    remaining: usize,
}

impl<'a, V> Values<'a, V> {
    pub(crate) fn new(arena: &'a NodeArena<V>, start: NodeId, len: usize) -> Self {
        Self {
            dfs: Dfs::new(arena, Some(start)),
            remaining: len,
        }
    }
}

impl<'a, V> Iterator for Values<'a, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        let (_, value) = self.dfs.next()?;
        self.remaining -= 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for Values<'_, V> {}
impl<V> FusedIterator for Values<'_, V> {}

/// Mutable iterator over values. See [`RadixTree::values_mut`](crate::RadixTree::values_mut).
pub struct ValuesMut<'a, V> {
    slots: std::slice::IterMut<'a, Node<V>>,
    remaining: usize,
}

impl<'a, V> ValuesMut<'a, V> {
    pub(crate) fn new(arena: &'a mut NodeArena<V>, len: usize) -> Self {
        Self {
            slots: arena.nodes_mut(),
            remaining: len,
        }
    }
}

impl<'a, V> Iterator for ValuesMut<'a, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<Self::Item> {
        // Free slots hold no value, so scanning every slot sees exactly the stored values.
        let value = self.slots.by_ref().find_map(|node| node.value.as_mut())?;
        self.remaining -= 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for ValuesMut<'_, V> {}
impl<V> FusedIterator for ValuesMut<'_, V> {}
