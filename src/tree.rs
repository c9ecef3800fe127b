//! Single-owner prefix tree.

use std::fmt;

use tracing::{debug, trace, warn};

use crate::arena::{NodeArena, NodeId};
use crate::config::Config;
use crate::error::Result;
use crate::iter::{Iter, Keys, Values, ValuesMut};

/// A byte-string keyed map stored as a prefix tree in a node arena.
///
/// Every key byte is one node; keys sharing a prefix share the nodes for it.
/// Nodes are addressed by index, freed nodes are recycled through a free
/// list, and the arena doubles (up to an optional ceiling) when it runs out.
///
/// The empty key is allowed and is stored on the root.
///
/// `RadixTree` needs `&mut self` to mutate. For shared access from several
/// threads use [`RadixMap`](crate::RadixMap).
#[derive(Clone)]
pub struct RadixTree<V> {
    pub(crate) arena: NodeArena<V>,
    count: usize,
}

impl<V> RadixTree<V> {
    /// Create an empty tree with the default [`Config`].
    pub fn new() -> Self {
        Self::with_capacity(Config::default().initial_capacity)
    }

    /// Create an empty tree with room for `initial_capacity` nodes before the
    /// first growth. A capacity of zero is rounded up to one (the root).
    ///
    /// # Panics
    /// Panics if the allocator refuses the initial reservation. Use
    /// [`with_config`](Self::with_config) to get an error instead.
    pub fn with_capacity(initial_capacity: usize) -> Self {
        let config = Config::default().with_initial_capacity(initial_capacity.max(1));
        Self::with_config(config).unwrap_or_else(|err| panic!("RadixTree::with_capacity: {err}"))
    }

    /// Create an empty tree from explicit options.
    ///
    /// Fails with [`Error::InvalidCapacity`](crate::Error::InvalidCapacity) on
    /// inconsistent options and with
    /// [`Error::CapacityExceeded`](crate::Error::CapacityExceeded) if the
    /// initial node slots cannot be reserved.
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            arena: NodeArena::new(&config)?,
            count: 0,
        })
    }

    /// Number of stored keys.
    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    /// Whether no key is stored.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Live nodes, root included.
    pub fn node_count(&self) -> usize {
        self.arena.live()
    }

    /// Node slots reserved before the next growth.
    pub fn capacity(&self) -> usize {
        self.arena.capacity()
    }

    /// Freed node slots waiting for reuse.
    pub fn free_nodes(&self) -> usize {
        self.arena.free_len()
    }

    /// Hard ceiling on live nodes.
    pub fn max_nodes(&self) -> usize {
        self.arena.limit()
    }

    /// Approximate heap bytes held by the tree, excluding heap data owned by values.
    pub fn memory_usage(&self) -> usize {
        self.arena.memory_usage()
    }

    /// Follow `key` from the root as far as it goes.
    ///
    /// Returns the deepest node reached and how many bytes of `key` it consumed.
    fn descend(&self, key: &[u8]) -> (NodeId, usize) {
        let mut current = NodeId::ROOT;
        for (depth, &byte) in key.iter().enumerate() {
            match self.arena.node(current).children.get(byte) {
                Some(child) => current = child,
                None => return (current, depth),
            }
        }
        (current, key.len())
    }

    /// The node `key` ends on, if its whole path exists.
    pub(crate) fn find(&self, key: &[u8]) -> Option<NodeId> {
        let (node, matched) = self.descend(key);
        (matched == key.len()).then_some(node)
    }

    /// Value stored under `key`. Walks one node per key byte and allocates nothing.
    pub fn get(&self, key: impl AsRef<[u8]>) -> Option<&V> {
        let node = self.find(key.as_ref())?;
        self.arena.node(node).value.as_ref()
    }

    /// Mutable access to the value stored under `key`.
    pub fn get_mut(&mut self, key: impl AsRef<[u8]>) -> Option<&mut V> {
        let node = self.find(key.as_ref())?;
        self.arena.node_mut(node).value.as_mut()
    }

    /// Whether `key` is stored.
    pub fn contains_key(&self, key: impl AsRef<[u8]>) -> bool {
        self.get(key).is_some()
    }

    /// Whether any key maps to a value equal to `value`. Linear in the number of nodes.
    pub fn contains_value(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.values().any(|v| v == value)
    }

    /// Insert `value` under `key`, returning the value it replaced.
    ///
    /// Every node the key still needs is reserved before the tree is touched,
    /// so on [`Error::CapacityExceeded`](crate::Error::CapacityExceeded) the
    /// tree is unchanged.
    pub fn try_insert(&mut self, key: impl AsRef<[u8]>, value: V) -> Result<Option<V>> {
        let key = key.as_ref();
        let (mut current, matched) = self.descend(key);
        let missing = key.len() - matched;

        if let Err(err) = self.arena.reserve(missing) {
            warn!(key_len = key.len(), missing, %err, "insert refused");
            return Err(err);
        }

        for &byte in &key[matched..] {
            let child = self.arena.allocate(byte, current)?;
            self.arena.node_mut(current).children.set(byte, child);
            current = child;
        }

        let old = self.arena.node_mut(current).value.replace(value);
        if old.is_none() {
            self.count += 1;
        }
        Ok(old)
    }

    /// Insert `value` under `key`, returning the value it replaced.
    ///
    /// # Panics
    /// Panics if the tree was built with a node ceiling and the key needs more
    /// nodes than are left. Use [`try_insert`](Self::try_insert) for bounded trees.
    pub fn insert(&mut self, key: impl AsRef<[u8]>, value: V) -> Option<V> {
        self.try_insert(key, value)
            .unwrap_or_else(|err| panic!("RadixTree::insert: {err}"))
    }

    /// Insert every pair from `iter`, stopping at the first key that does not fit.
    ///
    /// Pairs before the refused one stay inserted; the refused pair and the
    /// rest of `iter` are dropped. Each insert is all-or-nothing, so the tree
    /// is consistent either way.
    pub fn try_extend<K: AsRef<[u8]>>(
        &mut self,
        iter: impl IntoIterator<Item = (K, V)>,
    ) -> Result<()> {
        for (key, value) in iter {
            self.try_insert(key, value)?;
        }
        Ok(())
    }

    /// Remove `key`, returning its value.
    ///
    /// Nodes left without a value or children are unlinked and freed, walking
    /// up until an ancestor still holds a value or other children.
    pub fn remove(&mut self, key: impl AsRef<[u8]>) -> Option<V> {
        let node = self.find(key.as_ref())?;
        let old = self.arena.node_mut(node).value.take()?;
        self.count -= 1;
        self.prune(node);
        Some(old)
    }

    fn prune(&mut self, mut current: NodeId) {
        while current != NodeId::ROOT && self.arena.node(current).is_dead_leaf() {
            let node = self.arena.node(current);
            let byte = node.byte;
            // Only the root lacks a parent.
            let Some(parent) = node.parent else { break };

            let unlinked = self.arena.node_mut(parent).children.remove(byte);
            debug_assert_eq!(unlinked, Some(current));
            self.arena.free(current);
            trace!(node = current.as_usize(), "pruned dead leaf");
            current = parent;
        }
    }

    /// Remove every key. Reserved node capacity is kept.
    pub fn clear(&mut self) {
        debug!(keys = self.count, nodes = self.arena.live(), "clearing tree");
        self.arena.reset();
        self.count = 0;
    }

    /// Iterate over `(key, value)` pairs in depth-first order.
    ///
    /// No particular key order is promised.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter::new(&self.arena, Some(NodeId::ROOT))
    }

    /// Iterate over every entry whose key starts with `prefix`.
    pub fn iter_prefix(&self, prefix: impl AsRef<[u8]>) -> Iter<'_, V> {
        Iter::new(&self.arena, self.find(prefix.as_ref()))
    }

    /// Iterate over stored keys, in the same order as [`iter`](Self::iter).
    pub fn keys(&self) -> Keys<'_, V> {
        Keys::new(self.iter())
    }

    /// Depth-first iteration over stored values. Lazy: nothing is collected up front.
    pub fn values(&self) -> Values<'_, V> {
        Values::new(&self.arena, NodeId::ROOT, self.count)
    }

    /// Mutable iteration over stored values, in arena slot order.
    pub fn values_mut(&mut self) -> ValuesMut<'_, V> {
        ValuesMut::new(&mut self.arena, self.count)
    }
}

impl<V> Default for RadixTree<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: fmt::Debug> fmt::Debug for RadixTree<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.iter()
                    .map(|(k, v)| (String::from_utf8_lossy(&k).into_owned(), v)),
            )
            .finish()
    }
}

/// # Panics
/// Panics like [`RadixTree::insert`] when a key does not fit under the node
/// ceiling; the keys before it stay inserted. Use [`RadixTree::try_extend`]
/// for bounded trees.
impl<K: AsRef<[u8]>, V> Extend<(K, V)> for RadixTree<V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K: AsRef<[u8]>, V> FromIterator<(K, V)> for RadixTree<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl<'a, V> IntoIterator for &'a RadixTree<V> {
    type Item = (Vec<u8>, &'a V);
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
