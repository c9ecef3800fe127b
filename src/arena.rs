//! Node arena with free-list reuse.
//!
//! Nodes refer to each other by [`NodeId`], a 32-bit index into one growable
//! vector. Growth may move the backing storage but never renumbers a node, so
//! parent and child links stay valid across it. Freed slots go on a free list
//! and are handed out again before the arena grows.

use tracing::{debug, trace};

use crate::children::ChildTable;
use crate::config::Config;
use crate::error::{Error, Result};

/// Index of a node inside a [`NodeArena`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub(crate) struct NodeId(u32);

impl NodeId {
    /// The root lives in the first slot and is never freed.
    pub(crate) const ROOT: NodeId = NodeId(0);

    /// # Panics
    /// Panics if `index` does not fit in 32 bits.
    #[inline]
    pub(crate) fn from_usize(index: usize) -> Self {
        assert!(index <= MAX_SLOTS, "node index too large");
        Self(index as u32)
    }

    #[inline]
    pub(crate) fn as_usize(self) -> usize {
        self.0 as usize
    }
}

/// Largest slot count addressable by a [`NodeId`].
const MAX_SLOTS: usize = u32::MAX as usize;

/// One byte position along some key's path.
#[derive(Clone, Debug)]
pub(crate) struct Node<V> {
    /// Present iff a stored key ends here.
    pub(crate) value: Option<V>,
    /// Byte consumed on the edge from the parent. Unused for the root.
    pub(crate) byte: u8,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: ChildTable,
}

impl<V> Node<V> {
    fn vacant() -> Self {
        Self {
            value: None,
            byte: 0,
            parent: None,
            children: ChildTable::default(),
        }
    }

    /// No value and no children: must not stay linked into the tree.
    #[inline]
    pub(crate) fn is_dead_leaf(&self) -> bool {
        self.value.is_none() && self.children.is_empty()
    }
}

#[derive(Clone, Debug)]
pub(crate) struct NodeArena<V> {
    nodes: Vec<Node<V>>,
    free: Vec<NodeId>,
    /// Slots reserved so far; `nodes.len()` never exceeds it.
    capacity: usize,
    /// Hard ceiling on slots.
    limit: usize,
}

impl<V> NodeArena<V> {
    /// Build an arena holding only the root. `config` must already be validated.
    ///
    /// The initial slots are reserved up front; if the allocator refuses them
    /// this fails with [`Error::CapacityExceeded`].
    pub(crate) fn new(config: &Config) -> Result<Self> {
        let limit = config.max_nodes.unwrap_or(MAX_SLOTS).clamp(1, MAX_SLOTS);
        let capacity = config.initial_capacity.clamp(1, limit);
        let mut nodes = Vec::new();
        nodes
            .try_reserve_exact(capacity)
            .map_err(|_| Error::CapacityExceeded {
                requested: capacity,
                limit,
            })?;
        nodes.push(Node::vacant());
        Ok(Self {
            nodes,
            free: Vec::new(),
            capacity,
            limit,
        })
    }

    #[inline]
    pub(crate) fn node(&self, id: NodeId) -> &Node<V> {
        &self.nodes[id.as_usize()]
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node<V> {
        &mut self.nodes[id.as_usize()]
    }

    /// Nodes currently in use, root included.
    #[inline]
    pub(crate) fn live(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    /// Slots ever handed out (live plus free).
    #[cfg(test)]
    pub(crate) fn slots(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub(crate) fn free_len(&self) -> usize {
        self.free.len()
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub(crate) fn limit(&self) -> usize {
        self.limit
    }

    /// Slots waiting on the free list, most recently freed last.
    #[cfg(test)]
    pub(crate) fn free_ids(&self) -> &[NodeId] {
        &self.free
    }

    /// Make sure the next `additional` calls to [`allocate`](Self::allocate)
    /// cannot fail, growing the backing store if the free list falls short.
    pub(crate) fn reserve(&mut self, additional: usize) -> Result<()> {
        let fresh = additional.saturating_sub(self.free.len());
        if fresh == 0 {
            return Ok(());
        }

        let requested = self.live().saturating_add(additional);
        let limit = self.limit;
        let exceeded = move || Error::CapacityExceeded { requested, limit };
        let required = self.nodes.len().checked_add(fresh).ok_or_else(exceeded)?;
        if required > limit {
            return Err(exceeded());
        }
        if required <= self.capacity {
            return Ok(());
        }

        let new_capacity = self.capacity.saturating_mul(2).max(required).min(self.limit);
        self.nodes
            .try_reserve_exact(new_capacity - self.nodes.len())
            .map_err(|_| exceeded())?;
        debug!(
            old_capacity = self.capacity,
            new_capacity, "growing node arena"
        );
        self.capacity = new_capacity;
        Ok(())
    }

    /// Hand out a node linked under `parent` by `byte`, reusing a freed slot
    /// when one is available.
    ///
    /// Only the node's own fields are set; linking it into the parent's child
    /// table is the caller's job.
    pub(crate) fn allocate(&mut self, byte: u8, parent: NodeId) -> Result<NodeId> {
        if let Some(id) = self.free.pop() {
            trace!(node = id.as_usize(), "reusing freed node");
            let node = self.node_mut(id);
            debug_assert!(node.is_dead_leaf() && node.parent.is_none());
            node.byte = byte;
            node.parent = Some(parent);
            return Ok(id);
        }

        self.reserve(1)?;
        let id = NodeId::from_usize(self.nodes.len());
        self.nodes.push(Node {
            byte,
            parent: Some(parent),
            ..Node::vacant()
        });
        Ok(id)
    }

    /// Reset every field of `id` and put it on the free list.
    ///
    /// The only way a node leaves the tree; the caller unlinks it from its
    /// parent first.
    pub(crate) fn free(&mut self, id: NodeId) -> Option<V> {
        debug_assert_ne!(id, NodeId::ROOT, "the root is never freed");
        // Every linked node other than the root has a parent; freed slots do not.
        debug_assert!(
            self.node(id).parent.is_some(),
            "double free of node {}",
            id.as_usize()
        );
        let node = std::mem::replace(self.node_mut(id), Node::vacant());
        self.free.push(id);
        node.value
    }

    /// Bytes on the path from the root down to `id`.
    pub(crate) fn key_of(&self, mut id: NodeId) -> Vec<u8> {
        let mut key = Vec::new();
        while let Some(parent) = self.node(id).parent {
            key.push(self.node(id).byte);
            id = parent;
        }
        key.reverse();
        key
    }

    /// Every slot, free ones included, in index order.
    pub(crate) fn nodes_mut(&mut self) -> std::slice::IterMut<'_, Node<V>> {
        self.nodes.iter_mut()
    }

    /// Drop every node except a blank root. Reserved capacity is kept.
    pub(crate) fn reset(&mut self) {
        self.nodes.truncate(1);
        self.nodes[NodeId::ROOT.as_usize()] = Node::vacant();
        self.free.clear();
    }

    /// Approximate heap bytes held by the arena.
    pub(crate) fn memory_usage(&self) -> usize {
        self.nodes.capacity() * std::mem::size_of::<Node<V>>()
            + self.free.capacity() * std::mem::size_of::<NodeId>()
            + self
                .nodes
                .iter()
                .map(|n| n.children.heap_bytes())
                .sum::<usize>()
    }
}
