//! Per-node child table.
//!
//! Children are kept as `(byte, node)` pairs sorted by byte. Most nodes in a
//! command or completion table have one or two children, so the first few
//! entries live inline in the node and only wide fan-out nodes spill to the heap.

use smallvec::SmallVec;

use crate::arena::NodeId;

/// Entries stored inline before the table spills to the heap.
const INLINE_CHILDREN: usize = 4;

#[derive(Clone, Default, Debug)]
pub(crate) struct ChildTable {
    entries: SmallVec<[(u8, NodeId); INLINE_CHILDREN]>,
}

impl ChildTable {
    #[inline]
    fn search(&self, byte: u8) -> Result<usize, usize> {
        self.entries.binary_search_by_key(&byte, |&(b, _)| b)
    }

    #[inline]
    pub(crate) fn get(&self, byte: u8) -> Option<NodeId> {
        self.search(byte).ok().map(|i| self.entries[i].1)
    }

    /// Map `byte` to `child`, returning the child it replaced.
    ///
    /// Mappings for other bytes are untouched.
    pub(crate) fn set(&mut self, byte: u8, child: NodeId) -> Option<NodeId> {
        match self.search(byte) {
            Ok(i) => Some(std::mem::replace(&mut self.entries[i].1, child)),
            Err(i) => {
                self.entries.insert(i, (byte, child));
                None
            }
        }
    }

    pub(crate) fn remove(&mut self, byte: u8) -> Option<NodeId> {
        let i = self.search(byte).ok()?;
        Some(self.entries.remove(i).1)
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Children in ascending byte order.
    pub(crate) fn iter(&self) -> impl DoubleEndedIterator<Item = (u8, NodeId)> + '_ {
        self.entries.iter().copied()
    }

    /// Heap bytes held by a spilled table.
    pub(crate) fn heap_bytes(&self) -> usize {
        if self.entries.spilled() {
            self.entries.capacity() * std::mem::size_of::<(u8, NodeId)>()
        } else {
            0
        }
    }
}
