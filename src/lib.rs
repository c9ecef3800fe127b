//! # radix-map
//!
//! A string-keyed map stored as an arena-allocated prefix tree, meant for
//! lookup tables where many keys share prefixes: command names, aliases,
//! completion candidates.
//!
//! - Nodes live in one growable arena and link to each other by index.
//! - Keys sharing a prefix share the nodes for it; each node keeps a small
//!   inline table of children.
//! - Removed keys give their nodes back to a free list, which is drained
//!   before the arena grows again.
//!
//! [`RadixTree`] is the single-owner container. [`RadixMap`] wraps it in a
//! reader-writer lock for sharing between threads.
//!
//! ## Example
//!
//! ```rust
//! use radix_map::RadixMap;
//!
//! let commands: RadixMap<u32> = RadixMap::with_capacity(16);
//! commands.insert("ab", 1);
//! commands.insert("ac", 2);
//!
//! assert_eq!(commands.get("ab"), Some(1));
//! assert_eq!(commands.remove("ab"), Some(1));
//! assert_eq!(commands.get("ab"), None);
//! assert_eq!(commands.values(), vec![2]);
//! assert_eq!(commands.len(), 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

mod arena;
mod children;
pub mod config;
pub mod error;
pub mod iter;
mod tree;

pub use config::Config;
pub use error::{Error, Result};
pub use tree::RadixTree;

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A [`RadixTree`] shared between threads.
///
/// Lookups take the lock in shared mode and run in parallel; insertions,
/// removals and `clear` take it exclusively, so a structural change is never
/// observed half done and no reader can see a node being freed or reused.
/// [`len`](Self::len) reads an atomic counter and never waits on the lock.
pub struct RadixMap<V> {
    inner: RwLock<RadixTree<V>>,
    /// Mirrors `inner.len()`, updated while the write lock is held.
    len: AtomicUsize,
}

impl<V> RadixMap<V> {
    /// Create an empty map with the default configuration.
    pub fn new() -> Self {
        Self::from_tree(RadixTree::new())
    }

    /// Create an empty map with room for `initial_capacity` nodes (not keys).
    pub fn with_capacity(initial_capacity: usize) -> Self {
        Self::from_tree(RadixTree::with_capacity(initial_capacity))
    }

    /// Create an empty map from explicit options.
    pub fn with_config(config: Config) -> Result<Self> {
        RadixTree::with_config(config).map(Self::from_tree)
    }

    fn from_tree(tree: RadixTree<V>) -> Self {
        Self {
            len: AtomicUsize::new(tree.len()),
            inner: RwLock::new(tree),
        }
    }

    /// Take the write lock. The returned guard stores the tree's key count
    /// into `len` when dropped, before the lock is released, so the counter
    /// stays right even if the mutation panics partway.
    fn write(&self) -> WriteGuard<'_, V> {
        WriteGuard {
            tree: self.inner.write(),
            len: &self.len,
        }
    }

    /// Insert a key-value pair, returning the previous value for the key.
    ///
    /// # Panics
    /// Panics if the map has a node ceiling that the key would exceed; see
    /// [`try_insert`](Self::try_insert).
    pub fn insert(&self, key: impl AsRef<[u8]>, value: V) -> Option<V> {
        self.write().insert(key, value)
    }

    /// Insert a key-value pair, failing without any change if the arena
    /// cannot provide the nodes the key needs.
    pub fn try_insert(&self, key: impl AsRef<[u8]>, value: V) -> Result<Option<V>> {
        self.write().try_insert(key, value)
    }

    /// Get a copy of the value for a key.
    pub fn get(&self, key: impl AsRef<[u8]>) -> Option<V>
    where
        V: Clone,
    {
        self.inner.read().get(key).cloned()
    }

    /// Run `f` on the value for a key under the read lock.
    ///
    /// Useful when values are handlers that cannot or should not be cloned.
    pub fn get_with<R>(&self, key: impl AsRef<[u8]>, f: impl FnOnce(&V) -> R) -> Option<R> {
        self.inner.read().get(key).map(f)
    }

    /// Check if a key exists.
    pub fn contains_key(&self, key: impl AsRef<[u8]>) -> bool {
        self.inner.read().contains_key(key)
    }

    /// Check if any key maps to `value`.
    pub fn contains_value(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.inner.read().contains_value(value)
    }

    /// Remove a key, returning its value.
    pub fn remove(&self, key: impl AsRef<[u8]>) -> Option<V> {
        self.write().remove(key)
    }

    /// Remove every key.
    pub fn clear(&self) {
        self.write().clear();
    }

    /// Insert every pair from `iter` under a single write lock.
    ///
    /// # Panics
    /// Panics like [`insert`](Self::insert) when a key does not fit under the
    /// node ceiling. The keys before it stay inserted and are counted by
    /// [`len`](Self::len).
    pub fn extend<K: AsRef<[u8]>>(&self, iter: impl IntoIterator<Item = (K, V)>) {
        self.write().extend(iter);
    }

    /// Insert every pair from `iter` under a single write lock, stopping at
    /// the first key that does not fit. See [`RadixTree::try_extend`].
    pub fn try_extend<K: AsRef<[u8]>>(
        &self,
        iter: impl IntoIterator<Item = (K, V)>,
    ) -> Result<()> {
        self.write().try_extend(iter)
    }

    /// Copy of every value at this instant. Later changes do not affect it.
    pub fn values(&self) -> Vec<V>
    where
        V: Clone,
    {
        self.inner.read().values().cloned().collect()
    }

    /// Copy of every `(key, value)` pair at this instant.
    pub fn snapshot(&self) -> Vec<(Vec<u8>, V)>
    where
        V: Clone,
    {
        self.inner
            .read()
            .iter()
            .map(|(k, v)| (k, v.clone()))
            .collect()
    }

    /// Keys starting with `prefix`, e.g. completion candidates for a partly typed command.
    pub fn keys_with_prefix(&self, prefix: impl AsRef<[u8]>) -> Vec<Vec<u8>> {
        self.inner
            .read()
            .iter_prefix(prefix)
            .map(|(k, _)| k)
            .collect()
    }

    /// Lock the map for reading and borrow the tree, for lazy iteration
    /// without copying. Writers wait until the guard is dropped.
    pub fn read(&self) -> RwLockReadGuard<'_, RadixTree<V>> {
        self.inner.read()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.len.load(Ordering::Acquire)
    }

    /// Check if the map is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Approximate heap bytes used by the tree structure.
    pub fn memory_usage(&self) -> usize {
        self.inner.read().memory_usage()
    }

    /// Unwrap the underlying tree.
    pub fn into_inner(self) -> RadixTree<V> {
        self.inner.into_inner()
    }
}

/// Exclusive access to the tree that republishes its key count on drop.
struct WriteGuard<'a, V> {
    tree: RwLockWriteGuard<'a, RadixTree<V>>,
    len: &'a AtomicUsize,
}

impl<V> Deref for WriteGuard<'_, V> {
    type Target = RadixTree<V>;

    fn deref(&self) -> &Self::Target {
        &self.tree
    }
}

impl<V> DerefMut for WriteGuard<'_, V> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.tree
    }
}

impl<V> Drop for WriteGuard<'_, V> {
    fn drop(&mut self) {
        // Runs before `tree` is dropped, so still under the write lock.
        self.len.store(self.tree.len(), Ordering::Release);
    }
}

impl<V> Default for RadixMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> From<RadixTree<V>> for RadixMap<V> {
    fn from(tree: RadixTree<V>) -> Self {
        Self::from_tree(tree)
    }
}

impl<V: Clone> Clone for RadixMap<V> {
    fn clone(&self) -> Self {
        Self::from_tree(self.inner.read().clone())
    }
}

impl<V: fmt::Debug> fmt::Debug for RadixMap<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.inner.read(), f)
    }
}

impl<K: AsRef<[u8]>, V> FromIterator<(K, V)> for RadixMap<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_tree(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod proptests;
