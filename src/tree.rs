//! The crit-bit trie.
//!
//! Internal nodes only hold a [`Branch`](crate::Branch): the byte index and otherbits mask
//! of the first bit at which their two subtrees differ. Leaves hold full
//! keys. Every lookup therefore ends at some leaf, and a final byte-wise
//! comparison decides whether the key is actually present.

use std::fmt;
use std::marker::PhantomData;

use crate::arena::ArenaStats;
use crate::bits::critical_branch;
use crate::config::Config;
use crate::error::Result;
use crate::iter::{Iter, Keys, Values};
use crate::store::{HeapStore, Node, NodeStore, PackedStore};
use crate::tracing_helpers::{debug_log, trace_log};

/// Where a subtree hangs: the root reference or a child slot of a branch.
#[derive(Clone, Copy, Debug)]
enum Slot<R> {
    Root,
    Child(R, usize),
}

/// An ordered map from byte strings to `V`.
///
/// The storage backend `S` decides how nodes are held: [`HeapStore`] (the
/// default) owns each node individually, [`PackedStore`] encodes them into
/// arena pages (see [`PackedCritBitTree`]).
///
/// Insertion never overwrites: inserting a key that is already present
/// leaves the stored value untouched and reports `false`.
pub struct CritBitTree<V, S: NodeStore<V> = HeapStore<V>> {
    pub(crate) store: S,
    pub(crate) root: Option<S::Ref>,
    len: usize,
    _marker: PhantomData<V>,
}

/// A [`CritBitTree`] whose nodes live in a page arena.
///
/// The default value type `()` turns it into a set of byte strings.
pub type PackedCritBitTree<V = ()> = CritBitTree<V, PackedStore<V>>;

impl<V, S: NodeStore<V>> CritBitTree<V, S> {
    fn from_store(store: S) -> Self {
        Self {
            store,
            root: None,
            len: 0,
            _marker: PhantomData,
        }
    }

    /// Create an empty tree.
    pub fn new() -> Self
    where
        S: Default,
    {
        Self::from_store(S::default())
    }

    /// Number of stored entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// `true` if the tree holds no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns a reference to the value stored under `key`.
    pub fn get(&self, key: &[u8]) -> Option<&V> {
        match self.find_leaf(key)? {
            (_, stored, value) if stored == key => Some(value),
            _ => None,
        }
    }

    /// Returns a mutable reference to the value stored under `key`.
    pub fn get_mut(&mut self, key: &[u8]) -> Option<&mut V> {
        let at = match self.find_leaf(key)? {
            (at, stored, _) if stored == key => at,
            _ => return None,
        };
        self.store.value_mut(at)
    }

    /// `true` if `key` is stored.
    pub fn contains_key(&self, key: &[u8]) -> bool {
        self.get(key).is_some()
    }

    /// Removes `key`, dropping its value. Returns `false` if it was absent.
    pub fn remove(&mut self, key: &[u8]) -> bool {
        let Some(mut at) = self.root else {
            return false;
        };

        // Parent branch, the leaf's sibling, and where the parent hangs.
        let mut above: Option<(S::Ref, S::Ref, Slot<S::Ref>)> = None;
        let mut slot = Slot::Root;
        loop {
            match self.store.node(at) {
                Node::Internal { branch, children } => {
                    let direction = branch.direction(key);
                    above = Some((at, children[1 - direction], slot));
                    slot = Slot::Child(at, direction);
                    at = children[direction];
                }
                Node::Leaf { key: stored, .. } => {
                    if stored != key {
                        return false;
                    }
                    break;
                }
            }
        }

        match above {
            None => self.root = None,
            Some((parent, sibling, parent_slot)) => {
                trace_log!(?parent_slot, "removing leaf and its parent branch");
                self.link(parent_slot, sibling);
                self.store.release_internal(parent);
            }
        }
        self.store.release_leaf(at);
        self.len -= 1;
        true
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.store.clear();
        self.root = None;
        self.len = 0;
    }

    /// Iterates over entries in ascending key order.
    pub fn iter(&self) -> Iter<'_, V, S> {
        Iter::new(&self.store, self.root, self.len)
    }

    /// Iterates over keys in ascending order.
    pub fn keys(&self) -> Keys<'_, V, S> {
        Keys::new(self.iter())
    }

    /// Iterates over values in ascending key order.
    pub fn values(&self) -> Values<'_, V, S> {
        Values::new(self.iter())
    }

    /// Descends to the leaf `key` would live in, using branch bits only.
    fn find_leaf(&self, key: &[u8]) -> Option<(S::Ref, &[u8], &V)> {
        self.root.map(|root| self.descend(root, key))
    }

    fn descend(&self, mut at: S::Ref, key: &[u8]) -> (S::Ref, &[u8], &V) {
        loop {
            match self.store.node(at) {
                Node::Internal { branch, children } => at = children[branch.direction(key)],
                Node::Leaf { key: stored, value } => return (at, stored, value),
            }
        }
    }

    fn link(&mut self, slot: Slot<S::Ref>, node: S::Ref) {
        match slot {
            Slot::Root => self.root = Some(node),
            Slot::Child(parent, direction) => self.store.set_child(parent, direction, node),
        }
    }

    fn insert_entry(&mut self, key: &[u8], value: V) -> std::result::Result<bool, S::Error> {
        let Some(root) = self.root else {
            self.root = Some(self.store.alloc_leaf(key, value)?);
            self.len = 1;
            return Ok(true);
        };

        // Compare against the leaf the new key lands on.
        let (_, best, _) = self.descend(root, key);
        let Some(branch) = critical_branch(key, best) else {
            return Ok(false);
        };
        let sibling_direction = branch.direction(best);

        // Walk down again from the root, stopping above the first branch that
        // decides on a later bit than the new one.
        let mut slot = Slot::Root;
        let mut at = root;
        while let Node::Internal {
            branch: here,
            children,
        } = self.store.node(at)
        {
            if here > branch {
                break;
            }
            let direction = here.direction(key);
            slot = Slot::Child(at, direction);
            at = children[direction];
        }

        let joined = self
            .store
            .alloc_split(key, value, branch, at, sibling_direction)?;
        self.link(slot, joined);
        self.len += 1;

        trace_log!(
            byte_index = branch.byte_index(),
            mask = branch.mask(),
            ?slot,
            "spliced branch"
        );
        Ok(true)
    }

    /// Debug helper: the branch of the root node, if it is internal.
    #[cfg(test)]
    pub(crate) fn root_branch(&self) -> Option<crate::bits::Branch> {
        match self.store.node(self.root?) {
            Node::Internal { branch, .. } => Some(branch),
            Node::Leaf { .. } => None,
        }
    }
}

impl<V> CritBitTree<V, HeapStore<V>> {
    /// Inserts `key` with `value` if the key is absent.
    ///
    /// Returns `false`, dropping `value`, when the key is already present.
    pub fn insert(&mut self, key: &[u8], value: V) -> bool {
        match self.insert_entry(key, value) {
            Ok(inserted) => inserted,
            Err(never) => match never {},
        }
    }
}

impl<V> CritBitTree<V, PackedStore<V>> {
    /// Create an empty tree with the given arena configuration.
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_store(PackedStore::new(config)))
    }

    /// Inserts `key` with `value` if the key is absent.
    ///
    /// Returns `Ok(false)`, dropping `value`, when the key is already present.
    /// Fails with [`Error::BlockTooLarge`](crate::Error::BlockTooLarge) when
    /// the key's leaf does not fit in an arena page; the tree is unchanged in
    /// that case.
    pub fn insert(&mut self, key: &[u8], value: V) -> Result<bool> {
        self.insert_entry(key, value)
    }

    /// The arena configuration.
    pub fn config(&self) -> Config {
        self.store.config()
    }

    /// Memory accounting of the arena.
    ///
    /// Removing entries does not lower `used_bytes`; only [`clear`] and
    /// [`dispose`] give pages back.
    ///
    /// [`clear`]: CritBitTree::clear
    /// [`dispose`]: CritBitTree::dispose
    pub fn arena_stats(&self) -> ArenaStats {
        self.store.arena_stats()
    }

    /// Tears the tree down, releasing every arena page at once.
    ///
    /// Dropping the tree does the same; this makes the release point explicit.
    pub fn dispose(mut self) {
        debug_log!(entries = self.len, "disposing packed tree");
        self.clear();
    }
}

impl<V, S: NodeStore<V> + Default> Default for CritBitTree<V, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: fmt::Debug, S: NodeStore<V>> fmt::Debug for CritBitTree<V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a, V, S: NodeStore<V>> IntoIterator for &'a CritBitTree<V, S> {
    type Item = (&'a [u8], &'a V);
    type IntoIter = Iter<'a, V, S>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: AsRef<[u8]>, V> Extend<(K, V)> for CritBitTree<V, HeapStore<V>> {
    /// Inserts every pair; pairs whose key is already present are skipped.
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key.as_ref(), value);
        }
    }
}

impl<K: AsRef<[u8]>, V> FromIterator<(K, V)> for CritBitTree<V, HeapStore<V>> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}
