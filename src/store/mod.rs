//! Node storage backends.
//!
//! A [`CritBitTree`](crate::CritBitTree) only sees nodes through the
//! [`NodeStore`] trait: a store hands out copyable handles, decodes a handle
//! into a [`Node`] view, allocates leaves and branch nodes, rewires child
//! slots, and reclaims nodes that were unlinked.
//!
//! - [`HeapStore`] owns every node individually and frees it as soon as it is
//!   unlinked.
//! - [`PackedStore`] encodes nodes into blocks of a page [`Arena`] and only
//!   frees memory when the whole arena is released.
//!
//! [`Arena`]: crate::arena::Arena

pub mod heap;
pub mod packed;

pub use heap::HeapStore;
pub use packed::PackedStore;

use std::fmt;

use crate::bits::Branch;

mod sealed {
    pub trait Sealed {}
}

/// Decoded view of a single trie node.
#[derive(Debug)]
pub enum Node<'a, V, R> {
    /// A branch with exactly two children.
    Internal {
        /// Decision made at this node.
        branch: Branch,
        /// Child `0` and child `1`.
        children: [R; 2],
    },
    /// A stored entry.
    Leaf {
        /// The full key.
        key: &'a [u8],
        /// The associated value.
        value: &'a V,
    },
}

/// Storage backend of a [`CritBitTree`](crate::CritBitTree).
///
/// This trait is sealed; the crate provides [`HeapStore`] and
/// [`PackedStore`].
pub trait NodeStore<V>: sealed::Sealed {
    /// Handle to a node inside this store.
    type Ref: Copy + Eq + fmt::Debug;

    /// Error raised when the store cannot hold a node.
    type Error;

    /// Decode the node behind `at`.
    fn node(&self, at: Self::Ref) -> Node<'_, V, Self::Ref>;

    /// Mutable access to the value of the leaf behind `at`.
    fn value_mut(&mut self, at: Self::Ref) -> Option<&mut V>;

    /// Allocate a leaf holding a copy of `key`.
    fn alloc_leaf(&mut self, key: &[u8], value: V) -> Result<Self::Ref, Self::Error>;

    /// Allocate a leaf for `key` together with the branch node joining it to
    /// the existing subtree `sibling`.
    ///
    /// `sibling` becomes child `sibling_direction` of the new branch and the
    /// new leaf takes the other slot. Either both nodes are allocated or, on
    /// error, neither is.
    fn alloc_split(
        &mut self,
        key: &[u8],
        value: V,
        branch: Branch,
        sibling: Self::Ref,
        sibling_direction: usize,
    ) -> Result<Self::Ref, Self::Error>;

    /// Point child slot `direction` of the branch `parent` at `child`.
    fn set_child(&mut self, parent: Self::Ref, direction: usize, child: Self::Ref);

    /// Reclaim an unlinked leaf, dropping its value.
    fn release_leaf(&mut self, at: Self::Ref);

    /// Reclaim an unlinked branch node.
    fn release_internal(&mut self, at: Self::Ref);

    /// Drop every node at once.
    fn clear(&mut self);
}
