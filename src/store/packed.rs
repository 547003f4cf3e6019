//! Nodes encoded into arena pages.
//!
//! Block layouts (integers little-endian):
//!
//! ```text
//! leaf:     [tag=0][value_slot:4][key bytes ...]
//! internal: [tag=1][byte_index:4][mask:1][child0:8][child1:8]
//! ```
//!
//! Values are kept out of the pages in a side table indexed by
//! `value_slot`. Removing a leaf drops its value and recycles the slot, but
//! the arena bytes of the leaf and its parent stay allocated until the
//! arena is released.

use super::{sealed, Node, NodeStore};
use crate::arena::{read_u32, Arena, ArenaStats, BlockRef};
use crate::bits::Branch;
use crate::config::Config;
use crate::error::Error;

const TAG_LEAF: u8 = 0;
const TAG_INTERNAL: u8 = 1;

/// Bytes in front of the key in a leaf block.
pub(crate) const LEAF_HEADER_SIZE: usize = 1 + 4;

/// Size of an internal node block.
pub(crate) const INTERNAL_BLOCK_SIZE: usize = 1 + 4 + 1 + 2 * BlockRef::ENCODED_SIZE;

const CHILD_OFFSET: usize = 6;

/// Packed backend: arena-resident nodes, values in a side table.
///
/// Built through [`PackedCritBitTree::with_config`](crate::PackedCritBitTree::with_config),
/// which validates the configuration, or through `Default`.
pub struct PackedStore<V> {
    arena: Arena,
    values: Vec<Option<V>>,
    free_values: Vec<u32>,
}

impl<V> PackedStore<V> {
    /// `config` must have passed [`Config::validate`].
    pub(crate) fn new(config: Config) -> Self {
        Self {
            arena: Arena::with_valid_page_size(config.page_size),
            values: Vec::new(),
            free_values: Vec::new(),
        }
    }

    /// The configuration this store was built with.
    pub fn config(&self) -> Config {
        Config::default().with_page_size(self.arena.page_size())
    }

    /// Memory accounting of the underlying arena.
    pub fn arena_stats(&self) -> ArenaStats {
        self.arena.stats()
    }

    fn store_value(&mut self, value: V) -> u32 {
        if let Some(slot) = self.free_values.pop() {
            self.values[slot as usize] = Some(value);
            return slot;
        }
        let slot = u32::try_from(self.values.len()).expect("value count exceeds u32");
        self.values.push(Some(value));
        slot
    }

    #[inline]
    fn value_slot(block: &[u8]) -> usize {
        read_u32(&block[1..]) as usize
    }

    fn write_leaf(&mut self, key: &[u8], value: V) -> Result<BlockRef, Error> {
        let at = self.arena.rent(LEAF_HEADER_SIZE + key.len())?;
        let slot = self.store_value(value);
        let block = self.arena.block_mut(at);
        block[0] = TAG_LEAF;
        block[1..5].copy_from_slice(&slot.to_le_bytes());
        block[LEAF_HEADER_SIZE..].copy_from_slice(key);
        Ok(at)
    }
}

impl<V> Default for PackedStore<V> {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl<V> sealed::Sealed for PackedStore<V> {}

impl<V> NodeStore<V> for PackedStore<V> {
    type Ref = BlockRef;
    type Error = Error;

    #[inline]
    fn node(&self, at: BlockRef) -> Node<'_, V, BlockRef> {
        let block = self.arena.block(at);
        if block[0] == TAG_INTERNAL {
            let branch = Branch::new(read_u32(&block[1..]) as usize, block[5]);
            let children = [
                BlockRef::decode(&block[CHILD_OFFSET..]),
                BlockRef::decode(&block[CHILD_OFFSET + BlockRef::ENCODED_SIZE..]),
            ];
            return Node::Internal { branch, children };
        }

        debug_assert_eq!(block[0], TAG_LEAF);
        let value = self.values[Self::value_slot(block)]
            .as_ref()
            .expect("reachable leaf must have a live value");
        Node::Leaf {
            key: &block[LEAF_HEADER_SIZE..],
            value,
        }
    }

    fn value_mut(&mut self, at: BlockRef) -> Option<&mut V> {
        let block = self.arena.block(at);
        if block[0] != TAG_LEAF {
            return None;
        }
        let slot = Self::value_slot(block);
        self.values[slot].as_mut()
    }

    fn alloc_leaf(&mut self, key: &[u8], value: V) -> Result<BlockRef, Error> {
        self.write_leaf(key, value)
    }

    fn alloc_split(
        &mut self,
        key: &[u8],
        value: V,
        branch: Branch,
        sibling: BlockRef,
        sibling_direction: usize,
    ) -> Result<BlockRef, Error> {
        // Both blocks must fit before either is rented.
        self.arena.check(LEAF_HEADER_SIZE + key.len())?;
        self.arena.check(INTERNAL_BLOCK_SIZE)?;

        let leaf = self.write_leaf(key, value)?;
        let children = if sibling_direction == 0 {
            [sibling, leaf]
        } else {
            [leaf, sibling]
        };

        let at = self.arena.rent(INTERNAL_BLOCK_SIZE)?;
        let block = self.arena.block_mut(at);
        block[0] = TAG_INTERNAL;
        block[1..5].copy_from_slice(&(branch.byte_index() as u32).to_le_bytes());
        block[5] = branch.mask();
        block[CHILD_OFFSET..CHILD_OFFSET + BlockRef::ENCODED_SIZE]
            .copy_from_slice(&children[0].encode());
        block[CHILD_OFFSET + BlockRef::ENCODED_SIZE..].copy_from_slice(&children[1].encode());
        Ok(at)
    }

    fn set_child(&mut self, parent: BlockRef, direction: usize, child: BlockRef) {
        let block = self.arena.block_mut(parent);
        debug_assert_eq!(block[0], TAG_INTERNAL);
        let start = CHILD_OFFSET + direction * BlockRef::ENCODED_SIZE;
        block[start..start + BlockRef::ENCODED_SIZE].copy_from_slice(&child.encode());
    }

    fn release_leaf(&mut self, at: BlockRef) {
        let slot = Self::value_slot(self.arena.block(at));
        let old = self.values[slot].take();
        debug_assert!(old.is_some(), "double release of {at:?}");
        self.free_values.push(slot as u32);
    }

    fn release_internal(&mut self, _at: BlockRef) {
        // Arena blocks are reclaimed only with the whole arena.
    }

    fn clear(&mut self) {
        self.arena.release();
        self.values.clear();
        self.free_values.clear();
    }
}
