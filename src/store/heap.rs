//! Individually owned nodes.
//!
//! Nodes live in a slab of slots addressed by [`NodeId`]. Unlinking a node
//! drops its key and value on the spot and puts the slot on a free list, so
//! removed entries hold no memory beyond an empty slot.

use std::convert::Infallible;

use super::{sealed, Node, NodeStore};
use crate::bits::Branch;

/// Handle to a node in a [`HeapStore`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone)]
enum HeapNode<V> {
    Internal { branch: Branch, children: [NodeId; 2] },
    Leaf { key: Box<[u8]>, value: V },
}

/// Simple backend: one slab slot per node, reclaimed on unlink.
#[derive(Clone)]
pub struct HeapStore<V> {
    slots: Vec<Option<HeapNode<V>>>,
    free: Vec<NodeId>,
}

impl<V> HeapStore<V> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    /// Number of live nodes.
    pub fn live_nodes(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    fn alloc(&mut self, node: HeapNode<V>) -> NodeId {
        if let Some(id) = self.free.pop() {
            self.slots[id.index()] = Some(node);
            return id;
        }
        let id = NodeId(u32::try_from(self.slots.len()).expect("node count exceeds u32"));
        self.slots.push(Some(node));
        id
    }

    fn release(&mut self, at: NodeId) {
        let old = self.slots[at.index()].take();
        debug_assert!(old.is_some(), "double release of {at:?}");
        self.free.push(at);
    }

    #[inline]
    fn slot(&self, at: NodeId) -> &HeapNode<V> {
        self.slots[at.index()]
            .as_ref()
            .expect("node id refers to a released slot")
    }
}

impl<V> Default for HeapStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> sealed::Sealed for HeapStore<V> {}

impl<V> NodeStore<V> for HeapStore<V> {
    type Ref = NodeId;
    type Error = Infallible;

    #[inline]
    fn node(&self, at: NodeId) -> Node<'_, V, NodeId> {
        match self.slot(at) {
            HeapNode::Internal { branch, children } => Node::Internal {
                branch: *branch,
                children: *children,
            },
            HeapNode::Leaf { key, value } => Node::Leaf { key, value },
        }
    }

    fn value_mut(&mut self, at: NodeId) -> Option<&mut V> {
        match self.slots[at.index()].as_mut()? {
            HeapNode::Leaf { value, .. } => Some(value),
            HeapNode::Internal { .. } => None,
        }
    }

    fn alloc_leaf(&mut self, key: &[u8], value: V) -> Result<NodeId, Infallible> {
        Ok(self.alloc(HeapNode::Leaf {
            key: key.into(),
            value,
        }))
    }

    fn alloc_split(
        &mut self,
        key: &[u8],
        value: V,
        branch: Branch,
        sibling: NodeId,
        sibling_direction: usize,
    ) -> Result<NodeId, Infallible> {
        let leaf = self.alloc_leaf(key, value)?;
        let children = if sibling_direction == 0 {
            [sibling, leaf]
        } else {
            [leaf, sibling]
        };
        Ok(self.alloc(HeapNode::Internal { branch, children }))
    }

    fn set_child(&mut self, parent: NodeId, direction: usize, child: NodeId) {
        match self.slots[parent.index()].as_mut() {
            Some(HeapNode::Internal { children, .. }) => children[direction] = child,
            _ => debug_assert!(false, "{parent:?} is not a branch node"),
        }
    }

    fn release_leaf(&mut self, at: NodeId) {
        self.release(at);
    }

    fn release_internal(&mut self, at: NodeId) {
        self.release(at);
    }

    fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
    }
}
