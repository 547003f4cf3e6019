//! In-order traversal.
//!
//! Child `0` is visited before child `1`, which yields leaves in ascending
//! key order. The traversal keeps an explicit stack of pending subtrees, so
//! deep tries do not recurse.

use std::iter::FusedIterator;
use std::marker::PhantomData;

use smallvec::SmallVec;

use crate::store::{Node, NodeStore};

/// Iterator over `(key, value)` pairs in ascending key order.
pub struct Iter<'a, V, S: NodeStore<V>> {
    store: &'a S,
    stack: SmallVec<[S::Ref; 32]>,
    remaining: usize,
    _marker: PhantomData<&'a V>,
}

impl<'a, V, S: NodeStore<V>> Iter<'a, V, S> {
    pub(crate) fn new(store: &'a S, root: Option<S::Ref>, len: usize) -> Self {
        let mut stack = SmallVec::new();
        stack.extend(root);
        Self {
            store,
            stack,
            remaining: len,
            _marker: PhantomData,
        }
    }
}

impl<'a, V: 'a, S: NodeStore<V>> Iterator for Iter<'a, V, S> {
    type Item = (&'a [u8], &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let store = self.store;
        while let Some(at) = self.stack.pop() {
            match store.node(at) {
                Node::Internal { children, .. } => {
                    self.stack.push(children[1]);
                    self.stack.push(children[0]);
                }
                Node::Leaf { key, value } => {
                    self.remaining -= 1;
                    return Some((key, value));
                }
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, V: 'a, S: NodeStore<V>> ExactSizeIterator for Iter<'a, V, S> {}

impl<'a, V: 'a, S: NodeStore<V>> FusedIterator for Iter<'a, V, S> {}

impl<'a, V, S: NodeStore<V>> Clone for Iter<'a, V, S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store,
            stack: self.stack.clone(),
            remaining: self.remaining,
            _marker: PhantomData,
        }
    }
}

/// Iterator over keys in ascending order.
pub struct Keys<'a, V, S: NodeStore<V>> {
    inner: Iter<'a, V, S>,
}

impl<'a, V, S: NodeStore<V>> Keys<'a, V, S> {
    pub(crate) fn new(inner: Iter<'a, V, S>) -> Self {
        Self { inner }
    }
}

impl<'a, V: 'a, S: NodeStore<V>> Iterator for Keys<'a, V, S> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, _)| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, V: 'a, S: NodeStore<V>> ExactSizeIterator for Keys<'a, V, S> {}

impl<'a, V: 'a, S: NodeStore<V>> FusedIterator for Keys<'a, V, S> {}

/// Iterator over values in ascending key order.
pub struct Values<'a, V, S: NodeStore<V>> {
    inner: Iter<'a, V, S>,
}

impl<'a, V, S: NodeStore<V>> Values<'a, V, S> {
    pub(crate) fn new(inner: Iter<'a, V, S>) -> Self {
        Self { inner }
    }
}

impl<'a, V: 'a, S: NodeStore<V>> Iterator for Values<'a, V, S> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, V: 'a, S: NodeStore<V>> ExactSizeIterator for Values<'a, V, S> {}

impl<'a, V: 'a, S: NodeStore<V>> FusedIterator for Values<'a, V, S> {}
