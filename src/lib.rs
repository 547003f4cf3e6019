//! # critbit
//!
//! An ordered map keyed by byte strings, built on a crit-bit trie.
//!
//! Each internal node records only the first bit at which its two subtrees
//! differ; leaves carry the full keys. Lookups, inserts and removals cost
//! one branch decision per level plus a single key comparison, and
//! iteration yields keys in ascending lexicographic order.
//!
//! Two storage backends are available:
//!
//! - [`CritBitTree`] (backed by [`HeapStore`]) owns every node individually
//!   and frees nodes as soon as they are removed.
//! - [`PackedCritBitTree`] (backed by [`PackedStore`]) encodes nodes into
//!   fixed-size pages of an [`Arena`] with bump allocation. Memory is handed
//!   back only when the tree is cleared or dropped, and keys whose leaf does
//!   not fit in a page are rejected with [`Error::BlockTooLarge`].
//!
//! ## Example
//!
//! ```rust
//! use critbit::CritBitTree;
//!
//! let mut tree: CritBitTree<u64> = CritBitTree::new();
//! assert!(tree.insert(b"b", 1));
//! assert!(tree.insert(b"a", 2));
//! assert!(tree.insert(b"ab", 3));
//! assert!(!tree.insert(b"a", 4)); // already present, value kept
//!
//! assert_eq!(tree.get(b"a"), Some(&2));
//! let keys: Vec<&[u8]> = tree.keys().collect();
//! assert_eq!(keys, [&b"a"[..], b"ab", b"b"]);
//! ```
//!
//! ```rust
//! use critbit::{Config, Error, PackedCritBitTree};
//!
//! let config = Config::default().with_page_size(256);
//! let mut set: PackedCritBitTree = PackedCritBitTree::with_config(config)?;
//! assert_eq!(set.insert(b"hello", ()), Ok(true));
//! assert!(set.contains_key(b"hello"));
//! assert!(matches!(set.insert(&[0u8; 512], ()), Err(Error::BlockTooLarge { .. })));
//! set.dispose();
//! # Ok::<(), Error>(())
//! ```

#![deny(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs)]
#![warn(clippy::all)]

mod tracing_helpers;

pub mod arena;
mod bits;
mod config;
mod error;
mod iter;
pub mod store;
mod tree;

pub use arena::{Arena, ArenaStats};
pub use bits::Branch;
pub use config::{Config, MAX_PAGE_SIZE, MIN_PAGE_SIZE};
pub use error::{Error, Result};
pub use iter::{Iter, Keys, Values};
pub use store::{HeapStore, Node, NodeStore, PackedStore};
pub use tree::{CritBitTree, PackedCritBitTree};

#[cfg(test)]
mod proptests;
