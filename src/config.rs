//! Configuration for the packed backend.

use crate::arena::{BLOCK_HEADER, DEFAULT_PAGE_SIZE};
use crate::error::{Error, Result};
use crate::store::packed::INTERNAL_BLOCK_SIZE;

/// Smallest usable page: one internal node block plus its header.
pub const MIN_PAGE_SIZE: usize = INTERNAL_BLOCK_SIZE + BLOCK_HEADER;

/// Largest usable page: block lengths and offsets are stored as `u32`.
pub const MAX_PAGE_SIZE: usize = u32::MAX as usize;

/// Configuration for a [`PackedCritBitTree`](crate::PackedCritBitTree).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Size of each arena page in bytes.
    ///
    /// The largest key the tree can hold is `page_size - 9` bytes (a 4-byte
    /// block header plus a 5-byte leaf header).
    pub page_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Config {
    /// Returns a copy with the given page size.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Checks that the configuration can back a tree.
    pub fn validate(&self) -> Result<()> {
        if (MIN_PAGE_SIZE..=MAX_PAGE_SIZE).contains(&self.page_size) {
            Ok(())
        } else {
            Err(Error::InvalidPageSize {
                page_size: self.page_size,
                min: MIN_PAGE_SIZE,
                max: MAX_PAGE_SIZE,
            })
        }
    }
}
