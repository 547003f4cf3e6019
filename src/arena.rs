//! Page arena for the packed backend.
//!
//! The arena owns a list of fixed-size pages and carves blocks off the
//! current page with a bump cursor. Blocks are never freed one by one:
//! when a request does not fit the rest of the current page a new page is
//! opened and the tail of the old one is left unused. Memory comes back only
//! when the whole arena is released.
//!
//! Each block is preceded by a 4-byte little-endian length header, so a
//! [`BlockRef`] (page number and offset) is enough to recover the block.

use crate::config::{Config, MAX_PAGE_SIZE, MIN_PAGE_SIZE};
use crate::error::{Error, Result};
use crate::tracing_helpers::{debug_log, warn_log};

/// Default page size in bytes.
pub const DEFAULT_PAGE_SIZE: usize = 1024;

/// Bytes of bookkeeping in front of every block.
pub const BLOCK_HEADER: usize = 4;

/// Handle to a block rented from an [`Arena`].
///
/// A handle is only meaningful to the arena that issued it, and only until
/// that arena is released.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BlockRef {
    page: u32,
    offset: u32,
}

impl BlockRef {
    /// Size of a handle stored inside another block.
    pub(crate) const ENCODED_SIZE: usize = 8;

    #[inline]
    pub(crate) fn encode(self) -> [u8; Self::ENCODED_SIZE] {
        let mut out = [0u8; Self::ENCODED_SIZE];
        out[..4].copy_from_slice(&self.page.to_le_bytes());
        out[4..].copy_from_slice(&self.offset.to_le_bytes());
        out
    }

    #[inline]
    pub(crate) fn decode(bytes: &[u8]) -> Self {
        Self {
            page: read_u32(bytes),
            offset: read_u32(&bytes[4..]),
        }
    }
}

#[inline]
pub(crate) fn read_u32(bytes: &[u8]) -> u32 {
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

/// Memory accounting for an [`Arena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ArenaStats {
    /// Number of pages currently owned.
    pub pages: usize,
    /// Bytes reserved by those pages.
    pub reserved_bytes: usize,
    /// Bytes handed out, headers included.
    pub used_bytes: usize,
}

/// A bump allocator over fixed-size pages.
pub struct Arena {
    pages: Vec<Box<[u8]>>,
    /// Offset of the first free byte in the last page.
    cursor: usize,
    page_size: usize,
    used: usize,
}

impl Arena {
    /// Create an arena with [`DEFAULT_PAGE_SIZE`] pages.
    pub fn new() -> Self {
        Self::with_valid_page_size(DEFAULT_PAGE_SIZE)
    }

    /// Create an arena with the given page size.
    ///
    /// Fails with [`Error::InvalidPageSize`] when the page cannot hold an
    /// internal node block or is too large for 32-bit block headers and
    /// offsets. No page is allocated until the first block is rented.
    pub fn with_page_size(page_size: usize) -> Result<Self> {
        Config::default().with_page_size(page_size).validate()?;
        Ok(Self::with_valid_page_size(page_size))
    }

    /// Create an arena from a page size that already passed
    /// [`Config::validate`].
    pub(crate) fn with_valid_page_size(page_size: usize) -> Self {
        debug_assert!((MIN_PAGE_SIZE..=MAX_PAGE_SIZE).contains(&page_size));
        Self {
            pages: Vec::new(),
            cursor: 0,
            page_size,
            used: 0,
        }
    }

    /// Page size in bytes.
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Checks that a block of `size` bytes can ever be rented.
    pub fn check(&self, size: usize) -> Result<()> {
        if size.saturating_add(BLOCK_HEADER) > self.page_size {
            warn_log!(
                requested = size,
                page_size = self.page_size,
                "block does not fit in an arena page"
            );
            return Err(Error::BlockTooLarge {
                requested: size,
                page_size: self.page_size,
            });
        }
        Ok(())
    }

    /// Rent a zeroed block of exactly `size` bytes.
    ///
    /// Fails with [`Error::BlockTooLarge`] when the block and its header
    /// exceed the page size. Nothing is allocated in that case.
    pub fn rent(&mut self, size: usize) -> Result<BlockRef> {
        self.check(size)?;
        let required = size + BLOCK_HEADER;

        if self.pages.is_empty() || self.page_size - self.cursor < required {
            self.open_page();
        }

        let page = self.pages.len() - 1;
        let offset = self.cursor;
        let header = (size as u32).to_le_bytes();
        self.pages[page][offset..offset + BLOCK_HEADER].copy_from_slice(&header);
        self.cursor += required;
        self.used += required;

        Ok(BlockRef {
            page: page as u32,
            offset: offset as u32,
        })
    }

    /// Bytes of a rented block.
    ///
    /// # Panics
    /// Panics if `at` was not issued by this arena since its last release.
    #[inline]
    pub fn block(&self, at: BlockRef) -> &[u8] {
        let page = &self.pages[at.page as usize];
        let start = at.offset as usize;
        let len = read_u32(&page[start..]) as usize;
        &page[start + BLOCK_HEADER..start + BLOCK_HEADER + len]
    }

    /// Mutable bytes of a rented block.
    ///
    /// # Panics
    /// Panics if `at` was not issued by this arena since its last release.
    #[inline]
    pub fn block_mut(&mut self, at: BlockRef) -> &mut [u8] {
        let page = &mut self.pages[at.page as usize];
        let start = at.offset as usize;
        let len = read_u32(&page[start..]) as usize;
        &mut page[start + BLOCK_HEADER..start + BLOCK_HEADER + len]
    }

    /// Release every page at once.
    ///
    /// All outstanding handles become invalid. Releasing an already released
    /// arena does nothing; the arena can be rented from again afterwards.
    pub fn release(&mut self) {
        if self.pages.is_empty() {
            return;
        }
        debug_log!(
            pages = self.pages.len(),
            used_bytes = self.used,
            "releasing arena pages"
        );
        self.pages = Vec::new();
        self.cursor = 0;
        self.used = 0;
    }

    /// Current memory accounting.
    pub fn stats(&self) -> ArenaStats {
        ArenaStats {
            pages: self.pages.len(),
            reserved_bytes: self.pages.len() * self.page_size,
            used_bytes: self.used,
        }
    }

    fn open_page(&mut self) {
        let page: Box<[u8]> = vec![0u8; self.page_size].into_boxed_slice();
        self.pages.push(page);
        self.cursor = 0;
        debug_log!(
            page = self.pages.len() - 1,
            page_size = self.page_size,
            "opened arena page"
        );
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Arena {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for Arena {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Arena")
            .field("page_size", &self.page_size)
            .field("stats", &self.stats())
            .finish()
    }
}
