//! Error type for the packed backend.

/// Errors raised by the page arena and its configuration.
///
/// Duplicate inserts and removals of missing keys are not errors; those
/// operations report `false` instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A node block does not fit in a single arena page.
    #[error("block of {requested} bytes does not fit in a {page_size}-byte arena page")]
    BlockTooLarge {
        /// Size of the rejected block, excluding the block header.
        requested: usize,
        /// Configured page size.
        page_size: usize,
    },

    /// The configured page size cannot be used.
    #[error("page size {page_size} is outside the supported range {min}..={max}")]
    InvalidPageSize {
        /// Rejected page size.
        page_size: usize,
        /// Smallest page that holds an internal node block.
        min: usize,
        /// Largest page addressable by a block header.
        max: usize,
    },
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;
