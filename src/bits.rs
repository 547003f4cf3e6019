//! Branch decisions over the bits of byte-string keys.
//!
//! A branch is identified by the byte it inspects and an "otherbits" mask:
//! every bit of the mask is set except the critical bit. With that encoding
//! the direction of a present byte `c` is `(1 + (mask | c)) >> 8`, which is
//! `1` exactly when `c` has the critical bit set.
//!
//! A mask of `0xFF` has no critical bit. It is produced when two keys agree
//! on every byte they share and the longer one continues with `0x00`; such a
//! branch separates the key that ends at `byte_index` (direction `0`) from
//! the keys that continue (direction `1`).

/// Mask of a length branch.
pub const LENGTH_MASK: u8 = 0xFF;

/// A single branch decision of an internal node.
///
/// Field order matters: the derived ordering compares `byte_index` first and
/// `mask` second, which is the order branches take from the root downwards.
/// A numerically larger mask marks a less significant critical bit, and
/// [`LENGTH_MASK`] sorts after every bit of its byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Branch {
    byte_index: usize,
    mask: u8,
}

impl Branch {
    #[inline]
    pub(crate) fn new(byte_index: usize, mask: u8) -> Self {
        Self { byte_index, mask }
    }

    /// Index of the key byte this branch inspects.
    #[inline]
    pub fn byte_index(self) -> usize {
        self.byte_index
    }

    /// The otherbits mask: all ones except the critical bit.
    #[inline]
    pub fn mask(self) -> u8 {
        self.mask
    }

    /// The critical bit as a single-bit value, or `None` for a length branch.
    #[cfg(test)]
    pub(crate) fn critical_bit(self) -> Option<u8> {
        (self.mask != LENGTH_MASK).then_some(!self.mask)
    }

    /// Child slot (`0` or `1`) a key descends into.
    ///
    /// A key that ends before `byte_index` always takes child `0`.
    #[inline]
    pub fn direction(self, key: &[u8]) -> usize {
        match key.get(self.byte_index) {
            Some(&c) => ((1 + (u32::from(self.mask) | u32::from(c))) >> 8) as usize,
            None => 0,
        }
    }
}

/// Folds the XOR of two differing bytes into an otherbits mask.
///
/// All bits below the highest set bit are flooded, the highest set bit is
/// isolated, and the result is complemented to 8 bits. A zero difference
/// yields [`LENGTH_MASK`].
#[inline]
pub(crate) fn otherbits(diff: u8) -> u8 {
    let mut bits = u32::from(diff);
    bits |= bits >> 1;
    bits |= bits >> 2;
    bits |= bits >> 4;
    ((bits & !(bits >> 1)) ^ 0xFF) as u8
}

/// Finds the first branch at which `key` and `other` diverge.
///
/// Bytes are compared front to back until they differ or one key runs out.
/// A key that runs out behaves as if followed by `0x00`, so the first extra
/// byte of the longer key is the difference. Returns `None` when the keys
/// are equal.
pub(crate) fn critical_branch(key: &[u8], other: &[u8]) -> Option<Branch> {
    let shared = key.len().min(other.len());
    let mismatch = key[..shared]
        .iter()
        .zip(&other[..shared])
        .position(|(a, b)| a != b);

    let (byte_index, diff) = match mismatch {
        Some(i) => (i, key[i] ^ other[i]),
        None if key.len() == other.len() => return None,
        None => {
            let extra = key.get(shared).or_else(|| other.get(shared));
            (shared, extra.copied().unwrap_or(0))
        }
    };

    Some(Branch::new(byte_index, otherbits(diff)))
}
