//! Address decomposition for the direct-mapped layout.
//!
//! ```text
//!  31                              6 5        2 1    0
//! +---------------------------------+----------+------+
//! |               tag               | set_index|offset|
//! +---------------------------------+----------+------+
//! ```

use std::fmt;

use serde::Serialize;

use crate::bin::extract;

pub const OFFSET_BITS: u32 = 2;
pub const SET_INDEX_BITS: u32 = 4;
pub const TAG_BITS: u32 = 32 - SET_INDEX_BITS - OFFSET_BITS;

/// bytes held by one line.
pub const LINE_BYTES: usize = 1 << OFFSET_BITS;
/// lines in the cache; one per set index.
pub const NUM_LINES: usize = 1 << SET_INDEX_BITS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Addr(u32);

impl Addr {
    pub fn new(v: u32) -> Self {
        Self(v)
    }
}

impl fmt::Display for Addr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

/// `(tag, set_index, offset)` of an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AddrFields {
    pub tag: u32,
    pub set_index: u8,
    pub offset: u8,
}

impl AddrFields {
    /// position of the line inside the cache array.
    #[inline]
    pub fn line(&self) -> usize {
        self.set_index as usize
    }
}

/// Splits `address` into tag, set index and byte offset.
///
/// Total over `u32`; every address maps to exactly one line.
#[inline]
pub const fn decompose(address: u32) -> AddrFields {
    let set_lsb = OFFSET_BITS;
    let tag_lsb = OFFSET_BITS + SET_INDEX_BITS;
    AddrFields {
        tag: extract(address, tag_lsb..31),
        set_index: extract(address, set_lsb..tag_lsb - 1) as u8,
        offset: extract(address, 0..set_lsb - 1) as u8,
    }
}
