//! Bounds-checked primitive reads over the raw buffer.
//!
//! Two views exist:
//!
//! - [`ByteCursor`] addresses the buffer directly (the MRW container is
//!   big-endian, but both orders are available).
//! - [`TiffCursor`] addresses the embedded TIFF block: offsets are relative to
//!   the block base, the block's declared byte order is applied, and every
//!   read is checked against the block size as well as the buffer.
//!
//! Out-of-range reads return [`IoError::RangeOutOfBounds`]; nothing here can
//! panic or touch memory outside the buffer.

use crate::error::IoError;
use crate::io::{read_u16_be, read_u16_le, read_u32_be, read_u32_le};

use super::tiff::{ByteOrder, TiffContext};

// =============================================================================
// ByteCursor
// =============================================================================

/// Read-only view over a byte slice with checked accessors.
#[derive(Debug, Clone, Copy)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
}

impl<'a> ByteCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    #[inline]
    pub fn len(&self) -> u64 {
        self.data.len() as u64
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Borrow `len` bytes at `offset`.
    pub fn bytes(&self, offset: u64, len: u64) -> Result<&'a [u8], IoError> {
        let size = self.len();
        match offset.checked_add(len) {
            Some(end) if end <= size => Ok(&self.data[offset as usize..end as usize]),
            _ => Err(IoError::RangeOutOfBounds {
                offset,
                requested: len,
                size,
            }),
        }
    }

    /// Cursor over `[offset, offset + len)`, clamped to the end of the buffer.
    ///
    /// Used for block payloads: a payload that runs past a truncated buffer
    /// still yields the bytes that exist, and reads beyond them fail.
    pub fn region(&self, offset: u64, len: u64) -> ByteCursor<'a> {
        let start = offset.min(self.len()) as usize;
        let end = offset.saturating_add(len).min(self.len()) as usize;
        ByteCursor::new(&self.data[start..end])
    }

    #[inline]
    pub fn u8_at(&self, offset: u64) -> Result<u8, IoError> {
        Ok(self.bytes(offset, 1)?[0])
    }

    #[inline]
    pub fn be16(&self, offset: u64) -> Result<u16, IoError> {
        Ok(read_u16_be(self.bytes(offset, 2)?))
    }

    #[inline]
    pub fn le16(&self, offset: u64) -> Result<u16, IoError> {
        Ok(read_u16_le(self.bytes(offset, 2)?))
    }

    #[inline]
    pub fn be32(&self, offset: u64) -> Result<u32, IoError> {
        Ok(read_u32_be(self.bytes(offset, 4)?))
    }

    #[inline]
    pub fn le32(&self, offset: u64) -> Result<u32, IoError> {
        Ok(read_u32_le(self.bytes(offset, 4)?))
    }

    /// Read a 4-byte block identifier.
    pub fn id4(&self, offset: u64) -> Result<[u8; 4], IoError> {
        let b = self.bytes(offset, 4)?;
        Ok([b[0], b[1], b[2], b[3]])
    }
}

// =============================================================================
// TiffCursor
// =============================================================================

/// Reads relative to a [`TiffContext`].
#[derive(Debug, Clone, Copy)]
pub struct TiffCursor<'a> {
    buffer: ByteCursor<'a>,
    context: TiffContext,
}

impl<'a> TiffCursor<'a> {
    pub fn new(buffer: ByteCursor<'a>, context: TiffContext) -> Self {
        Self { buffer, context }
    }

    #[inline]
    pub fn context(&self) -> &TiffContext {
        &self.context
    }

    #[inline]
    pub fn byte_order(&self) -> ByteOrder {
        self.context.byte_order
    }

    /// Borrow `len` bytes at `offset` from the TIFF base.
    pub fn bytes(&self, offset: u64, len: u64) -> Result<&'a [u8], IoError> {
        let size = self.context.size;
        let in_region = offset.checked_add(len).is_some_and(|end| end <= size);
        if !in_region {
            return Err(IoError::RangeOutOfBounds {
                offset,
                requested: len,
                size,
            });
        }

        let absolute = self
            .context
            .base
            .checked_add(offset)
            .ok_or(IoError::RangeOutOfBounds {
                offset,
                requested: len,
                size,
            })?;
        self.buffer.bytes(absolute, len)
    }

    #[inline]
    pub fn u8(&self, offset: u64) -> Result<u8, IoError> {
        Ok(self.bytes(offset, 1)?[0])
    }

    #[inline]
    pub fn u16(&self, offset: u64) -> Result<u16, IoError> {
        Ok(self.context.byte_order.read_u16(self.bytes(offset, 2)?))
    }

    #[inline]
    pub fn u32(&self, offset: u64) -> Result<u32, IoError> {
        Ok(self.context.byte_order.read_u32(self.bytes(offset, 4)?))
    }

    #[inline]
    pub fn u64(&self, offset: u64) -> Result<u64, IoError> {
        Ok(self.context.byte_order.read_u64(self.bytes(offset, 8)?))
    }
}

// =============================================================================
// Tests
// =============================================================================
