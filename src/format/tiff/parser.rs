//! TIFF header and directory parsing.
//!
//! The MRW "TTW" block carries a classic TIFF structure. Its offsets are
//! relative to the start of the block payload rather than to the file.
//!
//! # TIFF Header Structure (8 bytes)
//! ```text
//! Bytes 0-1: Byte order ("MM" = big-endian, "LL" or "II" = little-endian)
//! Bytes 2-3: Magic (42)
//! Bytes 4-7: Offset to first IFD
//! ```
//!
//! # IFD Structure
//! ```text
//! 2 bytes:       entry count N
//! N * 12 bytes:  entries (tag u16, type u16, count u32, value/offset 4 bytes)
//! 4 bytes:       offset of the next IFD (0 = end of chain)
//! ```

use serde::Serialize;

use crate::error::{IoError, TiffError};
use crate::format::cursor::{ByteCursor, TiffCursor};
use crate::io::{read_u16_be, read_u16_le, read_u32_be, read_u32_le, read_u64_be, read_u64_le};

use super::tags::FieldType;

// =============================================================================
// Constants
// =============================================================================

/// Big-endian marker ("MM" for Motorola)
const BYTE_ORDER_BIG_ENDIAN: [u8; 2] = *b"MM";

/// Little-endian marker as written by MRW firmware
const BYTE_ORDER_LITTLE_ENDIAN_MRW: [u8; 2] = *b"LL";

/// Standard TIFF little-endian marker ("II" for Intel)
const BYTE_ORDER_LITTLE_ENDIAN: [u8; 2] = *b"II";

/// Magic number for classic TIFF
pub const TIFF_MAGIC: u16 = 42;

/// Size of the TIFF header in bytes
pub const TIFF_HEADER_SIZE: u64 = 8;

/// Size of one directory entry in bytes
pub const IFD_ENTRY_SIZE: u64 = 12;

/// Size of the entry count field at the start of an IFD
pub const IFD_COUNT_SIZE: u64 = 2;

// =============================================================================
// ByteOrder
// =============================================================================

/// Byte order (endianness) of the embedded TIFF block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ByteOrder {
    /// Little-endian ("LL"/"II")
    LittleEndian,
    /// Big-endian ("MM")
    BigEndian,
}

impl ByteOrder {
    /// Identify the byte order from the two marker bytes.
    pub fn from_marker(marker: [u8; 2]) -> Option<Self> {
        match marker {
            BYTE_ORDER_BIG_ENDIAN => Some(ByteOrder::BigEndian),
            BYTE_ORDER_LITTLE_ENDIAN_MRW | BYTE_ORDER_LITTLE_ENDIAN => {
                Some(ByteOrder::LittleEndian)
            }
            _ => None,
        }
    }

    /// Read a u16 from a byte slice using this byte order.
    #[inline]
    pub fn read_u16(self, bytes: &[u8]) -> u16 {
        match self {
            ByteOrder::LittleEndian => read_u16_le(bytes),
            ByteOrder::BigEndian => read_u16_be(bytes),
        }
    }

    /// Read a u32 from a byte slice using this byte order.
    #[inline]
    pub fn read_u32(self, bytes: &[u8]) -> u32 {
        match self {
            ByteOrder::LittleEndian => read_u32_le(bytes),
            ByteOrder::BigEndian => read_u32_be(bytes),
        }
    }

    /// Read a u64 from a byte slice using this byte order.
    #[inline]
    pub fn read_u64(self, bytes: &[u8]) -> u64 {
        match self {
            ByteOrder::LittleEndian => read_u64_le(bytes),
            ByteOrder::BigEndian => read_u64_be(bytes),
        }
    }
}

// =============================================================================
// TiffContext
// =============================================================================

/// Location and byte order of the embedded TIFF block.
///
/// `base` is an absolute offset into the raw buffer; every offset found in
/// the TIFF structure is relative to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TiffContext {
    pub base: u64,
    pub size: u64,
    pub byte_order: ByteOrder,
}

// =============================================================================
// TiffHeader
// =============================================================================

/// Parsed TIFF header of a TTW block.
///
/// Parsing is lenient: an unknown marker falls back to big-endian and a wrong
/// magic number is kept as-is. [`TiffHeader::anomalies`] reports both so the
/// caller can record them without giving up on the block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TiffHeader {
    /// Raw marker bytes
    pub marker: [u8; 2],

    /// Byte order for all multi-byte values in the block
    pub byte_order: ByteOrder,

    /// Magic number as read with `byte_order`
    pub magic: u16,

    /// Offset of the first IFD, relative to the block start
    pub first_ifd_offset: u32,
}

impl TiffHeader {
    /// Parse a TIFF header from the start of a TTW payload.
    ///
    /// # Errors
    /// - `BlockTooSmall` if fewer than 8 bytes are available
    pub fn parse(payload: ByteCursor<'_>) -> Result<Self, TiffError> {
        if payload.len() < TIFF_HEADER_SIZE {
            return Err(TiffError::BlockTooSmall {
                required: TIFF_HEADER_SIZE,
                actual: payload.len(),
            });
        }

        let raw = payload.bytes(0, TIFF_HEADER_SIZE)?;
        let marker = [raw[0], raw[1]];
        let byte_order = ByteOrder::from_marker(marker).unwrap_or(ByteOrder::BigEndian);
        let magic = byte_order.read_u16(&raw[2..4]);
        let first_ifd_offset = byte_order.read_u32(&raw[4..8]);

        Ok(TiffHeader {
            marker,
            byte_order,
            magic,
            first_ifd_offset,
        })
    }

    /// Whether the marker is the big-endian "MM" that MRW files normally use.
    pub fn is_expected_order(&self) -> bool {
        self.marker == BYTE_ORDER_BIG_ENDIAN
    }

    /// Recoverable problems with this header.
    pub fn anomalies(&self) -> Vec<TiffError> {
        let mut anomalies = Vec::new();
        if ByteOrder::from_marker(self.marker).is_none() {
            anomalies.push(TiffError::InvalidByteOrder(u16::from_be_bytes(self.marker)));
        }
        if self.magic != TIFF_MAGIC {
            anomalies.push(TiffError::InvalidMagic(self.magic));
        }
        anomalies
    }
}

// =============================================================================
// DirectoryEntry
// =============================================================================

/// A single 12-byte IFD entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    /// Tag identifier
    pub tag: u16,

    /// Field type, `None` when the type code is unknown
    pub field_type: Option<FieldType>,

    /// Raw type code as stored
    pub field_type_raw: u16,

    /// Number of values
    pub count: u32,

    /// Raw value/offset field
    pub value_offset_bytes: [u8; 4],

    /// Position of the entry, relative to the TIFF base
    pub position: u64,
}

impl DirectoryEntry {
    /// Read the entry at `position`.
    pub fn read(cursor: &TiffCursor<'_>, position: u64) -> Result<Self, IoError> {
        let raw = cursor.bytes(position, IFD_ENTRY_SIZE)?;
        let order = cursor.byte_order();
        let field_type_raw = order.read_u16(&raw[2..4]);

        Ok(DirectoryEntry {
            tag: order.read_u16(&raw[0..2]),
            field_type: FieldType::from_u16(field_type_raw),
            field_type_raw,
            count: order.read_u32(&raw[4..8]),
            value_offset_bytes: [raw[8], raw[9], raw[10], raw[11]],
            position,
        })
    }

    /// Total byte size of the value, `None` for unknown types.
    pub fn value_byte_size(&self) -> Option<u64> {
        self.field_type.and_then(|t| t.byte_size(self.count))
    }

    /// Whether the value lives in the value/offset field itself.
    pub fn is_inline(&self) -> bool {
        self.field_type.is_some_and(|t| t.fits_inline(self.count))
    }

    /// Interpret the value/offset field as a 32-bit number.
    ///
    /// For non-inline values this is the offset of the data; for pointer
    /// tags (EXIF IFD, maker note) it is the offset of the sub-structure.
    #[inline]
    pub fn value_offset(&self, byte_order: ByteOrder) -> u32 {
        byte_order.read_u32(&self.value_offset_bytes)
    }

    /// Position of the value data, relative to the TIFF base.
    pub fn data_position(&self, byte_order: ByteOrder) -> u64 {
        if self.is_inline() {
            self.position + 8
        } else {
            self.value_offset(byte_order) as u64
        }
    }
}

// =============================================================================
// Ifd
// =============================================================================

/// One Image File Directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ifd {
    /// Offset of the directory, relative to the TIFF base
    pub offset: u64,

    /// Entries read, in file order
    pub entries: Vec<DirectoryEntry>,

    /// Declared number of entries
    pub declared_count: u16,

    /// Offset of the next IFD (0 = end of chain)
    pub next_ifd_offset: u32,

    /// Set when the directory runs past the TIFF region; `entries` then
    /// holds only the complete entries and `next_ifd_offset` is 0.
    pub truncated: bool,
}

impl Ifd {
    /// Read the directory at `offset`.
    ///
    /// # Errors
    /// Fails only if the entry count itself cannot be read. A directory whose
    /// entries or next pointer run out of bounds is returned truncated.
    pub fn read(cursor: &TiffCursor<'_>, offset: u64) -> Result<Self, IoError> {
        let declared_count = cursor.u16(offset)?;
        let mut entries = Vec::with_capacity(declared_count as usize);
        let mut truncated = false;

        for i in 0..declared_count as u64 {
            let position = offset + IFD_COUNT_SIZE + i * IFD_ENTRY_SIZE;
            match DirectoryEntry::read(cursor, position) {
                Ok(entry) => entries.push(entry),
                Err(_) => {
                    truncated = true;
                    break;
                }
            }
        }

        let next_position = offset + IFD_COUNT_SIZE + declared_count as u64 * IFD_ENTRY_SIZE;
        let next_ifd_offset = if truncated {
            0
        } else {
            match cursor.u32(next_position) {
                Ok(next) => next,
                Err(_) => {
                    truncated = true;
                    0
                }
            }
        };

        Ok(Ifd {
            offset,
            entries,
            declared_count,
            next_ifd_offset,
            truncated,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
