//! TIFF tag value reading.
//!
//! Values are stored either inline in the 4-byte value field of a directory
//! entry or at an offset from the TIFF base. Both cases resolve to a
//! position inside the TIFF region, so a single bounds-checked read serves
//! them.

use crate::error::TiffError;
use crate::format::cursor::TiffCursor;
use crate::metadata::{text_until_nul, TagValue};

use super::parser::{ByteOrder, DirectoryEntry};
use super::tags::FieldType;

// =============================================================================
// ValueReader
// =============================================================================

/// Reads directory entry values through a [`TiffCursor`].
#[derive(Debug, Clone, Copy)]
pub struct ValueReader<'a> {
    cursor: TiffCursor<'a>,
}

impl<'a> ValueReader<'a> {
    pub fn new(cursor: TiffCursor<'a>) -> Self {
        Self { cursor }
    }

    #[inline]
    pub fn byte_order(&self) -> ByteOrder {
        self.cursor.byte_order()
    }

    /// Borrow the raw bytes of an entry's value.
    pub fn read_bytes(&self, entry: &DirectoryEntry) -> Result<&'a [u8], TiffError> {
        let size = entry
            .value_byte_size()
            .ok_or(TiffError::UnknownFieldType {
                tag: entry.tag,
                field_type: entry.field_type_raw,
            })?;

        if size > self.cursor.context().size {
            return Err(TiffError::ValueTooLarge {
                tag: entry.tag,
                count: entry.count,
            });
        }

        let position = entry.data_position(self.byte_order());
        Ok(self.cursor.bytes(position, size)?)
    }

    /// Decode an entry's value according to its stored field type.
    pub fn read_value(&self, entry: &DirectoryEntry) -> Result<TagValue, TiffError> {
        let field_type = entry.field_type.ok_or(TiffError::UnknownFieldType {
            tag: entry.tag,
            field_type: entry.field_type_raw,
        })?;
        let bytes = self.read_bytes(entry)?;
        Ok(decode(field_type, bytes, self.byte_order()))
    }
}

/// Decode raw value bytes of a known type.
///
/// `bytes` must hold a whole number of values; any trailing partial value is
/// ignored.
pub fn decode(field_type: FieldType, bytes: &[u8], order: ByteOrder) -> TagValue {
    match field_type {
        FieldType::Byte => TagValue::Byte(bytes.to_vec()),
        FieldType::Undefined => TagValue::Undefined(bytes.to_vec()),
        FieldType::SByte => TagValue::SignedByte(bytes.iter().map(|&b| b as i8).collect()),
        FieldType::Ascii => TagValue::Ascii(text_until_nul(bytes)),
        FieldType::Short => TagValue::UnsignedShort(parse_u16_array(bytes, order)),
        FieldType::SShort => TagValue::SignedShort(
            parse_u16_array(bytes, order)
                .into_iter()
                .map(|v| v as i16)
                .collect(),
        ),
        FieldType::Long => TagValue::UnsignedLong(parse_u32_array(bytes, order)),
        FieldType::SLong => TagValue::SignedLong(
            parse_u32_array(bytes, order)
                .into_iter()
                .map(|v| v as i32)
                .collect(),
        ),
        FieldType::Rational => TagValue::UnsignedRational(
            parse_u32_array(bytes, order)
                .chunks_exact(2)
                .map(|pair| (pair[0], pair[1]))
                .collect(),
        ),
        FieldType::SRational => TagValue::SignedRational(
            parse_u32_array(bytes, order)
                .chunks_exact(2)
                .map(|pair| (pair[0] as i32, pair[1] as i32))
                .collect(),
        ),
        FieldType::Float => TagValue::Float(
            parse_u32_array(bytes, order)
                .into_iter()
                .map(f32::from_bits)
                .collect(),
        ),
        FieldType::Double => TagValue::Double(
            bytes
                .chunks_exact(8)
                .map(|chunk| f64::from_bits(order.read_u64(chunk)))
                .collect(),
        ),
    }
}

// =============================================================================
// Array parsing helpers
// =============================================================================

/// Parse an array of u16 values from raw bytes.
pub fn parse_u16_array(bytes: &[u8], order: ByteOrder) -> Vec<u16> {
    bytes
        .chunks_exact(2)
        .map(|chunk| order.read_u16(chunk))
        .collect()
}

/// Parse an array of u32 values from raw bytes.
pub fn parse_u32_array(bytes: &[u8], order: ByteOrder) -> Vec<u32> {
    bytes
        .chunks_exact(4)
        .map(|chunk| order.read_u32(chunk))
        .collect()
}

// =============================================================================
// Tests
// =============================================================================
