//! TIFF structure embedded in the MRW "TTW" block.
//!
//! # Key Concepts
//!
//! - **Byte order**: the block declares its endianness in the header ("MM" =
//!   big-endian, "LL"/"II" = little-endian). All multi-byte values inside the
//!   block must be read respecting this order.
//!
//! - **Relative offsets**: every offset in the structure is relative to the
//!   start of the TTW payload, captured by [`TiffContext`].
//!
//! - **IFD (Image File Directory)**: a counted list of 12-byte entries
//!   followed by the offset of the next directory.
//!
//! - **Inline vs offset values**: values of at most 4 bytes are stored in
//!   the entry itself, larger values at an offset pointed to by the entry.

mod parser;
mod tags;
mod values;

pub use parser::{
    ByteOrder, DirectoryEntry, Ifd, TiffContext, TiffHeader, IFD_COUNT_SIZE, IFD_ENTRY_SIZE,
    TIFF_HEADER_SIZE, TIFF_MAGIC,
};
pub use tags::FieldType;
pub use values::{decode, parse_u16_array, parse_u32_array, ValueReader};
