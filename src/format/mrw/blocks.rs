//! MRW block container.
//!
//! An MRW file starts with a root `"\0MRM"` block whose payload is a
//! sequence of sub-blocks. Every block header is 8 bytes:
//!
//! ```text
//! Bytes 0-3: identifier ("\0MRM", "\0PRD", "\0TTW", "\0WBG", "\0RIF", "\0PAD")
//! Bytes 4-7: payload size (u32, big-endian)
//! ```
//!
//! Raw image data starts right after the root block payload.

use crate::error::{IoError, MrwError};
use crate::format::cursor::ByteCursor;

pub const MRM_ID: [u8; 4] = *b"\0MRM";
pub const PRD_ID: [u8; 4] = *b"\0PRD";
pub const TTW_ID: [u8; 4] = *b"\0TTW";
pub const WBG_ID: [u8; 4] = *b"\0WBG";
pub const RIF_ID: [u8; 4] = *b"\0RIF";
pub const PAD_ID: [u8; 4] = *b"\0PAD";

/// Size of a block header in bytes
pub const BLOCK_HEADER_SIZE: u64 = 8;

/// Known sub-block kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    /// Picture raw dimensions
    Prd,
    /// Embedded TIFF
    Ttw,
    /// White balance gains
    Wbg,
    /// Requested image format
    Rif,
    /// Padding
    Pad,
}

impl BlockKind {
    pub fn from_id(id: [u8; 4]) -> Option<Self> {
        match id {
            PRD_ID => Some(BlockKind::Prd),
            TTW_ID => Some(BlockKind::Ttw),
            WBG_ID => Some(BlockKind::Wbg),
            RIF_ID => Some(BlockKind::Rif),
            PAD_ID => Some(BlockKind::Pad),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            BlockKind::Prd => "PRD",
            BlockKind::Ttw => "TTW",
            BlockKind::Wbg => "WBG",
            BlockKind::Rif => "RIF",
            BlockKind::Pad => "PAD",
        }
    }
}

/// Printable form of a block identifier, NUL and binary bytes escaped.
pub fn format_block_id(id: [u8; 4]) -> String {
    id.escape_ascii().to_string()
}

// =============================================================================
// BlockHeader
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader {
    pub id: [u8; 4],
    pub size: u32,
    /// Absolute offset of the header
    pub offset: u64,
}

impl BlockHeader {
    pub fn read(buffer: ByteCursor<'_>, offset: u64) -> Result<Self, IoError> {
        Ok(BlockHeader {
            id: buffer.id4(offset)?,
            size: buffer.be32(offset + 4)?,
            offset,
        })
    }

    #[inline]
    pub fn payload_start(&self) -> u64 {
        self.offset + BLOCK_HEADER_SIZE
    }

    /// End of the payload, `None` on overflow.
    pub fn payload_end(&self) -> Option<u64> {
        self.payload_start().checked_add(self.size as u64)
    }

    /// View of the payload, clamped to the buffer.
    pub fn payload<'a>(&self, buffer: ByteCursor<'a>) -> ByteCursor<'a> {
        buffer.region(self.payload_start(), self.size as u64)
    }
}

/// Read and check the root `"\0MRM"` header.
///
/// # Errors
/// - `TooSmall` if the buffer cannot hold a block header
/// - `InvalidSignature` if the identifier is not `"\0MRM"`
pub fn read_root(buffer: ByteCursor<'_>) -> Result<BlockHeader, MrwError> {
    if buffer.len() < BLOCK_HEADER_SIZE {
        return Err(MrwError::TooSmall {
            required: BLOCK_HEADER_SIZE,
            actual: buffer.len(),
        });
    }

    let header = BlockHeader::read(buffer, 0)?;
    if header.id != MRM_ID {
        return Err(MrwError::InvalidSignature(header.id));
    }
    Ok(header)
}

// =============================================================================
// BlockIter
// =============================================================================

/// Iterates the sub-blocks of the root block.
///
/// Yields an error and stops on the first unreadable header or unknown
/// identifier.
#[derive(Debug, Clone)]
pub struct BlockIter<'a> {
    buffer: ByteCursor<'a>,
    position: u64,
    end: u64,
    done: bool,
}

impl<'a> BlockIter<'a> {
    /// Walk sub-blocks in `[BLOCK_HEADER_SIZE, image_data_start)`.
    pub fn new(buffer: ByteCursor<'a>, root: &BlockHeader) -> Self {
        Self {
            buffer,
            position: root.payload_start(),
            end: root.payload_end().unwrap_or(u64::MAX),
            done: false,
        }
    }
}

impl Iterator for BlockIter<'_> {
    type Item = Result<(BlockKind, BlockHeader), MrwError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.position >= self.end {
            return None;
        }

        let offset = self.position;
        let header = match BlockHeader::read(self.buffer, offset) {
            Ok(header) => header,
            Err(_) => {
                self.done = true;
                return Some(Err(MrwError::TruncatedBlockHeader { offset }));
            }
        };

        let Some(kind) = BlockKind::from_id(header.id) else {
            self.done = true;
            return Some(Err(MrwError::UnknownBlock {
                id: format_block_id(header.id),
                offset,
            }));
        };

        match header.payload_end() {
            Some(next) => self.position = next,
            None => self.done = true,
        }

        Some(Ok((kind, header)))
    }
}
