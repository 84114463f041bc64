use thiserror::Error;

/// I/O errors that can occur when reading raw file content
#[derive(Debug, Clone, Error)]
pub enum IoError {
    /// Underlying read failed (open, seek, short read)
    #[error("Read error: {0}")]
    Read(String),

    /// Requested range exceeds resource bounds
    #[error("Range out of bounds: requested {requested} bytes at offset {offset}, size is {size}")]
    RangeOutOfBounds {
        offset: u64,
        requested: u64,
        size: u64,
    },

    /// File does not exist
    #[error("File not found: {0}")]
    NotFound(String),
}

/// Recoverable errors raised while decoding the embedded TIFF structure.
///
/// None of these abort a parse: the offending field or directory is skipped
/// and the error is recorded as a warning in the parse diagnostics.
#[derive(Debug, Clone, Error)]
pub enum TiffError {
    /// Bounds-checked read failed
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// Byte order marker is neither MM nor LL/II
    #[error("Invalid TIFF byte order marker: 0x{0:04X}")]
    InvalidByteOrder(u16),

    /// Magic number is not 42
    #[error("Invalid TIFF magic number: expected 42, got {0}")]
    InvalidMagic(u16),

    /// TTW block is too small to contain a TIFF header
    #[error("TIFF block too small: need at least {required} bytes, got {actual}")]
    BlockTooSmall { required: u64, actual: u64 },

    /// Unknown field type in a directory entry
    #[error("Unknown field type {field_type} for tag 0x{tag:04X}")]
    UnknownFieldType { tag: u16, field_type: u16 },

    /// Stored value cannot be represented as the expected kind
    #[error("Tag {tag}: expected {expected}, found {found}")]
    TypeMismatch {
        tag: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    /// Value byte size overflows the addressable range
    #[error("Value of tag 0x{tag:04X} is too large: {count} items")]
    ValueTooLarge { tag: u16, count: u32 },
}

/// Fatal errors: decoding stops and no metadata is returned
#[derive(Debug, Clone, Error)]
pub enum MrwError {
    /// Loading the file failed
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// Buffer cannot hold the root MRM header
    #[error("File too small: need at least {required} bytes, got {actual}")]
    TooSmall { required: u64, actual: u64 },

    /// Root block identifier is not "\0MRM"
    #[error("Invalid MRW signature: expected \\0MRM, got {0:02X?}")]
    InvalidSignature([u8; 4]),

    /// Sub-block identifier is not one of PRD, TTW, WBG, RIF, PAD
    #[error("Unknown MRW block {id:?} at offset {offset}")]
    UnknownBlock { id: String, offset: u64 },

    /// Sub-block header extends past the end of the buffer
    #[error("Truncated MRW block header at offset {offset}")]
    TruncatedBlockHeader { offset: u64 },
}
