//! Owned, size-capped raw file content.

use std::ops::Deref;

use bytes::Bytes;
use tracing::debug;

use super::RangeReader;
use crate::error::IoError;

/// Maximum number of bytes loaded from an MRW file.
///
/// MRW metadata lives in the first few kilobytes; everything past the cap
/// is image data the decoder never touches.
pub const MAX_RAW_SIZE: usize = 400_000;

/// Immutable raw file content, at most `max` bytes of the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawBuffer {
    data: Bytes,
    source_size: u64,
}

impl RawBuffer {
    /// Wrap already-loaded bytes, truncating to `max`.
    pub fn new(data: impl Into<Bytes>, max: usize) -> Self {
        let mut data: Bytes = data.into();
        let source_size = data.len() as u64;
        if data.len() > max {
            data.truncate(max);
        }
        Self { data, source_size }
    }

    /// Size of the original source before truncation.
    pub fn source_size(&self) -> u64 {
        self.source_size
    }

    /// Whether the source was larger than the cap.
    pub fn is_truncated(&self) -> bool {
        self.source_size > self.data.len() as u64
    }

    pub fn as_bytes(&self) -> &Bytes {
        &self.data
    }
}

impl Deref for RawBuffer {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.data
    }
}

/// Load up to `max` bytes from the start of a reader in a single request.
pub async fn load_raw<R: RangeReader + ?Sized>(
    reader: &R,
    max: usize,
) -> Result<RawBuffer, IoError> {
    let source_size = reader.size();
    let len = source_size.min(max as u64) as usize;

    debug!(
        source = reader.identifier(),
        size = source_size,
        loaded = len,
        "Loading raw content"
    );

    let data = reader.read_exact_at(0, len).await?;
    Ok(RawBuffer { data, source_size })
}
