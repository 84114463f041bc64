//! Minolta MRW raw file metadata.
//!
//! # Layout
//!
//! ```text
//! "\0MRM" size            root block, payload = all metadata blocks
//!   "\0PRD" 24            picture raw dimensions, camera version
//!   "\0TTW" n             embedded TIFF: IFD chain, EXIF, maker note
//!   "\0WBG" 12            white balance gains
//!   "\0RIF" n             requested image format
//!   "\0PAD" n             padding
//! <image data>            starts at 8 + root size
//! ```
//!
//! Decoding is synchronous over an in-memory buffer. Structural problems
//! with the container itself are fatal ([`MrwError`]); everything inside a
//! block is best effort and problems end up in [`ParseDiagnostics`].

mod blocks;
mod camera_settings;
mod diagnostics;
mod dispatch;
mod prd;
mod rif;
mod ttw;
mod wbg;

pub use blocks::{format_block_id, BlockHeader, BlockKind, BLOCK_HEADER_SIZE};
pub use camera_settings::{describe, describe_key, CameraSettingsKind};
pub use diagnostics::{ParseDiagnostics, Warning};
pub use dispatch::{Directory, TagAction, TagSpec, EXIF_TAGS, MAKER_NOTE_TAGS, ROOT_TAGS};
pub use prd::{camera_for_version, PrdBlock, PRD_SIZE, PRD_VERSIONS};
pub use rif::{iso_from_byte, ColorMode, ProgramMode, RequestedImageFormat, ZoneMatching};
pub use ttw::{DiscoveredPointers, Region, MAX_IFD_CHAIN};
pub use wbg::WhiteBalanceGains;

use serde::Serialize;
use tracing::debug;

use crate::error::MrwError;
use crate::format::cursor::ByteCursor;
use crate::format::tiff::TiffContext;
use crate::io::{load_raw, RangeReader, MAX_RAW_SIZE};
use crate::metadata::MetadataSink;

// =============================================================================
// MrwMetadata
// =============================================================================

/// Everything decoded from one MRW file.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MrwMetadata {
    /// Decoded tags in file order
    pub exif: MetadataSink,
    pub prd: Option<PrdBlock>,
    pub wbg: Option<WhiteBalanceGains>,
    pub rif: Option<RequestedImageFormat>,
    /// Location and byte order of the embedded TIFF block
    pub tiff: Option<TiffContext>,
    pub pointers: DiscoveredPointers,
    /// Offset of the raw image data
    pub image_data_start: u64,
    pub diagnostics: ParseDiagnostics,
}

impl MrwMetadata {
    /// Camera model resolved from the PRD version string.
    pub fn camera(&self) -> Option<&'static str> {
        self.prd.as_ref().and_then(|prd| prd.camera)
    }
}

// =============================================================================
// MrwParser
// =============================================================================

/// MRW decoder with a configurable input cap.
#[derive(Debug, Clone, Copy)]
pub struct MrwParser {
    max_size: usize,
}

impl Default for MrwParser {
    fn default() -> Self {
        Self::new()
    }
}

impl MrwParser {
    pub fn new() -> Self {
        Self {
            max_size: MAX_RAW_SIZE,
        }
    }

    /// Limit the number of bytes examined. Longer inputs are truncated.
    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Decode an MRW file held in memory.
    ///
    /// # Errors
    /// Fails when the root block is missing or malformed, when a sub-block
    /// header is truncated or when an unknown block id is found.
    pub fn parse(&self, data: &[u8]) -> Result<MrwMetadata, MrwError> {
        let data = &data[..data.len().min(self.max_size)];
        let buffer = ByteCursor::new(data);

        let root = blocks::read_root(buffer)?;
        let mut metadata = MrwMetadata {
            image_data_start: root.payload_end().unwrap_or(u64::MAX),
            ..MrwMetadata::default()
        };

        for block in blocks::BlockIter::new(buffer, &root) {
            let (kind, header) = block?;
            debug!(
                block = kind.name(),
                offset = header.offset,
                size = header.size,
                "Found block"
            );

            match kind {
                BlockKind::Prd => {
                    metadata.prd = prd::decode(buffer, &header, &mut metadata.diagnostics);
                }
                BlockKind::Wbg => {
                    metadata.wbg = wbg::decode(buffer, &header, &mut metadata.diagnostics);
                }
                BlockKind::Rif => {
                    metadata.rif = Some(rif::decode(buffer, &header, &mut metadata.diagnostics));
                }
                BlockKind::Ttw => {
                    if let Some(result) = ttw::decode(
                        buffer,
                        &header,
                        &mut metadata.exif,
                        &mut metadata.diagnostics,
                    ) {
                        metadata.tiff = Some(result.context);
                        metadata.pointers = result.pointers;
                    }
                }
                BlockKind::Pad => {}
            }
        }

        debug!(
            tags = metadata.exif.len(),
            warnings = metadata.diagnostics.len(),
            camera = metadata.camera().unwrap_or("unknown"),
            "Decoded MRW metadata"
        );
        Ok(metadata)
    }

    /// Load from a range reader and decode.
    pub async fn load_and_parse<R: RangeReader + ?Sized>(
        &self,
        reader: &R,
    ) -> Result<MrwMetadata, MrwError> {
        let raw = load_raw(reader, self.max_size).await?;
        self.parse(&raw)
    }
}

/// Decode an MRW file held in memory with the default input cap.
pub fn parse(data: &[u8]) -> Result<MrwMetadata, MrwError> {
    MrwParser::new().parse(data)
}

/// Load an MRW file from a range reader and decode it.
pub async fn load_and_parse<R: RangeReader + ?Sized>(reader: &R) -> Result<MrwMetadata, MrwError> {
    MrwParser::new().load_and_parse(reader).await
}
