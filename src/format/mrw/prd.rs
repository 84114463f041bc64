//! PRD (Picture Raw Dimensions) block.
//!
//! ```text
//! Offset  Size  Field
//!  0      8     version string (ASCII, not NUL terminated)
//!  8      2     sensor height (u16 BE)
//! 10      2     sensor width
//! 12      2     image height
//! 14      2     image width
//! 16      1     data size (bits per pixel as stored, 12 or 16)
//! 17      1     pixel size (significant bits, always 12)
//! 18      1     storage method (0x52 unpacked, 0x59 packed)
//! 19      4     reserved
//! 23      1     bayer pattern
//! ```

use serde::Serialize;
use tracing::debug;

use super::blocks::BlockHeader;
use super::diagnostics::ParseDiagnostics;
use crate::format::cursor::ByteCursor;
use crate::metadata::text_until_nul;

/// Expected PRD payload size.
pub const PRD_SIZE: u64 = 24;

/// Version string to camera model, searched in order.
///
/// "27660001" appears twice: the D7 and D7u share firmware, the first match
/// wins.
pub const PRD_VERSIONS: &[(&str, &str)] = &[
    ("27730001", "D5"),
    ("27660001", "D7"),
    ("27660001", "D7u"),
    ("27790001", "D7i"),
    ("27780001", "D7Hi"),
    ("27820001", "A1"),
    ("27200001", "A2"),
    ("27470002", "A200"),
    ("21810002", "Dynax/Maxxum 7D"),
];

/// Storage method value for unpacked 16-bit pixels.
pub const STORAGE_UNPACKED: u8 = 0x52;

/// Storage method value for packed 12-bit pixels.
pub const STORAGE_PACKED: u8 = 0x59;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrdBlock {
    pub version: String,
    pub sensor_height: u16,
    pub sensor_width: u16,
    pub image_height: u16,
    pub image_width: u16,
    pub data_size: u8,
    pub pixel_size: u8,
    pub storage_method: u8,
    pub reserved: [u8; 4],
    pub bayer_pattern: u8,
    /// Camera model resolved from the version string
    pub camera: Option<&'static str>,
}

impl PrdBlock {
    /// Whether pixel data is packed 12-bit.
    pub fn is_packed(&self) -> bool {
        self.storage_method == STORAGE_PACKED
    }
}

/// Look up the camera model for a PRD version string.
pub fn camera_for_version(version: &str) -> Option<&'static str> {
    PRD_VERSIONS
        .iter()
        .find(|(id, _)| *id == version)
        .map(|(_, model)| *model)
}

/// Decode a PRD payload.
///
/// A size other than 24 is reported but decoding proceeds if 24 bytes are
/// readable. Returns `None` when they are not.
pub fn decode(
    buffer: ByteCursor<'_>,
    header: &BlockHeader,
    diagnostics: &mut ParseDiagnostics,
) -> Option<PrdBlock> {
    if header.size as u64 != PRD_SIZE {
        diagnostics.warn(
            header.offset,
            format!("PRD block size {}, expected {}", header.size, PRD_SIZE),
        );
    }

    let raw = match buffer.bytes(header.payload_start(), PRD_SIZE) {
        Ok(raw) if header.size as u64 >= PRD_SIZE => raw,
        _ => {
            diagnostics.warn(header.offset, "PRD block too short, skipped");
            return None;
        }
    };

    let version = text_until_nul(&raw[0..8]);
    let camera = camera_for_version(&version);
    let be16 = |at: usize| u16::from_be_bytes([raw[at], raw[at + 1]]);

    let prd = PrdBlock {
        sensor_height: be16(8),
        sensor_width: be16(10),
        image_height: be16(12),
        image_width: be16(14),
        data_size: raw[16],
        pixel_size: raw[17],
        storage_method: raw[18],
        reserved: [raw[19], raw[20], raw[21], raw[22]],
        bayer_pattern: raw[23],
        camera,
        version,
    };

    debug!(
        version = %prd.version,
        camera = prd.camera.unwrap_or("unknown"),
        width = prd.image_width,
        height = prd.image_height,
        "Decoded PRD block"
    );

    Some(prd)
}
