//! Minolta camera-settings tables.
//!
//! The maker note points at flat arrays of numbers whose meaning depends on
//! the position in the array. Three layouts exist:
//!
//! - **Std**: 32-bit values, used by maker-note tags 0x0001 (`MinoltaCsOld`)
//!   and 0x0003 (`MinoltaCsNew`).
//! - **7D**: 16-bit values, maker-note tag 0x0004 (`MinoltaCs7D`).
//! - **5D**: 16-bit values, maker-note tag 0x0114 (`MinoltaCs5D`).

use tracing::debug;

use super::ttw::{Emitter, Region};
use crate::format::cursor::TiffCursor;
use crate::metadata::TagValue;

// =============================================================================
// Layouts
// =============================================================================

/// One camera-settings table referenced from the maker note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CameraSettingsKind {
    Old,
    New,
    SevenD,
    FiveD,
}

/// A named position in a camera-settings table.
#[derive(Debug, Clone, Copy)]
pub struct CsField {
    pub position: u16,
    pub name: &'static str,
    pub signed: bool,
}

const fn field(position: u16, name: &'static str) -> CsField {
    CsField {
        position,
        name,
        signed: false,
    }
}

const fn signed(position: u16, name: &'static str) -> CsField {
    CsField {
        position,
        name,
        signed: true,
    }
}

static STD_FIELDS: &[CsField] = &[
    field(0x01, "ExposureMode"),
    field(0x02, "FlashMode"),
    field(0x03, "WhiteBalance"),
    field(0x04, "ImageSize"),
    field(0x05, "Quality"),
    field(0x06, "DriveMode"),
    field(0x07, "MeteringMode"),
    field(0x08, "ISO"),
    field(0x09, "ExposureTime"),
    field(0x0A, "FNumber"),
    field(0x0B, "MacroMode"),
    field(0x0C, "DigitalZoom"),
    field(0x0D, "ExposureCompensation"),
    field(0x0E, "BracketStep"),
    field(0x10, "IntervalLength"),
    field(0x11, "IntervalNumber"),
    field(0x12, "FocalLength"),
    field(0x13, "FocusDistance"),
    field(0x14, "FlashFired"),
    field(0x15, "MinoltaDate"),
    field(0x16, "MinoltaTime"),
    field(0x17, "MaxAperture"),
    field(0x1A, "FileNumberMemory"),
    field(0x1B, "LastFileNumber"),
    field(0x1C, "ColorBalanceRed"),
    field(0x1D, "ColorBalanceGreen"),
    field(0x1E, "ColorBalanceBlue"),
    field(0x1F, "Saturation"),
    field(0x20, "Contrast"),
    field(0x21, "Sharpness"),
    field(0x22, "SubjectProgram"),
    field(0x23, "FlashExposureComp"),
    field(0x24, "ISOSetting"),
    field(0x25, "MinoltaModel"),
    field(0x26, "IntervalMode"),
    field(0x27, "FolderName"),
    field(0x28, "ColorMode"),
    field(0x29, "ColorFilter"),
    field(0x2A, "BWFilter"),
    field(0x2B, "InternalFlash"),
    field(0x2C, "Brightness"),
    field(0x2D, "SpotFocusPointX"),
    field(0x2E, "SpotFocusPointY"),
    field(0x2F, "WideFocusZone"),
    field(0x30, "FocusMode"),
    field(0x31, "FocusArea"),
    field(0x32, "DECPosition"),
    field(0x33, "ColorProfile"),
    field(0x34, "DataImprint"),
    field(0x3F, "FlashMetering"),
];

static SEVEN_D_FIELDS: &[CsField] = &[
    field(0x00, "ExposureMode"),
    field(0x02, "ImageSize"),
    field(0x03, "Quality"),
    field(0x04, "WhiteBalance"),
    field(0x0E, "FocusDial"),
    field(0x10, "FocusPosition"),
    field(0x15, "Flash"),
    field(0x16, "FlashMode"),
    field(0x1C, "ISO"),
    field(0x25, "ColorMode"),
    field(0x2D, "MemCardSpace"),
    field(0x3E, "FocusMode"),
    signed(0x3F, "ColorTemperature"),
    field(0x40, "Hue"),
    field(0x46, "CameraOrientation"),
    field(0x47, "Aperture"),
    field(0x48, "ShutterTime"),
    field(0x4A, "MemCardSpace"),
    field(0x60, "NoiseReduction"),
    field(0x62, "PictureNumber"),
    field(0x71, "AntiShake"),
    field(0x75, "UseZoneMatching"),
];

static FIVE_D_FIELDS: &[CsField] = &[
    field(0x0A, "ExposureMode"),
    field(0x0D, "Quality"),
    field(0x25, "PhotometryMode"),
    field(0x26, "ISO"),
    field(0x30, "Sharpness"),
    field(0x31, "Contrast"),
    field(0x32, "Saturation"),
    field(0x37, "MemCardSpace1"),
    field(0x38, "ExposureRevision"),
    signed(0x49, "ColorTemperature"),
    field(0x50, "CameraOrientation"),
    field(0x54, "MemCardSpace2"),
    field(0xAE, "PictureNumber"),
    field(0xB0, "NoiseReduction"),
    field(0xBD, "AntiShake"),
];

impl CameraSettingsKind {
    /// Decoding order of the secondary pass.
    pub const ALL: [CameraSettingsKind; 4] = [
        CameraSettingsKind::Old,
        CameraSettingsKind::New,
        CameraSettingsKind::SevenD,
        CameraSettingsKind::FiveD,
    ];

    pub const fn namespace(self) -> &'static str {
        match self {
            CameraSettingsKind::Old => "MinoltaCsOld",
            CameraSettingsKind::New => "MinoltaCsNew",
            CameraSettingsKind::SevenD => "MinoltaCs7D",
            CameraSettingsKind::FiveD => "MinoltaCs5D",
        }
    }

    /// Width of one value in bytes.
    pub const fn width(self) -> u64 {
        match self {
            CameraSettingsKind::Old | CameraSettingsKind::New => 4,
            CameraSettingsKind::SevenD | CameraSettingsKind::FiveD => 2,
        }
    }

    pub fn fields(self) -> &'static [CsField] {
        match self {
            CameraSettingsKind::Old | CameraSettingsKind::New => STD_FIELDS,
            CameraSettingsKind::SevenD => SEVEN_D_FIELDS,
            CameraSettingsKind::FiveD => FIVE_D_FIELDS,
        }
    }

    /// Resolve a key namespace such as `MinoltaCs7D`.
    pub fn from_namespace(namespace: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.namespace() == namespace)
    }
}

// =============================================================================
// Decoding
// =============================================================================

/// Decode one table found at `region` (offsets relative to the TIFF base).
///
/// Emits every named position as `Exif.<Namespace>.<Name>`. A region that
/// runs past the TTW block is cut at the block end. Returns the number of
/// fields emitted.
pub fn decode(
    kind: CameraSettingsKind,
    region: Region,
    cursor: &TiffCursor<'_>,
    emitter: &mut Emitter<'_>,
) -> usize {
    let width = kind.width();
    if region.size % width != 0 {
        emitter.warn(
            region.offset,
            format!(
                "{} table size {} is not a multiple of {}",
                kind.namespace(),
                region.size,
                width
            ),
        );
    }

    let available = cursor.context().size.saturating_sub(region.offset);
    let size = if region.size > available {
        emitter.warn(
            region.offset,
            format!(
                "{} table ends at position {}: {} bytes declared, {} in block",
                kind.namespace(),
                available / width,
                region.size,
                available
            ),
        );
        available
    } else {
        region.size
    };

    let count = size / width;
    let mut emitted = 0;

    // Fields are sorted by position
    for spec in kind.fields() {
        let index = spec.position as u64;
        if index >= count {
            break;
        }

        let position = region.offset.saturating_add(index * width);
        let value = if width == 4 {
            cursor.u32(position).map(|v| TagValue::UnsignedLong(vec![v]))
        } else {
            cursor.u16(position).map(|v| {
                if spec.signed {
                    TagValue::SignedShort(vec![v as i16])
                } else {
                    TagValue::UnsignedShort(vec![v])
                }
            })
        };

        match value {
            Ok(value) => {
                emitter.field(format!("Exif.{}.{}", kind.namespace(), spec.name), value);
                emitted += 1;
            }
            Err(e) => {
                emitter.warn(
                    position,
                    format!("{} table ends at position {}: {}", kind.namespace(), index, e),
                );
                break;
            }
        }
    }

    debug!(
        table = kind.namespace(),
        offset = region.offset,
        entries = count,
        emitted,
        "Decoded camera settings"
    );
    emitted
}

// =============================================================================
// Value interpretation
// =============================================================================

/// Human-readable meaning of a camera-settings value, where known.
pub fn describe(kind: CameraSettingsKind, name: &str, value: i64) -> Option<&'static str> {
    match (kind, name) {
        (CameraSettingsKind::SevenD | CameraSettingsKind::FiveD, "ExposureMode") => {
            match value {
                0 => Some("(P) Program"),
                1 => Some("(A) Aperture Priority"),
                2 => Some("(S) Shutter Priority"),
                3 => Some("(M) Manual"),
                4 => Some("(P/green) Auto"),
                5 if kind == CameraSettingsKind::SevenD => Some("(Pa) Program Shift-A"),
                6 if kind == CameraSettingsKind::SevenD => Some("(Ps) Program Shift-S"),
                4131 if kind == CameraSettingsKind::FiveD => Some("(?) connected copying"),
                _ => None,
            }
        }
        (CameraSettingsKind::SevenD | CameraSettingsKind::FiveD, "CameraOrientation") => {
            match value {
                72 => Some("Horizontal"),
                76 => Some("ClockWise"),
                82 => Some("CounterClockWise"),
                _ => None,
            }
        }
        _ => None,
    }
}

/// [`describe`] for a full sink key such as `Exif.MinoltaCs7D.ExposureMode`.
pub fn describe_key(key: &str, value: &TagValue) -> Option<&'static str> {
    let mut parts = key.strip_prefix("Exif.")?.splitn(2, '.');
    let kind = CameraSettingsKind::from_namespace(parts.next()?)?;
    describe(kind, parts.next()?, value.as_i64()?)
}
