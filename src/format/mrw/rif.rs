//! RIF (Requested Image Format) block.
//!
//! Camera settings that affect the developed image, stored as single bytes
//! at fixed offsets. Offsets 8 to 55 are unknown. Older firmware writes
//! shorter blocks, so decoding stops at the first field past the payload
//! and keeps whatever was already decoded.

use serde::Serialize;
use tracing::debug;

use super::blocks::BlockHeader;
use super::diagnostics::ParseDiagnostics;
use crate::format::cursor::ByteCursor;

// =============================================================================
// Enumerations
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ProgramMode {
    None,
    Portrait,
    Text,
    NightPortrait,
    Sunset,
    SportsAction,
    Unknown(u8),
}

impl ProgramMode {
    pub fn from_byte(b: u8) -> Self {
        match b {
            0 => ProgramMode::None,
            1 => ProgramMode::Portrait,
            2 => ProgramMode::Text,
            3 => ProgramMode::NightPortrait,
            4 => ProgramMode::Sunset,
            5 => ProgramMode::SportsAction,
            other => ProgramMode::Unknown(other),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ProgramMode::None => "None",
            ProgramMode::Portrait => "Portrait",
            ProgramMode::Text => "Text",
            ProgramMode::NightPortrait => "Night Portrait",
            ProgramMode::Sunset => "Sunset",
            ProgramMode::SportsAction => "Sports Action",
            ProgramMode::Unknown(_) => "*UNKNOWN*",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ColorMode {
    NormalColor,
    BlackAndWhite,
    VividColor,
    Solarization,
    AdobeRgb,
    NaturalSrgb,
    NaturalPlusSrgb,
    EmbedAdobeRgb,
    Unknown(u8),
}

impl ColorMode {
    pub fn from_byte(b: u8) -> Self {
        match b {
            0x00 => ColorMode::NormalColor,
            0x01 => ColorMode::BlackAndWhite,
            0x02 => ColorMode::VividColor,
            0x03 => ColorMode::Solarization,
            0x04 => ColorMode::AdobeRgb,
            0x0D => ColorMode::NaturalSrgb,
            0x0E => ColorMode::NaturalPlusSrgb,
            0x84 => ColorMode::EmbedAdobeRgb,
            other => ColorMode::Unknown(other),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ColorMode::NormalColor => "Normal Color",
            ColorMode::BlackAndWhite => "B&W",
            ColorMode::VividColor => "Vivid Color",
            ColorMode::Solarization => "Solarization",
            ColorMode::AdobeRgb => "AdobeRGB",
            ColorMode::NaturalSrgb => "Natural sRGB",
            ColorMode::NaturalPlusSrgb => "Natural+ sRGB",
            ColorMode::EmbedAdobeRgb => "EmbedAdobeRGB",
            ColorMode::Unknown(_) => "*UNKNOWN*",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ZoneMatching {
    None,
    High,
    Low,
    Unknown(u8),
}

impl ZoneMatching {
    pub fn from_byte(b: u8) -> Self {
        match b {
            0 => ZoneMatching::None,
            1 => ZoneMatching::High,
            2 => ZoneMatching::Low,
            other => ZoneMatching::Unknown(other),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ZoneMatching::None => "NONE",
            ZoneMatching::High => "HIGH",
            ZoneMatching::Low => "LOW",
            ZoneMatching::Unknown(_) => "*UNKNOWN*",
        }
    }
}

/// ISO speed encoded in one RIF byte.
pub fn iso_from_byte(b: u8) -> f64 {
    2f64.powf(b as f64 / 8.0 - 1.0) * 3.125
}

// =============================================================================
// RequestedImageFormat
// =============================================================================

/// Decoded RIF fields. A field is `None` when the block ended before it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RequestedImageFormat {
    pub unknown0: Option<u8>,
    pub saturation: Option<i8>,
    pub contrast: Option<i8>,
    pub sharpness: Option<i8>,
    pub white_balance_mode: Option<u8>,
    pub program_mode: Option<ProgramMode>,
    pub iso: Option<f64>,
    pub color_mode: Option<ColorMode>,
    pub color_filter: Option<i8>,
    pub bw_filter: Option<u8>,
    pub zone_matching: Option<ZoneMatching>,
    pub hue: Option<i8>,
    /// Kelvin
    pub wb_temperature: Option<u32>,
}

#[derive(Debug, Clone, Copy)]
enum RifField {
    Unknown0,
    Saturation,
    Contrast,
    Sharpness,
    WhiteBalanceMode,
    ProgramMode,
    Iso,
    ColorMode,
    ColorFilter,
    BwFilter,
    ZoneMatching,
    Hue,
    WbTemperature,
}

/// Field offsets in decoding order.
const RIF_FIELDS: &[(u64, RifField)] = &[
    (0, RifField::Unknown0),
    (1, RifField::Saturation),
    (2, RifField::Contrast),
    (3, RifField::Sharpness),
    (4, RifField::WhiteBalanceMode),
    (5, RifField::ProgramMode),
    (6, RifField::Iso),
    (7, RifField::ColorMode),
    (56, RifField::ColorFilter),
    (57, RifField::BwFilter),
    (58, RifField::ZoneMatching),
    (59, RifField::Hue),
    (60, RifField::WbTemperature),
];

impl RequestedImageFormat {
    fn set(&mut self, field: RifField, b: u8) {
        match field {
            RifField::Unknown0 => self.unknown0 = Some(b),
            RifField::Saturation => self.saturation = Some(b as i8),
            RifField::Contrast => self.contrast = Some(b as i8),
            RifField::Sharpness => self.sharpness = Some(b as i8),
            RifField::WhiteBalanceMode => self.white_balance_mode = Some(b),
            RifField::ProgramMode => self.program_mode = Some(ProgramMode::from_byte(b)),
            RifField::Iso => self.iso = Some(iso_from_byte(b)),
            RifField::ColorMode => self.color_mode = Some(ColorMode::from_byte(b)),
            RifField::ColorFilter => self.color_filter = Some(b as i8),
            RifField::BwFilter => self.bw_filter = Some(b),
            RifField::ZoneMatching => self.zone_matching = Some(ZoneMatching::from_byte(b)),
            RifField::Hue => self.hue = Some(b as i8),
            RifField::WbTemperature => self.wb_temperature = Some(b as u32 * 100),
        }
    }
}

/// Decode a RIF payload, stopping at the first field that is not present.
pub fn decode(
    buffer: ByteCursor<'_>,
    header: &BlockHeader,
    diagnostics: &mut ParseDiagnostics,
) -> RequestedImageFormat {
    let payload = header.payload(buffer);
    let mut rif = RequestedImageFormat::default();

    for &(at, field) in RIF_FIELDS {
        let byte = if at < header.size as u64 {
            payload.u8_at(at).ok()
        } else {
            None
        };
        let Some(b) = byte else {
            diagnostics.warn(
                header.payload_start() + at,
                format!("RIF block ends before offset {at}, remaining fields skipped"),
            );
            return rif;
        };
        rif.set(field, b);
    }

    debug!(iso = ?rif.iso, "Decoded RIF block");
    rif
}
