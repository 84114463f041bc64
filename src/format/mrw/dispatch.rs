//! Tag tables and per-entry dispatch.
//!
//! Each directory kind has a static table mapping tag ids to a name and an
//! action. Fields are decoded and coerced to the kind the table expects;
//! pointer tags record the location of a sub-structure for a later pass.

use tracing::debug;

use super::camera_settings::CameraSettingsKind;
use super::ttw::{DiscoveredPointers, Emitter, Region};
use crate::error::TiffError;
use crate::format::tiff::{DirectoryEntry, ValueReader};
use crate::metadata::ValueKind;
use crate::metadata::ValueKind::{
    Ascii, Comment, SignedRational, Undefined, UnsignedLong, UnsignedRational, UnsignedShort,
};

// =============================================================================
// Tables
// =============================================================================

/// Which table an IFD's entries are looked up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directory {
    /// The main IFD chain
    Root,
    /// The EXIF sub-IFD
    Exif,
    /// The Minolta maker note
    MakerNote,
}

impl Directory {
    /// Key group, as in `Exif.<group>.<name>`.
    pub const fn group(self) -> &'static str {
        match self {
            Directory::Root => "Image",
            Directory::Exif => "Photo",
            Directory::MakerNote => "Minolta",
        }
    }

    pub fn tags(self) -> &'static [TagSpec] {
        match self {
            Directory::Root => ROOT_TAGS,
            Directory::Exif => EXIF_TAGS,
            Directory::MakerNote => MAKER_NOTE_TAGS,
        }
    }

    pub fn lookup(self, id: u16) -> Option<&'static TagSpec> {
        self.tags().iter().find(|spec| spec.id == id)
    }
}

/// Sub-structure referenced by a pointer tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pointer {
    ExifIfd,
    MakerNote,
    /// PrintIM block referenced from the root IFD
    PrintIm,
    /// PrintIM block referenced from the maker note
    MakerNotePrintIm,
    CameraSettings(CameraSettingsKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagAction {
    /// Decode and store under the tag name
    Field(ValueKind),
    /// Record the location of a sub-structure
    Pointer(Pointer),
    /// Known but not decoded
    Ignore,
}

#[derive(Debug, Clone, Copy)]
pub struct TagSpec {
    pub id: u16,
    pub name: &'static str,
    pub action: TagAction,
}

const fn tag(id: u16, name: &'static str, kind: ValueKind) -> TagSpec {
    TagSpec {
        id,
        name,
        action: TagAction::Field(kind),
    }
}

const fn pointer(id: u16, name: &'static str, target: Pointer) -> TagSpec {
    TagSpec {
        id,
        name,
        action: TagAction::Pointer(target),
    }
}

pub static ROOT_TAGS: &[TagSpec] = &[
    tag(0x0100, "ImageWidth", UnsignedLong),
    tag(0x0101, "ImageLength", UnsignedLong),
    tag(0x0103, "Compression", UnsignedShort),
    tag(0x010E, "ImageDescription", Ascii),
    tag(0x010F, "Make", Ascii),
    tag(0x0110, "Model", Ascii),
    tag(0x0112, "Orientation", UnsignedShort),
    tag(0x011A, "XResolution", UnsignedRational),
    tag(0x011B, "YResolution", UnsignedRational),
    tag(0x0128, "ResolutionUnit", UnsignedShort),
    tag(0x0131, "Software", Ascii),
    tag(0x0132, "DateTime", Ascii),
    pointer(0x8769, "ExifTag", Pointer::ExifIfd),
    pointer(0xC4A5, "PrintImageMatching", Pointer::PrintIm),
];

pub static EXIF_TAGS: &[TagSpec] = &[
    tag(0x829A, "ExposureTime", UnsignedRational),
    tag(0x829D, "FNumber", UnsignedRational),
    tag(0x8822, "ExposureProgram", UnsignedShort),
    tag(0x8827, "ISOSpeedRatings", UnsignedShort),
    tag(0x9000, "ExifVersion", Undefined),
    tag(0x9003, "DateTimeOriginal", Ascii),
    tag(0x9004, "DateTimeDigitized", Ascii),
    tag(0x9101, "ComponentsConfiguration", Undefined),
    tag(0x9203, "BrightnessValue", SignedRational),
    tag(0x9204, "ExposureBiasValue", SignedRational),
    tag(0x9205, "MaxApertureValue", UnsignedRational),
    tag(0x9207, "MeteringMode", UnsignedShort),
    tag(0x9208, "LightSource", UnsignedShort),
    tag(0x9209, "Flash", UnsignedShort),
    tag(0x920A, "FocalLength", UnsignedRational),
    tag(0x9214, "SubjectArea", UnsignedShort),
    pointer(0x927C, "MakerNote", Pointer::MakerNote),
    tag(0x9286, "UserComment", Comment),
    tag(0xA000, "FlashpixVersion", Undefined),
    tag(0xA001, "ColorSpace", UnsignedShort),
    tag(0xA002, "PixelXDimension", UnsignedLong),
    tag(0xA003, "PixelYDimension", UnsignedLong),
    TagSpec {
        id: 0xA005,
        name: "InteroperabilityTag",
        action: TagAction::Ignore,
    },
    tag(0xA401, "CustomRendered", UnsignedShort),
    tag(0xA402, "ExposureMode", UnsignedShort),
    tag(0xA403, "WhiteBalance", UnsignedShort),
    tag(0xA404, "DigitalZoomRatio", UnsignedRational),
    tag(0xA405, "FocalLengthIn35mmFilm", UnsignedShort),
    tag(0xA406, "SceneCaptureType", UnsignedShort),
    tag(0xA407, "GainControl", UnsignedRational),
    tag(0xA408, "Contrast", UnsignedShort),
    tag(0xA409, "Saturation", UnsignedShort),
    tag(0xA40A, "Sharpness", UnsignedShort),
];

pub static MAKER_NOTE_TAGS: &[TagSpec] = &[
    tag(0x0000, "Version", Undefined),
    pointer(
        0x0001,
        "CameraSettingsStdOld",
        Pointer::CameraSettings(CameraSettingsKind::Old),
    ),
    pointer(
        0x0003,
        "CameraSettingsStdNew",
        Pointer::CameraSettings(CameraSettingsKind::New),
    ),
    pointer(
        0x0004,
        "CameraSettings7D",
        Pointer::CameraSettings(CameraSettingsKind::SevenD),
    ),
    tag(0x0040, "CompressedImageSize", UnsignedLong),
    tag(0x0088, "ThumbnailOffset", UnsignedLong),
    tag(0x0089, "ThumbnailLength", UnsignedLong),
    tag(0x0101, "ColorMode", UnsignedLong),
    tag(0x0102, "Quality", UnsignedLong),
    tag(0x0103, "ImageSize", UnsignedLong),
    tag(0x0107, "ImageStabilization", UnsignedLong),
    tag(0x010A, "ZoneMatching", UnsignedLong),
    tag(0x010B, "ColorTemperature", UnsignedLong),
    tag(0x010C, "LensID", UnsignedLong),
    pointer(
        0x0114,
        "CameraSettings5D",
        Pointer::CameraSettings(CameraSettingsKind::FiveD),
    ),
    pointer(0x0E00, "PrintIM", Pointer::MakerNotePrintIm),
];

// =============================================================================
// Dispatch
// =============================================================================

/// Handle one directory entry.
///
/// Unknown tag ids are skipped with a debug log. Every other failure is
/// recorded as a warning and only drops this entry.
pub fn dispatch_entry(
    directory: Directory,
    entry: &DirectoryEntry,
    reader: &ValueReader<'_>,
    pointers: &mut DiscoveredPointers,
    emitter: &mut Emitter<'_>,
) {
    if entry.field_type.is_none() {
        let error = TiffError::UnknownFieldType {
            tag: entry.tag,
            field_type: entry.field_type_raw,
        };
        emitter.warn(entry.position, error.to_string());
        return;
    }

    let Some(spec) = directory.lookup(entry.tag) else {
        debug!(
            directory = directory.group(),
            tag = format_args!("0x{:04X}", entry.tag),
            "Skipping unrecognized tag"
        );
        return;
    };

    match spec.action {
        TagAction::Field(kind) => decode_field(directory, spec, kind, entry, reader, emitter),
        TagAction::Pointer(target) => record_pointer(spec, target, entry, reader, pointers, emitter),
        TagAction::Ignore => {
            debug!(tag = spec.name, "Ignoring tag");
        }
    }
}

fn decode_field(
    directory: Directory,
    spec: &TagSpec,
    kind: ValueKind,
    entry: &DirectoryEntry,
    reader: &ValueReader<'_>,
    emitter: &mut Emitter<'_>,
) {
    let key = format!("Exif.{}.{}", directory.group(), spec.name);

    let value = match reader.read_value(entry) {
        Ok(value) => value,
        Err(e) => {
            emitter.warn(entry.position, format!("{key}: {e}"));
            return;
        }
    };

    let found = value.type_name();
    match value.coerce(kind) {
        Some(value) => emitter.field(key, value),
        None => {
            let error = TiffError::TypeMismatch {
                tag: spec.name,
                expected: kind.name(),
                found,
            };
            emitter.warn(entry.position, error.to_string());
        }
    }
}

fn record_pointer(
    spec: &TagSpec,
    target: Pointer,
    entry: &DirectoryEntry,
    reader: &ValueReader<'_>,
    pointers: &mut DiscoveredPointers,
    emitter: &mut Emitter<'_>,
) {
    let order = reader.byte_order();

    match target {
        Pointer::ExifIfd => {
            pointers.exif_ifd = Some(entry.value_offset(order) as u64);
        }
        Pointer::MakerNote => {
            pointers.maker_note = Some(entry.data_position(order));
        }
        Pointer::PrintIm | Pointer::MakerNotePrintIm | Pointer::CameraSettings(_) => {
            let Some(size) = entry.value_byte_size() else {
                emitter.warn(entry.position, format!("{}: unknown value size", spec.name));
                return;
            };
            let region = Region {
                offset: entry.data_position(order),
                size,
            };
            match target {
                Pointer::CameraSettings(kind) => pointers.set_camera_settings(kind, region),
                Pointer::MakerNotePrintIm => pointers.maker_note_print_im = Some(region),
                _ => pointers.print_im = Some(region),
            }
        }
    }

    debug!(tag = spec.name, "Recorded pointer");
}
