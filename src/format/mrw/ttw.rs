//! TTW block: the embedded TIFF structure.
//!
//! Decoding runs in passes. The root IFD chain is walked first; pointer
//! tags found on the way are collected in [`DiscoveredPointers`]. The EXIF
//! IFD, the maker note and finally the camera-settings tables are then
//! decoded from those pointers, in that order.

use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, info};

use super::blocks::BlockHeader;
use super::camera_settings::{self, CameraSettingsKind};
use super::diagnostics::ParseDiagnostics;
use super::dispatch::{dispatch_entry, Directory};
use crate::format::cursor::{ByteCursor, TiffCursor};
use crate::format::tiff::{ByteOrder, Ifd, TiffContext, TiffHeader, ValueReader, TIFF_HEADER_SIZE};
use crate::metadata::{MetadataSink, TagValue};

/// Upper bound on directories followed in the root chain.
pub const MAX_IFD_CHAIN: usize = 64;

// =============================================================================
// DiscoveredPointers
// =============================================================================

/// A byte range inside the TIFF region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Region {
    /// Offset relative to the TIFF base
    pub offset: u64,
    pub size: u64,
}

/// Sub-structure locations found while walking the directories.
///
/// All offsets are relative to the TIFF base.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DiscoveredPointers {
    pub exif_ifd: Option<u64>,
    pub maker_note: Option<u64>,
    pub print_im: Option<Region>,
    pub maker_note_print_im: Option<Region>,
    pub cs_old: Option<Region>,
    pub cs_new: Option<Region>,
    pub cs_7d: Option<Region>,
    pub cs_5d: Option<Region>,
}

impl DiscoveredPointers {
    pub fn camera_settings(&self, kind: CameraSettingsKind) -> Option<Region> {
        match kind {
            CameraSettingsKind::Old => self.cs_old,
            CameraSettingsKind::New => self.cs_new,
            CameraSettingsKind::SevenD => self.cs_7d,
            CameraSettingsKind::FiveD => self.cs_5d,
        }
    }

    pub fn set_camera_settings(&mut self, kind: CameraSettingsKind, region: Region) {
        let slot = match kind {
            CameraSettingsKind::Old => &mut self.cs_old,
            CameraSettingsKind::New => &mut self.cs_new,
            CameraSettingsKind::SevenD => &mut self.cs_7d,
            CameraSettingsKind::FiveD => &mut self.cs_5d,
        };
        *slot = Some(region);
    }
}

// =============================================================================
// Emitter
// =============================================================================

/// Output side of the TIFF passes: fields go to the sink, problems to the
/// diagnostics with their offset made absolute.
pub struct Emitter<'s> {
    sink: &'s mut MetadataSink,
    diagnostics: &'s mut ParseDiagnostics,
    base: u64,
}

impl<'s> Emitter<'s> {
    pub fn new(sink: &'s mut MetadataSink, diagnostics: &'s mut ParseDiagnostics, base: u64) -> Self {
        Self {
            sink,
            diagnostics,
            base,
        }
    }

    pub fn field(&mut self, key: String, value: TagValue) {
        self.sink.push(key, value);
    }

    /// Record a warning at an offset relative to the TIFF base.
    pub fn warn(&mut self, offset: u64, message: impl Into<String>) {
        self.diagnostics
            .warn(self.base.saturating_add(offset), message);
    }
}

// =============================================================================
// Decoding
// =============================================================================

/// Outcome of decoding a TTW block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtwResult {
    pub context: TiffContext,
    pub pointers: DiscoveredPointers,
    /// Directories read from the root chain
    pub ifd_count: usize,
}

/// Decode a TTW block. Returns `None` if it is too small for a TIFF header.
pub fn decode(
    buffer: ByteCursor<'_>,
    header: &BlockHeader,
    sink: &mut MetadataSink,
    diagnostics: &mut ParseDiagnostics,
) -> Option<TtwResult> {
    if (header.size as u64) < TIFF_HEADER_SIZE {
        diagnostics.warn(
            header.offset,
            format!("TTW block size {} is too small for a TIFF header", header.size),
        );
        return None;
    }

    let tiff_header = match TiffHeader::parse(header.payload(buffer)) {
        Ok(h) => h,
        Err(e) => {
            diagnostics.warn(header.payload_start(), e.to_string());
            return None;
        }
    };

    for anomaly in tiff_header.anomalies() {
        diagnostics.warn(header.payload_start(), anomaly.to_string());
    }
    if !tiff_header.is_expected_order() && tiff_header.byte_order == ByteOrder::LittleEndian {
        info!(
            offset = header.payload_start(),
            "Little-endian TIFF header in MRW file"
        );
    }

    let context = TiffContext {
        base: header.payload_start(),
        size: header.size as u64,
        byte_order: tiff_header.byte_order,
    };
    let cursor = TiffCursor::new(buffer, context);
    let reader = ValueReader::new(cursor);
    let mut emitter = Emitter::new(sink, diagnostics, context.base);
    let mut pointers = DiscoveredPointers::default();

    // Pass 1: root IFD chain
    let ifd_count = walk_root_chain(
        &cursor,
        &reader,
        tiff_header.first_ifd_offset as u64,
        &mut pointers,
        &mut emitter,
    );

    // Pass 2: EXIF IFD
    if let Some(offset) = pointers.exif_ifd {
        decode_single_ifd(Directory::Exif, &cursor, &reader, offset, &mut pointers, &mut emitter);
    }

    // Pass 3: maker note
    if let Some(offset) = pointers.maker_note {
        decode_single_ifd(
            Directory::MakerNote,
            &cursor,
            &reader,
            offset,
            &mut pointers,
            &mut emitter,
        );
    }

    // Pass 4: camera settings
    for kind in CameraSettingsKind::ALL {
        if let Some(region) = pointers.camera_settings(kind) {
            camera_settings::decode(kind, region, &cursor, &mut emitter);
        }
    }

    debug!(
        base = context.base,
        size = context.size,
        byte_order = ?context.byte_order,
        ifd_count,
        "Decoded TTW block"
    );

    Some(TtwResult {
        context,
        pointers,
        ifd_count,
    })
}

/// Follow the root chain until a zero offset, a repeated offset, an
/// unreadable directory or the chain limit.
fn walk_root_chain(
    cursor: &TiffCursor<'_>,
    reader: &ValueReader<'_>,
    first: u64,
    pointers: &mut DiscoveredPointers,
    emitter: &mut Emitter<'_>,
) -> usize {
    let mut visited = HashSet::new();
    let mut offset = first;
    let mut count = 0;

    while offset != 0 {
        if count >= MAX_IFD_CHAIN {
            emitter.warn(
                offset,
                format!("IFD chain longer than {MAX_IFD_CHAIN} directories, stopped"),
            );
            break;
        }
        if !visited.insert(offset) {
            emitter.warn(offset, format!("IFD loop: offset {offset} already visited"));
            break;
        }

        let Some(ifd) = read_ifd(cursor, offset, "IFD", emitter) else {
            break;
        };
        count += 1;

        for entry in &ifd.entries {
            dispatch_entry(Directory::Root, entry, reader, pointers, emitter);
        }
        offset = ifd.next_ifd_offset as u64;
    }

    count
}

fn decode_single_ifd(
    directory: Directory,
    cursor: &TiffCursor<'_>,
    reader: &ValueReader<'_>,
    offset: u64,
    pointers: &mut DiscoveredPointers,
    emitter: &mut Emitter<'_>,
) {
    let Some(ifd) = read_ifd(cursor, offset, directory.group(), emitter) else {
        return;
    };
    for entry in &ifd.entries {
        dispatch_entry(directory, entry, reader, pointers, emitter);
    }
}

fn read_ifd(
    cursor: &TiffCursor<'_>,
    offset: u64,
    label: &str,
    emitter: &mut Emitter<'_>,
) -> Option<Ifd> {
    match Ifd::read(cursor, offset) {
        Ok(ifd) => {
            debug!(
                directory = label,
                offset,
                entries = ifd.entries.len(),
                "Reading directory"
            );
            if ifd.truncated {
                emitter.warn(
                    offset,
                    format!(
                        "{label} directory truncated: {} of {} entries readable",
                        ifd.entries.len(),
                        ifd.declared_count
                    ),
                );
            }
            Some(ifd)
        }
        Err(e) => {
            emitter.warn(offset, format!("{label} directory unreadable: {e}"));
            None
        }
    }
}
