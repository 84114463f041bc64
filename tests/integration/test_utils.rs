//! Test utilities for integration tests.
//!
//! Provides an MRW file builder, a TIFF image writer for the TTW block in
//! either byte order, and a range reader that records the requests made.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use mrw_meta::{IoError, RangeReader};

// =============================================================================
// Tracking Range Reader
// =============================================================================

/// A range reader over in-memory data that counts and records reads.
pub struct TrackingMockReader {
    data: Bytes,
    identifier: String,
    read_count: AtomicUsize,
    requests: Mutex<Vec<(u64, usize)>>,
}

impl TrackingMockReader {
    pub fn new(data: impl Into<Bytes>, identifier: &str) -> Self {
        Self {
            data: data.into(),
            identifier: identifier.to_string(),
            read_count: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn read_count(&self) -> usize {
        self.read_count.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<(u64, usize)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl RangeReader for TrackingMockReader {
    async fn read_exact_at(&self, offset: u64, len: usize) -> Result<Bytes, IoError> {
        self.read_count.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push((offset, len));

        let start = offset as usize;
        let end = start + len;
        if end > self.data.len() {
            return Err(IoError::RangeOutOfBounds {
                offset,
                requested: len as u64,
                size: self.data.len() as u64,
            });
        }
        Ok(self.data.slice(start..end))
    }

    fn size(&self) -> u64 {
        self.data.len() as u64
    }

    fn identifier(&self) -> &str {
        &self.identifier
    }
}

// =============================================================================
// TIFF Image Writer
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ByteOrderType {
    /// "LL" marker, as written by some MRW firmware
    LittleEndian,
    /// "MM" marker
    BigEndian,
}

/// Writes values at fixed offsets into a growing TIFF image.
pub struct TiffImage {
    byte_order: ByteOrderType,
    data: Vec<u8>,
}

impl TiffImage {
    /// Start an image with a header pointing at the first IFD.
    pub fn new(byte_order: ByteOrderType, first_ifd: u32) -> Self {
        let mut image = Self {
            byte_order,
            data: Vec::new(),
        };
        let marker: &[u8] = match byte_order {
            ByteOrderType::LittleEndian => b"LL",
            ByteOrderType::BigEndian => b"MM",
        };
        image.put_bytes(0, marker);
        image.put_u16(2, 42);
        image.put_u32(4, first_ifd);
        image
    }

    fn ensure(&mut self, end: usize) {
        if self.data.len() < end {
            self.data.resize(end, 0);
        }
    }

    pub fn put_bytes(&mut self, at: usize, bytes: &[u8]) {
        self.ensure(at + bytes.len());
        self.data[at..at + bytes.len()].copy_from_slice(bytes);
    }

    pub fn put_u16(&mut self, at: usize, value: u16) {
        let bytes = match self.byte_order {
            ByteOrderType::LittleEndian => value.to_le_bytes(),
            ByteOrderType::BigEndian => value.to_be_bytes(),
        };
        self.put_bytes(at, &bytes);
    }

    pub fn put_u32(&mut self, at: usize, value: u32) {
        let bytes = match self.byte_order {
            ByteOrderType::LittleEndian => value.to_le_bytes(),
            ByteOrderType::BigEndian => value.to_be_bytes(),
        };
        self.put_bytes(at, &bytes);
    }

    pub fn put_rational(&mut self, at: usize, numerator: u32, denominator: u32) {
        self.put_u32(at, numerator);
        self.put_u32(at + 4, denominator);
    }

    /// Write an IFD at `at` and return the offset just past it.
    pub fn put_ifd(&mut self, at: usize, entries: &[IfdEntry], next: u32) -> usize {
        self.put_u16(at, entries.len() as u16);
        let mut pos = at + 2;
        for entry in entries {
            self.put_u16(pos, entry.tag);
            self.put_u16(pos + 2, entry.field_type);
            self.put_u32(pos + 4, entry.count);
            match entry.value {
                EntryValue::Offset(offset) => self.put_u32(pos + 8, offset),
                EntryValue::Short(v) => {
                    self.put_u32(pos + 8, 0);
                    self.put_u16(pos + 8, v);
                }
                EntryValue::Inline(bytes) => self.put_bytes(pos + 8, &bytes),
            }
            pos += 12;
        }
        self.put_u32(pos, next);
        pos + 4
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn build(self) -> Vec<u8> {
        self.data
    }
}

/// Value field of a directory entry.
#[derive(Clone, Copy, Debug)]
pub enum EntryValue {
    /// LONG value or offset to external data
    Offset(u32),
    /// SHORT value, left-aligned
    Short(u16),
    /// Raw bytes, not byte-swapped
    Inline([u8; 4]),
}

#[derive(Clone, Copy, Debug)]
pub struct IfdEntry {
    pub tag: u16,
    pub field_type: u16,
    pub count: u32,
    pub value: EntryValue,
}

impl IfdEntry {
    pub fn new(tag: u16, field_type: u16, count: u32, value: EntryValue) -> Self {
        Self {
            tag,
            field_type,
            count,
            value,
        }
    }
}

pub const ASCII: u16 = 2;
pub const SHORT: u16 = 3;
pub const LONG: u16 = 4;
pub const RATIONAL: u16 = 5;
pub const UNDEFINED: u16 = 7;
pub const SRATIONAL: u16 = 10;
pub const DOUBLE: u16 = 12;

// =============================================================================
// Sample TTW content
// =============================================================================

/// Offsets inside the sample TIFF image.
pub mod layout {
    pub const ROOT_IFD: usize = 8;
    pub const MAKE: usize = 200;
    pub const MODEL: usize = 208;
    pub const X_RESOLUTION: usize = 224;
    pub const DATE_TIME: usize = 232;
    pub const EXIF_IFD: usize = 300;
    pub const EXPOSURE_TIME: usize = 420;
    pub const F_NUMBER: usize = 428;
    pub const EXPOSURE_BIAS: usize = 436;
    pub const USER_COMMENT: usize = 444;
    pub const MAKER_NOTE: usize = 500;
    pub const CS_NEW: usize = 700;
    pub const CS_7D: usize = 1000;
    pub const CS_5D: usize = 1300;
}

/// Tag id present in the sample root IFD but absent from every table.
pub const UNKNOWN_ROOT_TAG: u16 = 0x9999;

/// A Dynax 7D style TTW payload: root IFD, EXIF IFD, maker note with New,
/// 7D and 5D camera-settings tables.
pub fn sample_tiff(byte_order: ByteOrderType) -> Vec<u8> {
    use layout::*;

    let mut image = TiffImage::new(byte_order, ROOT_IFD as u32);

    // Root IFD
    image.put_ifd(
        ROOT_IFD,
        &[
            IfdEntry::new(0x010F, ASCII, 8, EntryValue::Offset(MAKE as u32)),
            IfdEntry::new(0x0110, ASCII, 9, EntryValue::Offset(MODEL as u32)),
            IfdEntry::new(0x0112, SHORT, 1, EntryValue::Short(1)),
            IfdEntry::new(0x011A, RATIONAL, 1, EntryValue::Offset(X_RESOLUTION as u32)),
            IfdEntry::new(0x0132, ASCII, 20, EntryValue::Offset(DATE_TIME as u32)),
            IfdEntry::new(0x8769, LONG, 1, EntryValue::Offset(EXIF_IFD as u32)),
            IfdEntry::new(UNKNOWN_ROOT_TAG, SHORT, 1, EntryValue::Short(7)),
        ],
        0,
    );
    image.put_bytes(MAKE, b"MINOLTA\0");
    image.put_bytes(MODEL, b"DYNAX 7D\0");
    image.put_rational(X_RESOLUTION, 72, 1);
    image.put_bytes(DATE_TIME, b"2005:01:02 03:04:05\0");

    // EXIF IFD
    image.put_ifd(
        EXIF_IFD,
        &[
            IfdEntry::new(0x829A, RATIONAL, 1, EntryValue::Offset(EXPOSURE_TIME as u32)),
            IfdEntry::new(0x829D, RATIONAL, 1, EntryValue::Offset(F_NUMBER as u32)),
            IfdEntry::new(0x8827, SHORT, 1, EntryValue::Short(100)),
            IfdEntry::new(0x9204, SRATIONAL, 1, EntryValue::Offset(EXPOSURE_BIAS as u32)),
            IfdEntry::new(0x9286, UNDEFINED, 16, EntryValue::Offset(USER_COMMENT as u32)),
            IfdEntry::new(0x927C, UNDEFINED, 64, EntryValue::Offset(MAKER_NOTE as u32)),
        ],
        0,
    );
    image.put_rational(EXPOSURE_TIME, 1, 125);
    image.put_rational(F_NUMBER, 56, 10);
    image.put_u32(EXPOSURE_BIAS, (-1i32) as u32);
    image.put_u32(EXPOSURE_BIAS + 4, 3);
    image.put_bytes(USER_COMMENT, b"ASCII\0\0\0hello\0\0\0");

    // Maker note
    image.put_ifd(
        MAKER_NOTE,
        &[
            IfdEntry::new(0x0000, UNDEFINED, 4, EntryValue::Inline(*b"MLT0")),
            IfdEntry::new(0x0003, LONG, 0x40, EntryValue::Offset(CS_NEW as u32)),
            IfdEntry::new(0x0004, SHORT, 0x80, EntryValue::Offset(CS_7D as u32)),
            IfdEntry::new(0x010C, LONG, 1, EntryValue::Offset(25)),
            IfdEntry::new(0x0114, SHORT, 0xC0, EntryValue::Offset(CS_5D as u32)),
        ],
        0,
    );

    // Std table, 64 LONGs
    image.put_u32(CS_NEW + 4 * 0x01, 1); // ExposureMode
    image.put_u32(CS_NEW + 4 * 0x08, 0x30); // ISO
    image.put_u32(CS_NEW + 4 * 0x3F, 0);

    // 7D table, 128 SHORTs
    image.put_u16(CS_7D, 1); // ExposureMode: aperture priority
    image.put_u16(CS_7D + 2 * 0x1C, 100); // ISO
    image.put_u16(CS_7D + 2 * 0x3F, (-2i16) as u16); // ColorTemperature
    image.put_u16(CS_7D + 2 * 0x46, 76); // CameraOrientation
    image.put_u16(CS_7D + 2 * 0x7F, 0);

    // 5D table, 192 SHORTs
    image.put_u16(CS_5D + 2 * 0x0A, 4131); // ExposureMode
    image.put_u16(CS_5D + 2 * 0x49, (-1i16) as u16); // ColorTemperature
    image.put_u16(CS_5D + 2 * 0x50, 82); // CameraOrientation
    image.put_u16(CS_5D + 2 * 0xBF, 0);

    image.build()
}

// =============================================================================
// MRW File Builder
// =============================================================================

/// Builder for MRW test files: a root MRM block wrapping sub-blocks,
/// followed by image data.
pub struct MrwBuilder {
    blocks: Vec<u8>,
    image_data: usize,
}

impl Default for MrwBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MrwBuilder {
    pub fn new() -> Self {
        Self {
            blocks: Vec::new(),
            image_data: 64,
        }
    }

    /// Append a block with an arbitrary identifier.
    pub fn with_block(mut self, id: &[u8; 4], payload: &[u8]) -> Self {
        self.blocks.extend_from_slice(id);
        self.blocks
            .extend_from_slice(&(payload.len() as u32).to_be_bytes());
        self.blocks.extend_from_slice(payload);
        self
    }

    pub fn with_prd(self, version: &[u8; 8]) -> Self {
        self.with_block(b"\0PRD", &prd_payload(version))
    }

    pub fn with_ttw(self, tiff: &[u8]) -> Self {
        self.with_block(b"\0TTW", tiff)
    }

    pub fn with_wbg(self, coefficients: [u16; 4]) -> Self {
        let mut payload = vec![2, 2, 2, 2];
        for c in coefficients {
            payload.extend_from_slice(&c.to_be_bytes());
        }
        self.with_block(b"\0WBG", &payload)
    }

    pub fn with_rif(self, payload: &[u8]) -> Self {
        self.with_block(b"\0RIF", payload)
    }

    pub fn with_pad(self, len: usize) -> Self {
        self.with_block(b"\0PAD", &vec![0; len])
    }

    /// Bytes of image data after the root block.
    pub fn with_image_data(mut self, len: usize) -> Self {
        self.image_data = len;
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut data = b"\0MRM".to_vec();
        data.extend_from_slice(&(self.blocks.len() as u32).to_be_bytes());
        data.extend_from_slice(&self.blocks);
        data.extend(std::iter::repeat(0xA5).take(self.image_data));
        data
    }
}

/// PRD payload for a 3016x2008 sensor with packed 12-bit storage.
pub fn prd_payload(version: &[u8; 8]) -> Vec<u8> {
    let mut payload = version.to_vec();
    payload.extend_from_slice(&2008u16.to_be_bytes());
    payload.extend_from_slice(&3016u16.to_be_bytes());
    payload.extend_from_slice(&2000u16.to_be_bytes());
    payload.extend_from_slice(&3008u16.to_be_bytes());
    payload.extend_from_slice(&[12, 12, 0x59, 0, 0, 0, 0, 1]);
    payload
}

/// Full 64-byte RIF payload with ISO byte 0x30 (ISO 100).
pub fn rif_payload() -> Vec<u8> {
    let mut payload = vec![0u8; 64];
    payload[1] = 0x01; // saturation +1
    payload[5] = 0x00; // program mode: none
    payload[6] = 0x30; // ISO 100
    payload[7] = 0x00; // color mode: normal
    payload[60] = 52; // 5200 K
    payload
}

/// A complete file from a Dynax 7D: PRD, TTW, WBG, RIF, PAD.
pub fn sample_mrw(byte_order: ByteOrderType) -> Vec<u8> {
    MrwBuilder::new()
        .with_prd(b"21810002")
        .with_ttw(&sample_tiff(byte_order))
        .with_wbg([450, 256, 256, 380])
        .with_rif(&rif_payload())
        .with_pad(16)
        .build()
}
