//! # mrw-meta
//!
//! Metadata decoder for Minolta / Konica-Minolta MRW camera raw files.
//!
//! An MRW file is a small container of tagged blocks in front of the raw
//! sensor data. This library walks the container, decodes the picture
//! dimensions (PRD), white balance (WBG) and requested image format (RIF)
//! blocks, and reads the embedded TIFF block as a chain of IFDs with EXIF,
//! maker-note and Minolta camera-settings sub-structures.
//!
//! ## Architecture
//!
//! - [`io`] - Async range readers and size-capped raw loading
//! - [`mod@format`] - Byte cursors, TIFF directories and MRW blocks
//! - [`metadata`] - Typed values and the ordered metadata sink
//! - [`config`] - CLI configuration types
//!
//! ## Example
//!
//! ```rust,no_run
//! use mrw_meta::{FileRangeReader, load_and_parse};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let reader = FileRangeReader::open("PICT0001.MRW").await?;
//!     let metadata = load_and_parse(&reader).await?;
//!
//!     println!("Camera: {:?}", metadata.camera());
//!     for entry in &metadata.exif {
//!         println!("{} = {}", entry.key, entry.value);
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod format;
pub mod io;
pub mod metadata;

// Re-export commonly used types
pub use config::{Config, OutputFormat};
pub use error::{IoError, MrwError, TiffError};
pub use format::mrw::{
    describe, describe_key, CameraSettingsKind, ColorMode, DiscoveredPointers, ParseDiagnostics,
    PrdBlock, ProgramMode, Region, RequestedImageFormat, Warning, WhiteBalanceGains,
    ZoneMatching,
};
pub use format::tiff::{ByteOrder, FieldType, TiffContext};
pub use format::{load_and_parse, parse, MrwMetadata, MrwParser};
pub use io::{load_raw, FileRangeReader, MemoryRangeReader, RangeReader, RawBuffer, MAX_RAW_SIZE};
pub use metadata::{MetadataEntry, MetadataSink, TagValue, ValueKind};
