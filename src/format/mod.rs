//! File format decoding.
//!
//! - [`cursor`] - bounds-checked reads over the raw buffer
//! - [`tiff`] - the TIFF directory structure embedded in MRW files
//! - [`mrw`] - the MRW block container and its metadata blocks

pub mod cursor;
pub mod mrw;
pub mod tiff;

pub use mrw::{load_and_parse, parse, MrwMetadata, MrwParser};
