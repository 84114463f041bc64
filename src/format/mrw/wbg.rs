//! WBG (White Balance Gains) block.
//!
//! Four normalisation bytes followed by four u16 BE coefficients, in the
//! order of the sensor's colour filter array.

use serde::Serialize;
use tracing::debug;

use super::blocks::BlockHeader;
use super::diagnostics::ParseDiagnostics;
use crate::format::cursor::ByteCursor;

pub const WBG_SIZE: u64 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WhiteBalanceGains {
    pub normalization: [u8; 4],
    pub coefficients: [u16; 4],
}

pub fn decode(
    buffer: ByteCursor<'_>,
    header: &BlockHeader,
    diagnostics: &mut ParseDiagnostics,
) -> Option<WhiteBalanceGains> {
    if header.size as u64 != WBG_SIZE {
        diagnostics.warn(
            header.offset,
            format!("WBG block size {}, expected {}", header.size, WBG_SIZE),
        );
    }

    let raw = match buffer.bytes(header.payload_start(), WBG_SIZE) {
        Ok(raw) if header.size as u64 >= WBG_SIZE => raw,
        _ => {
            diagnostics.warn(header.offset, "WBG block too short, skipped");
            return None;
        }
    };

    let mut coefficients = [0u16; 4];
    for (i, c) in coefficients.iter_mut().enumerate() {
        let at = 4 + i * 2;
        *c = u16::from_be_bytes([raw[at], raw[at + 1]]);
    }

    let wbg = WhiteBalanceGains {
        normalization: [raw[0], raw[1], raw[2], raw[3]],
        coefficients,
    };
    debug!(coefficients = ?wbg.coefficients, "Decoded WBG block");
    Some(wbg)
}
