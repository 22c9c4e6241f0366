//! Text form of a fingerprint as stored in the cache file.
//!
//! Every block is written as exactly 16 lowercase hex digits and blocks are
//! separated by a single space. Decoding is more lenient and accepts any run
//! of whitespace between blocks.

use std::fmt::Write;

use thiserror::Error;

use super::Fingerprint;

/// Errors produced while decoding a fingerprint.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    /// The input contained no blocks at all.
    #[error("Fingerprint contains no blocks")]
    Empty,

    /// A token was not a valid 64-bit hex number.
    #[error("Invalid fingerprint block '{0}'")]
    InvalidBlock(String),
}

/// Encode a fingerprint as space-separated, zero-padded hex blocks.
#[must_use]
pub fn encode(fingerprint: &Fingerprint) -> String {
    let blocks = fingerprint.blocks();
    let mut out = String::with_capacity(blocks.len() * 17);
    for (i, block) in blocks.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        // Writing into a String cannot fail.
        let _ = write!(out, "{block:016x}");
    }
    out
}

/// Decode a fingerprint from whitespace-separated hex blocks.
///
/// # Errors
///
/// Returns [`CodecError::Empty`] when the input has no tokens and
/// [`CodecError::InvalidBlock`] when a token does not parse as hex.
pub fn decode(text: &str) -> Result<Fingerprint, CodecError> {
    let blocks = text
        .split_whitespace()
        .map(|token| {
            u64::from_str_radix(token, 16).map_err(|_| CodecError::InvalidBlock(token.to_string()))
        })
        .collect::<Result<Vec<u64>, CodecError>>()?;

    Fingerprint::new(blocks).ok_or(CodecError::Empty)
}
