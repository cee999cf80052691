//! Text to wire-byte translation.
//!
//! Outgoing text goes through [`ByteEncoder::encode`]; incoming bytes always
//! come back through the ASCII-oriented [`ByteEncoder::decode_ascii`],
//! whatever the outgoing encoding is.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Replacement for anything that has no ASCII representation.
const REPLACEMENT: u8 = b'?';

/// Converts between text and the bytes sent over the wire.
pub trait ByteEncoder: Send + Sync + fmt::Debug {
    /// Encode `text` for transmission. `None` or an empty vector means there
    /// is nothing to send.
    fn encode(&self, text: &str) -> Option<Vec<u8>>;

    /// Decode the first `length` bytes of `bytes`. Bytes outside 7-bit ASCII
    /// become `?`.
    fn decode_ascii(&self, bytes: &[u8], length: usize) -> String {
        let length = length.min(bytes.len());
        bytes[..length]
            .iter()
            .map(|&b| if b.is_ascii() { b as char } else { REPLACEMENT as char })
            .collect()
    }
}

/// 7-bit ASCII. Characters outside the range are sent as `?`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AsciiEncoder;

impl ByteEncoder for AsciiEncoder {
    fn encode(&self, text: &str) -> Option<Vec<u8>> {
        Some(
            text.chars()
                .map(|c| if c.is_ascii() { c as u8 } else { REPLACEMENT })
                .collect(),
        )
    }
}

/// UTF-8, sent as-is.
#[derive(Debug, Clone, Copy, Default)]
pub struct Utf8Encoder;

impl ByteEncoder for Utf8Encoder {
    fn encode(&self, text: &str) -> Option<Vec<u8>> {
        Some(text.as_bytes().to_vec())
    }
}

/// Encoder selection as it appears in configuration and on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncodingKind {
    #[default]
    Ascii,
    Utf8,
}

impl EncodingKind {
    pub fn encoder(self) -> Arc<dyn ByteEncoder> {
        match self {
            Self::Ascii => Arc::new(AsciiEncoder),
            Self::Utf8 => Arc::new(Utf8Encoder),
        }
    }
}

impl FromStr for EncodingKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ascii" => Ok(Self::Ascii),
            "utf8" | "utf-8" => Ok(Self::Utf8),
            other => Err(format!("unknown encoding '{other}', expected 'ascii' or 'utf8'")),
        }
    }
}

impl fmt::Display for EncodingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ascii => f.write_str("ascii"),
            Self::Utf8 => f.write_str("utf8"),
        }
    }
}
