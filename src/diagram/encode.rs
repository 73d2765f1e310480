use std::io::{Read, Write};

use flate2::{Compression, read::DeflateDecoder, write::DeflateEncoder};

/// The radix-64 alphabet used by PlantUML.
///
/// This is not the standard base64 alphabet: digits come first, and `-` and
/// `_` replace `+` and `/`.
pub const ALPHABET: &[u8; 64] =
    b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz-_";

/// Encodes diagram source as a URL-safe token.
///
/// The UTF-8 bytes are compressed as a raw deflate stream (no zlib header or
/// checksum) at the best compression level, then written out with
/// [`to_radix64`]. Empty input gives an empty token.
#[must_use]
pub fn encode(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    to_radix64(&deflate(text.as_bytes()))
}

/// Compresses `bytes` into a raw deflate stream at the best compression
/// level.
#[must_use]
pub fn deflate(bytes: &[u8]) -> Vec<u8> {
    let mut encoder = DeflateEncoder::new(Vec::with_capacity(bytes.len() / 2), Compression::best());
    encoder
        .write_all(bytes)
        .expect("in-memory deflate cannot fail");
    encoder.finish().expect("in-memory deflate cannot fail")
}

/// Writes bytes in PlantUML's radix-64 form.
///
/// Each group of three bytes becomes four symbols. A trailing group of one
/// byte becomes two symbols and a trailing group of two bytes becomes three;
/// no padding is emitted.
#[must_use]
pub fn to_radix64(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len().div_ceil(3) * 4);

    for chunk in bytes.chunks(3) {
        let b1 = chunk[0];
        let b2 = chunk.get(1).copied().unwrap_or(0);
        let b3 = chunk.get(2).copied().unwrap_or(0);

        out.push(symbol(b1 >> 2));
        out.push(symbol(((b1 & 0x03) << 4) | (b2 >> 4)));
        if chunk.len() > 1 {
            out.push(symbol(((b2 & 0x0F) << 2) | (b3 >> 6)));
        }
        if chunk.len() > 2 {
            out.push(symbol(b3 & 0x3F));
        }
    }

    out
}

fn symbol(value: u8) -> char {
    char::from(ALPHABET[usize::from(value & 0x3F)])
}

/// Errors that can occur when decoding a token.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DecodeError {
    /// The token contains a character outside the alphabet.
    #[error("invalid character '{character}' at position {position}")]
    InvalidSymbol {
        /// The offending character.
        character: char,
        /// Its position in the token.
        position: usize,
    },
    /// The token ends with a single symbol, which cannot hold a whole byte.
    #[error("token length {0} is not a valid encoded length")]
    Truncated(usize),
    /// The decoded bytes are not a valid deflate stream.
    #[error("corrupt deflate stream: {0}")]
    Inflate(String),
    /// The decompressed source is not UTF-8.
    #[error("decoded source is not valid UTF-8")]
    Utf8,
}

/// Decodes a token produced by [`encode`] back into the diagram source.
///
/// # Errors
///
/// Returns an error if the token is not valid radix-64, or if its bytes are
/// not a deflate-compressed UTF-8 string.
pub fn decode(token: &str) -> Result<String, DecodeError> {
    if token.is_empty() {
        return Ok(String::new());
    }

    let bytes = from_radix64(token)?;

    let mut decoder = DeflateDecoder::new(bytes.as_slice());
    let mut inflated = Vec::new();
    decoder
        .read_to_end(&mut inflated)
        .map_err(|e| DecodeError::Inflate(e.to_string()))?;

    String::from_utf8(inflated).map_err(|_| DecodeError::Utf8)
}

/// Reverses [`to_radix64`].
///
/// # Errors
///
/// Returns an error on characters outside the alphabet, or if the length
/// leaves a single dangling symbol.
pub fn from_radix64(token: &str) -> Result<Vec<u8>, DecodeError> {
    let values = token
        .chars()
        .enumerate()
        .map(|(position, character)| {
            ALPHABET
                .iter()
                .position(|&symbol| char::from(symbol) == character)
                .and_then(|value| u8::try_from(value).ok())
                .ok_or(DecodeError::InvalidSymbol {
                    character,
                    position,
                })
        })
        .collect::<Result<Vec<u8>, _>>()?;

    if values.len() % 4 == 1 {
        return Err(DecodeError::Truncated(values.len()));
    }

    let mut bytes = Vec::with_capacity(values.len() / 4 * 3 + 2);
    for group in values.chunks(4) {
        let v1 = group[0];
        let v2 = group[1];
        bytes.push((v1 << 2) | (v2 >> 4));
        if let Some(&v3) = group.get(2) {
            bytes.push(((v2 & 0x0F) << 4) | (v3 >> 2));
            if let Some(&v4) = group.get(3) {
                bytes.push(((v3 & 0x03) << 6) | v4);
            }
        }
    }

    Ok(bytes)
}
