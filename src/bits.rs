//! Bit packing for the stamp bitstream.
//!
//! A stamp is serialized as a 32-bit big-endian header holding the payload
//! length in bits, followed by the UTF-8 bytes of the text. Every byte is
//! unpacked most-significant bit first. Bits are represented as `u8` values
//! that are always `0` or `1`, so they can be OR-ed straight into a channel.

use crate::error::{Error, Result};

/// Width of the length header in bits.
pub const HEADER_BITS: usize = 32;

/// Unpack the UTF-8 bytes of `message` into bits, MSB first per byte.
///
/// The result always holds `8 * message.len()` bits.
#[must_use]
pub fn text_to_bits(message: &str) -> Vec<u8> {
    let bytes = message.as_bytes();
    let mut bits = Vec::with_capacity(bytes.len() * 8);
    for &byte in bytes {
        bits.extend((0..8).rev().map(|shift| (byte >> shift) & 1));
    }
    bits
}

/// Encode `n` as 32 bits, most significant first.
#[must_use]
pub fn length_to_bits(n: u32) -> [u8; HEADER_BITS] {
    let mut bits = [0u8; HEADER_BITS];
    for (i, bit) in bits.iter_mut().enumerate() {
        #[allow(clippy::cast_possible_truncation)]
        {
            *bit = ((n >> (HEADER_BITS - 1 - i)) & 1) as u8;
        }
    }
    bits
}

/// Read a header back from its bits. Only the lowest bit of each value counts.
///
/// Bits past the first 32 are ignored.
#[must_use]
pub fn bits_to_length(bits: &[u8]) -> u32 {
    bits.iter()
        .take(HEADER_BITS)
        .fold(0u32, |acc, &bit| (acc << 1) | u32::from(bit & 1))
}

/// Group bits into bytes, MSB first.
///
/// A trailing group shorter than 8 bits is zero-padded on the right, so
/// `[1, 0, 1]` becomes `0b1010_0000`.
#[must_use]
pub fn bits_to_bytes(bits: &[u8]) -> Vec<u8> {
    bits.chunks(8)
        .map(|chunk| {
            let byte = chunk.iter().fold(0u8, |acc, &bit| (acc << 1) | (bit & 1));
            byte << (8 - chunk.len())
        })
        .collect()
}

/// Decode recovered bytes as UTF-8.
///
/// # Errors
///
/// Returns [`Error::Decode`] if the bytes are not valid UTF-8.
pub fn bytes_to_text(bytes: Vec<u8>) -> Result<String> {
    Ok(String::from_utf8(bytes)?)
}

/// Header value for a payload of `payload_bits` bits.
///
/// # Errors
///
/// Returns [`Error::PayloadTooLarge`] if `payload_bits` exceeds `u32::MAX`.
pub fn header_value(payload_bits: usize) -> Result<u32> {
    u32::try_from(payload_bits).map_err(|_| Error::PayloadTooLarge { bits: payload_bits })
}

/// Build the full bitstream for `message`: header followed by payload.
///
/// # Errors
///
/// Returns [`Error::PayloadTooLarge`] if the payload length in bits does not
/// fit the 32-bit header.
pub fn bitstream(message: &str) -> Result<Vec<u8>> {
    let payload_len = header_value(message.len().saturating_mul(8))?;
    let payload = text_to_bits(message);

    let mut stream = Vec::with_capacity(HEADER_BITS + payload.len());
    stream.extend_from_slice(&length_to_bits(payload_len));
    stream.extend(payload);
    Ok(stream)
}
