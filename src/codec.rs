//! LSB embedding and extraction over raw pixel buffers.
//!
//! The bitstream produced by [`bits::bitstream`] is written one bit per buffer
//! byte, starting at index 0: bit 0 of every touched byte is replaced and the
//! seven high bits are preserved exactly. Extraction reads the 32-bit header
//! first and then exactly as many payload bits as it announces.
//!
//! Both directions are pure functions over a borrowed buffer. They hold no
//! state, so independent buffers can be processed from any number of threads.

use log::debug;

use crate::bits::{self, HEADER_BITS};
use crate::error::{Error, Result};

/// Channels per pixel the codec accepts: red, green, blue, no alpha.
pub const RGB_CHANNELS: u8 = 3;

/// Shape of a raw, channel-interleaved pixel buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelLayout {
    width: u32,
    height: u32,
    channels: u8,
}

impl PixelLayout {
    /// Create a validated layout.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimensions`] if either dimension is zero, or
    /// [`Error::UnsupportedChannels`] if `channels` is not 3. A 4-channel
    /// buffer would otherwise spend alpha bytes as capacity.
    pub fn new(width: u32, height: u32, channels: u8) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimensions { width, height });
        }
        if channels != RGB_CHANNELS {
            return Err(Error::UnsupportedChannels(channels));
        }
        Ok(Self {
            width,
            height,
            channels,
        })
    }

    /// Layout of an RGB buffer with the given dimensions.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimensions`] if either dimension is zero.
    pub fn rgb(width: u32, height: u32) -> Result<Self> {
        Self::new(width, height, RGB_CHANNELS)
    }

    /// Image width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Image height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bytes per pixel.
    #[must_use]
    pub fn channels(&self) -> u8 {
        self.channels
    }

    /// Total byte length `width * height * channels`.
    #[must_use]
    pub fn byte_len(&self) -> usize {
        self.width as usize * self.height as usize * usize::from(self.channels)
    }

    /// Ensure `buffer` has exactly the length this layout describes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BufferSizeMismatch`] otherwise.
    pub fn check(&self, buffer: &[u8]) -> Result<()> {
        let expected = self.byte_len();
        if buffer.len() == expected {
            Ok(())
        } else {
            Err(Error::BufferSizeMismatch {
                expected,
                actual: buffer.len(),
            })
        }
    }
}

/// Bits needed to stamp `message`, header included.
#[must_use]
pub fn required_bits(message: &str) -> usize {
    message.len().saturating_mul(8).saturating_add(HEADER_BITS)
}

/// Bits a buffer of `buffer_len` bytes can carry.
#[must_use]
pub fn capacity_bits(buffer_len: usize) -> usize {
    buffer_len
}

/// Embed `message` into the least significant bits of `buffer`.
///
/// Returns the number of leading bytes that now carry the stamp. Bytes past
/// that point are not touched.
///
/// # Errors
///
/// Returns [`Error::Capacity`] if header plus payload need more bits than the
/// buffer has bytes, or [`Error::PayloadTooLarge`] if the payload length does
/// not fit the header. The buffer is left unmodified in either case.
pub fn embed(buffer: &mut [u8], message: &str) -> Result<usize> {
    let stream = bits::bitstream(message)?;
    let available = capacity_bits(buffer.len());
    if stream.len() > available {
        return Err(Error::Capacity {
            required: stream.len(),
            available,
        });
    }

    for (byte, bit) in buffer.iter_mut().zip(&stream) {
        *byte = (*byte & 0xFE) | bit;
    }

    debug!(
        "embedded {} payload bits into {available}-byte buffer",
        stream.len() - HEADER_BITS
    );
    Ok(stream.len())
}

/// Validate `buffer` against `layout`, then [`embed`].
///
/// # Errors
///
/// Returns [`Error::BufferSizeMismatch`] if the buffer does not match the
/// layout, or any error from [`embed`].
pub fn embed_with_layout(buffer: &mut [u8], layout: PixelLayout, message: &str) -> Result<usize> {
    layout.check(buffer)?;
    embed(buffer, message)
}

/// Read the raw 32-bit length header from the first 32 bytes of `buffer`.
///
/// Returns `None` if the buffer is too short to hold a header. The value is
/// not range-checked.
#[must_use]
pub fn read_header(buffer: &[u8]) -> Option<u32> {
    buffer
        .get(..HEADER_BITS)
        .map(bits::bits_to_length)
}

/// Recover a stamp previously written by [`embed`].
///
/// # Errors
///
/// Returns [`Error::NotFound`] if the header is missing, zero, or announces
/// more bits than the buffer holds after it. Returns [`Error::Decode`] if the
/// payload is not valid UTF-8.
///
/// The header check is a heuristic: any buffer whose first 32 LSBs happen to
/// encode an in-range length is read as carrying a stamp.
pub fn extract(buffer: &[u8]) -> Result<String> {
    let Some(header) = read_header(buffer) else {
        debug!("buffer of {} bytes cannot hold a header", buffer.len());
        return Err(Error::NotFound);
    };

    let available = buffer.len() - HEADER_BITS;
    let message_len = header as usize;
    if message_len == 0 || message_len > available {
        debug!("header announces {message_len} bits, {available} available");
        return Err(Error::NotFound);
    }

    let payload: Vec<u8> = buffer[HEADER_BITS..HEADER_BITS + message_len]
        .iter()
        .map(|byte| byte & 1)
        .collect();
    bits::bytes_to_text(bits::bits_to_bytes(&payload))
}

/// Validate `buffer` against `layout`, then [`extract`].
///
/// # Errors
///
/// Returns [`Error::BufferSizeMismatch`] if the buffer does not match the
/// layout, or any error from [`extract`].
pub fn extract_with_layout(buffer: &[u8], layout: PixelLayout) -> Result<String> {
    layout.check(buffer)?;
    extract(buffer)
}
