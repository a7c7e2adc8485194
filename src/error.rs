//! Error types for the hidden-stamp crate.

use std::string::FromUtf8Error;

/// Errors that can occur while stamping or verifying an image.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The image has no resolvable width or height.
    #[error("invalid image dimensions ({width}x{height})")]
    InvalidDimensions {
        /// Image width in pixels.
        width: u32,
        /// Image height in pixels.
        height: u32,
    },

    /// The raw buffer does not use the RGB channel layout.
    #[error("unsupported channel count {0} (expected 3, RGB without alpha)")]
    UnsupportedChannels(u8),

    /// The raw buffer length disagrees with its declared layout.
    #[error("pixel buffer holds {actual} bytes, layout requires {expected}")]
    BufferSizeMismatch {
        /// Bytes required by `width * height * channels`.
        expected: usize,
        /// Bytes actually present.
        actual: usize,
    },

    /// The message plus its length header does not fit into the buffer.
    #[error("image too small to embed watermark ({required} bits required, {available} available)")]
    Capacity {
        /// Bits needed for header and payload.
        required: usize,
        /// Bits the buffer can hold (one per byte).
        available: usize,
    },

    /// The payload bit length does not fit the 32-bit length header.
    #[error("payload of {bits} bits exceeds the 32-bit length header (max {} bits)", u32::MAX)]
    PayloadTooLarge {
        /// Payload length in bits.
        bits: usize,
    },

    /// The length header is out of range, so no stamp can be recovered.
    #[error("no watermark found or corrupted data")]
    NotFound,

    /// The recovered payload is not valid UTF-8.
    #[error("recovered watermark is not valid UTF-8: {0}")]
    Decode(#[from] FromUtf8Error),

    /// The stamp text exceeds the configured character limit.
    #[error("stamp text too long: {len} characters (max {max})")]
    TextTooLong {
        /// Length of the text in characters.
        len: usize,
        /// Configured maximum.
        max: usize,
    },

    /// The input file exceeds the configured size limit.
    #[error("file too large: {:.1}MB (max {:.0}MB)", megabytes(.size), megabytes(.max))]
    FileTooLarge {
        /// File size in bytes.
        size: u64,
        /// Configured maximum in bytes.
        max: u64,
    },

    /// More files were submitted than a single batch accepts.
    #[error("maximum {max} files allowed, got {count}")]
    TooManyFiles {
        /// Number of files submitted.
        count: usize,
        /// Configured maximum.
        max: usize,
    },

    /// A batch was submitted without any files.
    #[error("no files provided")]
    NoFiles,

    /// The image format is not supported.
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An error occurred while decoding or encoding an image.
    #[error("image processing error: {0}")]
    Image(#[from] image::ImageError),
}

impl Error {
    /// Whether this error means "no stamp present" rather than a failure.
    ///
    /// Verification reports these as a not-found outcome instead of an error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound | Self::Decode(_))
    }
}

#[allow(clippy::trivially_copy_pass_by_ref, clippy::cast_precision_loss)]
fn megabytes(bytes: &u64) -> f64 {
    *bytes as f64 / 1_048_576.0
}

/// A specialized `Result` type for this crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        let io_err = Error::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert!(io_err.to_string().contains("gone"));

        let unsupported = Error::UnsupportedFormat("tiff".to_string());
        assert!(unsupported.to_string().contains("tiff"));

        let capacity = Error::Capacity {
            required: 328,
            available: 320,
        };
        let msg = capacity.to_string();
        assert!(msg.starts_with("image too small to embed watermark"));
        assert!(msg.contains("328"));

        let too_large = Error::FileTooLarge {
            size: 15 * 1_048_576,
            max: 10 * 1_048_576,
        };
        assert_eq!(too_large.to_string(), "file too large: 15.0MB (max 10MB)");

        let oversized = Error::PayloadTooLarge { bits: 1 << 33 };
        assert!(oversized.to_string().contains("32-bit length header"));

        assert_eq!(
            Error::NotFound.to_string(),
            "no watermark found or corrupted data"
        );
    }

    #[test]
    fn not_found_classification() {
        let bad_utf8 = String::from_utf8(vec![0xFF, 0xFE]).unwrap_err();
        assert!(Error::NotFound.is_not_found());
        assert!(Error::Decode(bad_utf8).is_not_found());
        assert!(!Error::Capacity {
            required: 1,
            available: 0
        }
        .is_not_found());
        assert!(!Error::InvalidDimensions {
            width: 0,
            height: 0
        }
        .is_not_found());
    }
}
