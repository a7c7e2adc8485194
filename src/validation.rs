//! Input limits and validators for stamping and verification.

use std::path::Path;

use crate::error::{Error, Result};

/// Largest accepted input file, in bytes (10 MiB).
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Most files accepted in a single batch.
pub const MAX_FILE_COUNT: usize = 20;

/// Longest accepted stamp text, in characters.
pub const MAX_TEXT_LENGTH: usize = 256;

/// Text embedded when none is given.
pub const DEFAULT_STAMP_TEXT: &str = "HiddenStamp";

/// File extensions accepted as input images.
pub const SUPPORTED_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "webp"];

/// Check if a file has a supported image extension.
#[must_use]
pub fn is_supported_image(path: &Path) -> bool {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => SUPPORTED_EXTENSIONS.contains(&ext.to_lowercase().as_str()),
        None => false,
    }
}

/// Validate an input image by extension and size.
///
/// # Errors
///
/// Returns [`Error::UnsupportedFormat`] for an unknown extension, or
/// [`Error::FileTooLarge`] if `size` exceeds `max_size`.
pub fn validate_image_file(path: &Path, size: u64, max_size: u64) -> Result<()> {
    if !is_supported_image(path) {
        return Err(Error::UnsupportedFormat(path.display().to_string()));
    }
    if size > max_size {
        return Err(Error::FileTooLarge {
            size,
            max: max_size,
        });
    }
    Ok(())
}

/// Validate the number of files in a batch.
///
/// # Errors
///
/// Returns [`Error::NoFiles`] for an empty batch, or [`Error::TooManyFiles`]
/// above [`MAX_FILE_COUNT`].
pub fn validate_file_count(count: usize) -> Result<()> {
    match count {
        0 => Err(Error::NoFiles),
        n if n > MAX_FILE_COUNT => Err(Error::TooManyFiles {
            count: n,
            max: MAX_FILE_COUNT,
        }),
        _ => Ok(()),
    }
}

/// Validate the stamp text length, counted in characters.
///
/// # Errors
///
/// Returns [`Error::TextTooLong`] if `text` has more than `max` characters.
pub fn validate_text(text: &str, max: usize) -> Result<()> {
    let len = text.chars().count();
    if len > max {
        return Err(Error::TextTooLong { len, max });
    }
    Ok(())
}
