//! Stamp engine: image decoding, file handling and batch processing around
//! the LSB codec.

use std::collections::HashSet;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbImage};
use log::{debug, info, warn};

use crate::codec::{self, PixelLayout};
use crate::error::{Error, Result};
use crate::validation::{self, DEFAULT_STAMP_TEXT, MAX_FILE_SIZE, MAX_TEXT_LENGTH};

/// Options controlling stamping and verification.
#[derive(Debug, Clone)]
pub struct StampOptions {
    /// Text to embed. An empty string falls back to [`DEFAULT_STAMP_TEXT`].
    pub text: String,
    /// Maximum stamp text length in characters.
    pub max_text_len: usize,
    /// Maximum input file size in bytes.
    pub max_file_size: u64,
    /// Enable verbose logging.
    pub verbose: bool,
    /// Suppress non-error output.
    pub quiet: bool,
}

impl Default for StampOptions {
    fn default() -> Self {
        Self {
            text: DEFAULT_STAMP_TEXT.to_string(),
            max_text_len: MAX_TEXT_LENGTH,
            max_file_size: MAX_FILE_SIZE,
            verbose: false,
            quiet: false,
        }
    }
}

/// Result of stamping a single image file.
#[derive(Debug)]
pub struct ProcessResult {
    /// Path of the input file.
    pub path: PathBuf,
    /// Path the stamped PNG was written to, if any.
    pub output: Option<PathBuf>,
    /// Whether stamping succeeded.
    pub success: bool,
    /// Human-readable status message.
    pub message: String,
}

/// Outcome of looking for a stamp in an image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verification {
    /// Whether a stamp was recovered.
    pub found: bool,
    /// The recovered text, present only when `found` is set.
    pub text: Option<String>,
}

impl Verification {
    fn present(text: String) -> Self {
        Self {
            found: true,
            text: Some(text),
        }
    }

    fn not_found() -> Self {
        Self {
            found: false,
            text: None,
        }
    }
}

/// Result of verifying a single image file.
#[derive(Debug)]
pub struct VerifyResult {
    /// Path of the input file.
    pub path: PathBuf,
    /// Whether the file could be read and decoded at all.
    pub success: bool,
    /// Stamp lookup outcome; not-found when `success` is false.
    pub verification: Verification,
    /// Human-readable status message.
    pub message: String,
}

/// Embeds and recovers text stamps in image files.
///
/// The engine only holds the validated stamp text and limits, so one instance
/// can be shared across threads for batch work.
#[derive(Debug, Clone)]
pub struct StampEngine {
    text: String,
    max_file_size: u64,
}

impl StampEngine {
    /// Create an engine from options.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TextTooLong`] if the stamp text exceeds
    /// `opts.max_text_len` characters.
    pub fn new(opts: &StampOptions) -> Result<Self> {
        let text = if opts.text.is_empty() {
            DEFAULT_STAMP_TEXT
        } else {
            opts.text.as_str()
        };
        validation::validate_text(text, opts.max_text_len)?;

        Ok(Self {
            text: text.to_string(),
            max_file_size: opts.max_file_size,
        })
    }

    /// The text this engine embeds.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Embed the stamp text into an RGB image in-place.
    ///
    /// Returns the number of channel bytes that carry the stamp.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimensions`] for an empty image, or
    /// [`Error::Capacity`] if the image is too small. The image is unchanged
    /// on error.
    pub fn stamp_image(&self, image: &mut RgbImage) -> Result<usize> {
        let layout = PixelLayout::rgb(image.width(), image.height())?;
        codec::embed_with_layout(&mut **image, layout, &self.text)
    }

    /// Recover the stamp text from an RGB image.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimensions`] for an empty image,
    /// [`Error::NotFound`] if no stamp header is present, or
    /// [`Error::Decode`] if the payload is not UTF-8.
    #[allow(clippy::unused_self)] // method on `self` for API consistency
    pub fn verify_image(&self, image: &RgbImage) -> Result<String> {
        let layout = PixelLayout::rgb(image.width(), image.height())?;
        codec::extract_with_layout(image, layout)
    }

    /// Decode an encoded image (JPEG, PNG, WebP), stamp it, and re-encode as PNG.
    ///
    /// Any alpha channel is dropped before embedding.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Image`] if the input cannot be decoded or the output
    /// cannot be encoded, plus any error from [`Self::stamp_image`].
    pub fn stamp_bytes(&self, input: &[u8]) -> Result<Vec<u8>> {
        let mut rgb = decode_rgb(input)?;
        let used = self.stamp_image(&mut rgb)?;
        debug!(
            "stamped {}x{} image, {used} of {} channel bytes used",
            rgb.width(),
            rgb.height(),
            rgb.len()
        );
        encode_png(&rgb)
    }

    /// Decode an encoded image and look for a stamp.
    ///
    /// A missing or undecodable stamp is reported with `found: false`, not as
    /// an error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Image`] if the input cannot be decoded, or
    /// [`Error::InvalidDimensions`] for an empty image.
    pub fn verify_bytes(&self, input: &[u8]) -> Result<Verification> {
        let rgb = decode_rgb(input)?;
        match self.verify_image(&rgb) {
            Ok(text) => Ok(Verification::present(text)),
            Err(e) if e.is_not_found() => {
                debug!(
                    "no stamp ({e}), header reads {:?}",
                    codec::read_header(&rgb)
                );
                Ok(Verification::not_found())
            }
            Err(e) => Err(e),
        }
    }

    /// Process a single image file: validate, load, stamp, save as PNG.
    ///
    /// Returns a [`ProcessResult`] indicating success or failure.
    #[must_use]
    pub fn stamp_file(&self, input: &Path, output: &Path) -> ProcessResult {
        let mut result = ProcessResult {
            path: input.to_path_buf(),
            output: None,
            success: false,
            message: String::new(),
        };

        let stamped = match self.read_input(input).and_then(|bytes| self.stamp_bytes(&bytes)) {
            Ok(png) => png,
            Err(e) => {
                warn!("failed to stamp {}: {e}", input.display());
                result.message = format!("Failed to stamp: {e}");
                return result;
            }
        };

        if let Some(parent) = output.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                if let Err(e) = std::fs::create_dir_all(parent) {
                    result.message = format!("Failed to create output directory: {e}");
                    return result;
                }
            }
        }

        match std::fs::write(output, stamped) {
            Ok(()) => {
                info!("stamped {} -> {}", input.display(), output.display());
                result.success = true;
                result.output = Some(output.to_path_buf());
                result.message = "Stamp embedded".to_string();
            }
            Err(e) => {
                result.message = format!("Failed to save: {e}");
            }
        }

        result
    }

    /// Validate and load a single image file, then look for a stamp.
    #[must_use]
    pub fn verify_file(&self, input: &Path) -> VerifyResult {
        let outcome = self
            .read_input(input)
            .and_then(|bytes| self.verify_bytes(&bytes));

        match outcome {
            Ok(verification) => {
                let message = if verification.found {
                    "Stamp found".to_string()
                } else {
                    "No stamp found".to_string()
                };
                info!("verified {}: found={}", input.display(), verification.found);
                VerifyResult {
                    path: input.to_path_buf(),
                    success: true,
                    verification,
                    message,
                }
            }
            Err(e) => {
                warn!("failed to verify {}: {e}", input.display());
                VerifyResult {
                    path: input.to_path_buf(),
                    success: false,
                    verification: Verification::not_found(),
                    message: format!("Failed to verify: {e}"),
                }
            }
        }
    }

    /// Stamp a batch of files.
    ///
    /// Each output is written as `{stem}_stamped.png`, into `output_dir` when
    /// given, otherwise next to its input. Inputs sharing a stem get numbered
    /// names (see [`batch_output_paths`]). Files are processed in parallel
    /// when the `cli` feature is enabled (via rayon).
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoFiles`] or [`Error::TooManyFiles`] if the batch size
    /// is out of range. Per-file failures are reported in the results.
    pub fn stamp_files(
        &self,
        inputs: &[PathBuf],
        output_dir: Option<&Path>,
    ) -> Result<Vec<ProcessResult>> {
        validation::validate_file_count(inputs.len())?;
        let jobs: Vec<(&PathBuf, PathBuf)> = inputs
            .iter()
            .zip(batch_output_paths(inputs, output_dir))
            .collect();
        Ok(map_batch(&jobs, |(input, output)| {
            self.stamp_file(input, output)
        }))
    }

    /// Verify a batch of files, in parallel when the `cli` feature is enabled.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoFiles`] or [`Error::TooManyFiles`] if the batch size
    /// is out of range.
    pub fn verify_files(&self, inputs: &[PathBuf]) -> Result<Vec<VerifyResult>> {
        validation::validate_file_count(inputs.len())?;
        Ok(map_batch(inputs, |input| self.verify_file(input)))
    }

    /// Stamp all supported images in a directory.
    ///
    /// Returns a [`ProcessResult`] for each image found. Files that are
    /// already stamped outputs (`*_stamped.png`) are skipped, so re-running
    /// into the input directory does not stamp them again. The batch file
    /// limit does not apply here.
    #[must_use]
    pub fn stamp_directory(&self, input_dir: &Path, output_dir: &Path) -> Vec<ProcessResult> {
        let mut entries: Vec<PathBuf> = match std::fs::read_dir(input_dir) {
            Ok(rd) => rd
                .filter_map(std::result::Result::ok)
                .filter(|e| e.file_type().map(|ft| ft.is_file()).unwrap_or(false))
                .map(|e| e.path())
                .filter(|p| validation::is_supported_image(p) && !is_stamped_output(p))
                .collect(),
            Err(e) => {
                return vec![ProcessResult {
                    path: input_dir.to_path_buf(),
                    output: None,
                    success: false,
                    message: format!("Failed to read directory: {e}"),
                }];
            }
        };
        entries.sort();

        if !output_dir.exists() {
            if let Err(e) = std::fs::create_dir_all(output_dir) {
                return vec![ProcessResult {
                    path: output_dir.to_path_buf(),
                    output: None,
                    success: false,
                    message: format!("Failed to create output directory: {e}"),
                }];
            }
        }

        let jobs: Vec<(&PathBuf, PathBuf)> = entries
            .iter()
            .zip(batch_output_paths(&entries, Some(output_dir)))
            .collect();
        map_batch(&jobs, |(input, output)| self.stamp_file(input, output))
    }

    fn read_input(&self, path: &Path) -> Result<Vec<u8>> {
        let size = std::fs::metadata(path)?.len();
        validation::validate_image_file(path, size, self.max_file_size)?;
        Ok(std::fs::read(path)?)
    }
}

/// Decode an encoded image into an RGB buffer, dropping any alpha channel.
///
/// # Errors
///
/// Returns [`Error::Image`] if decoding fails, or
/// [`Error::InvalidDimensions`] if the image has no pixels.
pub fn decode_rgb(input: &[u8]) -> Result<RgbImage> {
    let rgb = image::load_from_memory(input)?.to_rgb8();
    if rgb.width() == 0 || rgb.height() == 0 {
        return Err(Error::InvalidDimensions {
            width: rgb.width(),
            height: rgb.height(),
        });
    }
    Ok(rgb)
}

/// Encode an RGB image as PNG. Stamps only survive lossless output.
///
/// # Errors
///
/// Returns [`Error::Image`] if encoding fails.
pub fn encode_png(image: &RgbImage) -> Result<Vec<u8>> {
    let mut out = Cursor::new(Vec::new());
    PngEncoder::new(&mut out).write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        ExtendedColorType::Rgb8,
    )?;
    Ok(out.into_inner())
}

/// Output path for a stamped image.
///
/// Example: `"photo.jpg"` becomes `"photo_stamped.png"`, placed in
/// `output_dir` when given, otherwise next to the input.
#[must_use]
pub fn stamped_output_path(input: &Path, output_dir: Option<&Path>) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    let dir = output_dir.unwrap_or_else(|| input.parent().unwrap_or(Path::new(".")));
    dir.join(format!("{stem}_stamped.png"))
}

/// Output paths for a batch, one per input, all distinct.
///
/// The first input with a given stem gets `{stem}_stamped.png`; later ones
/// get `{stem}_1_stamped.png`, `{stem}_2_stamped.png` and so on, so `a.png`
/// and `a.jpg` never overwrite each other.
#[must_use]
pub fn batch_output_paths(inputs: &[PathBuf], output_dir: Option<&Path>) -> Vec<PathBuf> {
    let mut taken = HashSet::with_capacity(inputs.len());
    inputs
        .iter()
        .map(|input| {
            let mut output = stamped_output_path(input, output_dir);
            let mut n = 1;
            while taken.contains(&output) {
                let stem = input.file_stem().unwrap_or_default().to_string_lossy();
                output.set_file_name(format!("{stem}_{n}_stamped.png"));
                n += 1;
            }
            taken.insert(output.clone());
            output
        })
        .collect()
}

/// Whether `path` names a file this crate wrote (`{stem}_stamped.png`).
#[must_use]
pub fn is_stamped_output(path: &Path) -> bool {
    let is_png = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("png"));
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
    is_png && stem.ends_with("_stamped")
}

#[cfg(feature = "cli")]
fn map_batch<T, R, F>(items: &[T], f: F) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync + Send,
{
    use rayon::prelude::*;
    items.par_iter().map(f).collect()
}

#[cfg(not(feature = "cli"))]
fn map_batch<T, R, F>(items: &[T], f: F) -> Vec<R>
where
    F: Fn(&T) -> R,
{
    items.iter().map(f).collect()
}
